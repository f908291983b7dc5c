//! Document ⇄ triple engine for Strata.
//!
//! [`Engine`] stores XML documents as flat triples in any
//! [`TripleStore`], rebuilds them on fetch, and applies full-replace or
//! partial-merge updates. Every store interaction is awaited in sequence;
//! nothing is batched or issued in parallel.
//!
//! ```no_run
//! # async fn demo<S: strata_core::store::TripleStore>(store: S) -> strata_engine::Result<()> {
//! use strata_engine::{AllocationMode, Engine, EngineConfig};
//!
//! let engine = Engine::new(store, EngineConfig::default());
//! let xml = br#"<Person RefId=""><Name>Ann</Name></Person>"#;
//! let id = engine.store_document(xml, AllocationMode::Reassign, "school1").await?;
//! let back = engine.fetch_document(&id, "school1", true).await?;
//! # Ok(()) }
//! ```

mod build;
mod lock;
mod reconstruct;
mod refid;
mod shape;
mod update;

pub mod error;

use std::sync::Arc;

use serde::Deserialize;
use strata_core::{key::KeyPrefix, store::TripleStore, triple::Triple};
use strata_xml::{Document, REFID_ATTRIBUTE};
use tracing::info;

pub use build::build_triples;
pub use error::{Error, Result};
use lock::SubjectLocks;
pub use reconstruct::reconstruct;
pub use refid::{AllocationMode, new_refid};

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
  /// How many generated RefIds to try before giving up with a collision.
  #[serde(default = "default_allocation_attempts")]
  pub allocation_attempts: u32,
}

fn default_allocation_attempts() -> u32 { 3 }

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      allocation_attempts: default_allocation_attempts(),
    }
  }
}

// ─── Engine ───────────────────────────────────────────────────────────────────

/// The document operations, over a shared store handle.
///
/// Mutating operations on the same `(subject, context)` through one engine
/// are serialized; operations on different keys are independent.
pub struct Engine<S> {
  store:  Arc<S>,
  config: EngineConfig,
  locks:  SubjectLocks,
}

impl<S: TripleStore> Engine<S> {
  pub fn new(store: S, config: EngineConfig) -> Self {
    Self::with_shared_store(Arc::new(store), config)
  }

  pub fn with_shared_store(store: Arc<S>, config: EngineConfig) -> Self {
    Self {
      store,
      config,
      locks: SubjectLocks::default(),
    }
  }

  pub fn store(&self) -> &S { &self.store }

  /// Store a new document and return its subject identifier.
  ///
  /// The identifier comes from the document's `RefId` attribute when present
  /// and free in `context`; otherwise `mode` decides between failing and
  /// generating one. The resolved identifier is written back into the
  /// document before it is flattened.
  pub async fn store_document(
    &self,
    xml: &[u8],
    mode: AllocationMode,
    context: &str,
  ) -> Result<String> {
    let mut doc = strata_xml::parse(xml).map_err(Error::Parse)?;

    let _guard = match doc.refid() {
      Some(submitted) => Some(self.locks.acquire(submitted, context).await),
      None => None,
    };
    let id = refid::allocate(
      &*self.store,
      &mut doc,
      mode,
      context,
      self.config.allocation_attempts,
    )
    .await?;

    let triples = build_triples(&doc, &id, context);
    update::write_all(&*self.store, &triples).await?;
    info!(refid = %id, context, triples = triples.len(), "stored document");
    Ok(id)
  }

  /// Replace the whole record set of `subject` with `xml`. Predicates absent
  /// from `xml` no longer resolve afterwards.
  pub async fn update_document_full(
    &self,
    xml: &[u8],
    subject: &str,
    context: &str,
  ) -> Result<()> {
    let (_, triples) = prepare(xml, subject, context)?;
    let _guard = self.locks.acquire(subject, context).await;
    update::full_replace(&*self.store, subject, context, &triples).await?;
    info!(subject, context, triples = triples.len(), "replaced document");
    Ok(())
  }

  /// Merge `xml` into `subject`: its leaves overwrite stored values, and
  /// nothing it omits is removed. `xml` must have the same root element as
  /// the stored document.
  pub async fn update_document_partial(
    &self,
    xml: &[u8],
    subject: &str,
    context: &str,
  ) -> Result<()> {
    let (root, triples) = prepare(xml, subject, context)?;
    let _guard = self.locks.acquire(subject, context).await;
    update::partial_merge(&*self.store, subject, context, &root, &triples)
      .await?;
    info!(subject, context, triples = triples.len(), "merged document");
    Ok(())
  }

  /// Tombstone every triple of `subject` in `context`.
  pub async fn delete_document(&self, subject: &str, context: &str) -> Result<()> {
    let _guard = self.locks.acquire(subject, context).await;
    let prefix = KeyPrefix::subject(context, subject);
    let cleared = update::tombstone_all(&*self.store, &prefix).await?;
    info!(subject, context, cleared, "deleted document");
    Ok(())
  }

  /// Subjects of every live document whose root element is `relation`, in
  /// store order without duplicates.
  pub async fn find_subjects_by_relation(
    &self,
    relation: &str,
    context: &str,
  ) -> Result<Vec<String>> {
    let predicate = format!("{relation}.-{REFID_ATTRIBUTE}");
    let prefix = KeyPrefix::predicate(context, &predicate);
    let triples = self
      .store
      .get_tuples(&prefix)
      .await
      .map_err(Error::transport)?;

    let mut ids: Vec<String> = Vec::new();
    for triple in triples {
      if triple.is_tombstone() || !prefix.matches(&triple) {
        continue;
      }
      if !ids.contains(&triple.subject) {
        ids.push(triple.subject);
      }
    }
    Ok(ids)
  }

  /// Rebuild `subject` from its stored triples and render it as XML,
  /// optionally pruning empty elements and attributes.
  pub async fn fetch_document(
    &self,
    subject: &str,
    context: &str,
    strip_empty: bool,
  ) -> Result<Vec<u8>> {
    let prefix = KeyPrefix::subject(context, subject);
    let triples = self
      .store
      .get_tuples(&prefix)
      .await
      .map_err(Error::transport)?;

    let mine = triples.iter().filter(|t| prefix.matches(t));
    let Some(mut doc) = reconstruct(mine)? else {
      return Err(Error::NotFound {
        subject: subject.to_owned(),
        context: context.to_owned(),
      });
    };
    if strip_empty {
      doc.strip_empty();
    }
    doc.to_xml().map_err(Error::encoding)
  }
}

/// Parse an update and pin its `RefId` to `subject`, so the stored identity
/// attribute always names the subject it lives under. Returns the root
/// element name with the triples.
fn prepare(
  xml: &[u8],
  subject: &str,
  context: &str,
) -> Result<(String, Vec<Triple>)> {
  let mut doc: Document = strata_xml::parse(xml).map_err(Error::Parse)?;
  doc.set_refid(subject);
  let triples = build_triples(&doc, subject, context);
  Ok((doc.root, triples))
}
