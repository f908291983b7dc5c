//! Subject identifier allocation.

use strata_core::{key::KeyPrefix, store::TripleStore};
use strata_xml::Document;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{Error, Result};

/// What to do when a submitted RefId is already in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationMode {
  /// The caller's RefId must be honoured; a clash is a
  /// [`Error::Collision`].
  Advisory,
  /// A clashing RefId is silently replaced by a generated one.
  Reassign,
}

impl AllocationMode {
  pub fn from_advisory(required: bool) -> Self {
    if required { Self::Advisory } else { Self::Reassign }
  }
}

/// A fresh identifier: an uppercase v4 UUID.
pub fn new_refid() -> String { Uuid::new_v4().to_string().to_uppercase() }

/// Resolve the subject identifier for `doc` within `context` and stamp it
/// into the document's `RefId` attribute.
///
/// Generated identifiers are checked against the store as well and
/// regenerated up to `attempts` times.
pub(crate) async fn allocate<S: TripleStore>(
  store: &S,
  doc: &mut Document,
  mode: AllocationMode,
  context: &str,
  attempts: u32,
) -> Result<String> {
  let id = match doc.refid() {
    Some(submitted) => {
      let submitted = submitted.to_owned();
      if !in_use(store, &submitted, context).await? {
        submitted
      } else {
        match mode {
          AllocationMode::Advisory => {
            warn!(refid = %submitted, context, "advisory RefId already in use");
            return Err(Error::Collision(submitted));
          }
          AllocationMode::Reassign => {
            warn!(refid = %submitted, context, "RefId in use; generating a new one");
            generate(store, context, attempts).await?
          }
        }
      }
    }
    None => generate(store, context, attempts).await?,
  };

  doc.set_refid(&id);
  Ok(id)
}

async fn generate<S: TripleStore>(
  store: &S,
  context: &str,
  attempts: u32,
) -> Result<String> {
  let mut last = String::new();
  for _ in 0..attempts.max(1) {
    last = new_refid();
    if !in_use(store, &last, context).await? {
      return Ok(last);
    }
    debug!(refid = %last, context, "generated RefId collided");
  }
  Err(Error::Collision(last))
}

async fn in_use<S: TripleStore>(
  store: &S,
  id: &str,
  context: &str,
) -> Result<bool> {
  let prefix = KeyPrefix::subject(context, id);
  store.has_key(&prefix).await.map_err(Error::transport)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
