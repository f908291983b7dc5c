//! Replace and merge semantics over a stored subject.
//!
//! Both policies are two-phase: a tombstone phase over the existing records,
//! then a write phase for the new document. The store offers no transaction,
//! so a failure in either phase leaves whatever was already written; the
//! caller sees the error and the subject may be torn.

use strata_core::{key::KeyPrefix, store::TripleStore, triple::Triple};
use tracing::debug;

use crate::{Error, Result, shape};

/// Write every triple in order, stopping at the first failure.
pub(crate) async fn write_all<S: TripleStore>(
  store: &S,
  triples: &[Triple],
) -> Result<()> {
  for triple in triples {
    store.put_triple(triple).await.map_err(Error::transport)?;
  }
  Ok(())
}

/// Tombstone every live triple under `prefix`. Returns how many were live.
pub(crate) async fn tombstone_all<S: TripleStore>(
  store: &S,
  prefix: &KeyPrefix,
) -> Result<usize> {
  let existing = store.get_tuples(prefix).await.map_err(Error::transport)?;
  let mut cleared = 0;
  for triple in existing
    .iter()
    .filter(|t| !t.is_tombstone() && prefix.matches(t))
  {
    store
      .put_triple(&triple.tombstone())
      .await
      .map_err(Error::transport)?;
    cleared += 1;
  }
  Ok(cleared)
}

/// Make `triples` the complete record set of `(subject, context)`: every
/// stored predicate is tombstoned, then the new triples are written.
///
/// Between the phases a concurrent reader sees an empty subject.
pub(crate) async fn full_replace<S: TripleStore>(
  store: &S,
  subject: &str,
  context: &str,
  triples: &[Triple],
) -> Result<()> {
  let cleared =
    tombstone_all(store, &KeyPrefix::subject(context, subject)).await?;
  debug!(subject, context, cleared, "tombstone phase done");
  write_all(store, triples).await
}

/// Overwrite only the predicates present in `triples`. Stored predicates that
/// `triples` does not mention are untouched, so arrays never shrink.
///
/// The stored records are read once up front. A stored root other than
/// `root` is refused before anything is written, and paths whose shape
/// differs between the stored and incoming sides are aligned first (see
/// [`shape`](crate::shape)).
pub(crate) async fn partial_merge<S: TripleStore>(
  store: &S,
  subject: &str,
  context: &str,
  root: &str,
  triples: &[Triple],
) -> Result<()> {
  let prefix = KeyPrefix::subject(context, subject);
  let stored: Vec<Triple> = store
    .get_tuples(&prefix)
    .await
    .map_err(Error::transport)?
    .into_iter()
    .filter(|t| !t.is_tombstone() && prefix.matches(t))
    .collect();

  if let Some(found) = stored
    .iter()
    .map(|t| root_of(&t.predicate))
    .find(|found| *found != root)
  {
    return Err(Error::RootMismatch {
      subject:   subject.to_owned(),
      stored:    found.to_owned(),
      submitted: root.to_owned(),
    });
  }

  let plan = shape::plan_merge(&stored, triples);
  for tombstone in &plan.clear {
    store.put_triple(tombstone).await.map_err(Error::transport)?;
  }
  debug!(
    subject,
    context,
    cleared = plan.clear.len(),
    relocated = plan.write.len() - triples.len(),
    "tombstone phase done"
  );
  write_all(store, &plan.write).await
}

fn root_of(predicate: &str) -> &str {
  predicate.split(['.', '[']).next().unwrap_or(predicate)
}
