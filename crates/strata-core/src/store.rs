//! The `TripleStore` trait.
//!
//! The trait is implemented by store clients (e.g. `strata-store-http`).
//! Higher layers (`strata-engine`, `strata-cli`) depend on this abstraction,
//! not on any concrete transport.

use std::future::Future;

use crate::{key::KeyPrefix, triple::Triple};

/// Abstraction over the remote associative triple store.
///
/// The store upserts one record per write; a triple with an empty object is a
/// delete marker for its key. There are no multi-record transactions, so a
/// sequence of writes that fails part way leaves the earlier writes in place.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes.
pub trait TripleStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Whether any stored key falls under `prefix`.
  fn has_key<'a>(
    &'a self,
    prefix: &'a KeyPrefix,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Every triple under `prefix`, in whatever order the store yields them.
  fn get_tuples<'a>(
    &'a self,
    prefix: &'a KeyPrefix,
  ) -> impl Future<Output = Result<Vec<Triple>, Self::Error>> + Send + 'a;

  /// Upsert a single triple.
  fn put_triple<'a>(
    &'a self,
    triple: &'a Triple,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
