//! Error types for `strata-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A predicate could not be written into the document being rebuilt.
  #[error("cannot set {path:?}: {reason}")]
  Encoding { path: String, reason: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
