//! Error type for `strata-engine`.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The submitted document is not well-formed. Nothing was written.
  #[error("malformed document: {0}")]
  Parse(#[source] strata_xml::Error),

  /// The store could not be reached or rejected a request. Writes already
  /// made by the failing operation stay in place.
  #[error("store error: {0}")]
  Transport(#[source] BoxError),

  /// An advisory RefId is already taken, or no free identifier could be
  /// generated. Nothing was written.
  #[error("RefId {0} already in use")]
  Collision(String),

  /// Stored triples could not be rebuilt into a document.
  #[error("cannot rebuild document: {0}")]
  Encoding(#[source] BoxError),

  /// A partial merge names a different root element than the stored
  /// document. Nothing was written.
  #[error(
    "cannot merge <{submitted}> into {subject}, which is stored as <{stored}>"
  )]
  RootMismatch {
    subject:   String,
    stored:    String,
    submitted: String,
  },

  #[error("no live triples for subject {subject:?} in context {context:?}")]
  NotFound { subject: String, context: String },
}

impl Error {
  pub(crate) fn transport<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Transport(Box::new(e))
  }

  pub(crate) fn encoding<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Encoding(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
