//! Error type for `strata-store-http`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("{method} {path} → {status}")]
  Status {
    method: &'static str,
    path:   String,
    status: reqwest::StatusCode,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
