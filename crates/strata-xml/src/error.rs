//! Error types for the strata-xml codec.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("XML syntax error: {0}")]
  Xml(#[from] quick_xml::Error),

  #[error("malformed document: {0}")]
  Malformed(String),

  #[error("document is not valid UTF-8: {0}")]
  Utf8(#[from] std::str::Utf8Error),

  #[error("write error: {0}")]
  Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
