//! Error type for `roster-store-sqlite`.

use roster_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A business rule rejected the operation; nothing was written.
  #[error(transparent)]
  Core(#[from] roster_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("unexpected value in column {column}: {value:?}")]
  Decode { column: &'static str, value: String },

  /// A multi-step write touched an unexpected number of rows. The enclosing
  /// transaction has been rolled back.
  #[error("inconsistent write: {0}")]
  Consistency(String),
}

impl DomainError for Error {
  fn domain(&self) -> Option<&roster_core::Error> {
    match self {
      Error::Core(e) => Some(e),
      _ => None,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
