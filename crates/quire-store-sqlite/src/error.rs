//! Error type for `quire-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] quire_core::Error),

  #[error("database error: {0}")]
  Database(#[from] rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A stored value that the store itself would never have written.
  #[error("invalid stored data: {0}")]
  InvalidData(String),

  /// The schema has no bind key and no default database is configured.
  #[error("no database configured")]
  NoDatabase,

  /// The schema's bind key does not name a configured database.
  #[error("no database configured for bind key {0:?}")]
  UnboundKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
