//! Error types for `quire-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Table prefixes become part of SQL identifiers, so only ASCII
  /// alphanumerics and `_` are accepted.
  #[error("invalid table prefix {0:?}: expected ASCII letters, digits or '_'")]
  InvalidPrefix(String),

  #[error("invalid bind key {0:?}: must not be blank")]
  InvalidBindKey(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
