//! Routing of schemas to physical databases.
//!
//! A schema without a bind key lives in the default database; a schema with a
//! bind key lives in the database registered under that key. Resolution
//! happens when a store is built, so a missing database is reported before
//! any table is touched.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use quire_core::schema::Schema;

use crate::{Error, Result};

/// Database locations keyed by bind key. A path of `:memory:` opens a
/// private in-memory database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binds {
  default: Option<PathBuf>,
  named:   BTreeMap<String, PathBuf>,
}

impl Binds {
  pub fn new() -> Self { Self::default() }

  /// Binds with only a default database.
  pub fn single(path: impl Into<PathBuf>) -> Self {
    Self { default: Some(path.into()), named: BTreeMap::new() }
  }

  pub fn with_default(mut self, path: impl Into<PathBuf>) -> Self {
    self.default = Some(path.into());
    self
  }

  pub fn bind(mut self, key: impl Into<String>, path: impl Into<PathBuf>) -> Self {
    self.named.insert(key.into(), path.into());
    self
  }

  pub fn default_path(&self) -> Option<&Path> { self.default.as_deref() }

  /// The database a schema is routed to.
  pub fn resolve(&self, schema: &Schema) -> Result<&Path> {
    match schema.bind_key() {
      Some(key) => self
        .named
        .get(key)
        .map(PathBuf::as_path)
        .ok_or_else(|| Error::UnboundKey(key.to_owned())),
      None => self.default_path().ok_or(Error::NoDatabase),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unbound_schema_uses_default() {
    let binds = Binds::single("main.db").bind("blog", "blog.db");
    let schema = Schema::new(None, None).unwrap();
    assert_eq!(binds.resolve(&schema).unwrap(), Path::new("main.db"));
  }

  #[test]
  fn bound_schema_uses_named_database() {
    let binds = Binds::single("main.db").bind("blog", "blog.db");
    let schema = Schema::new(Some("b_"), Some("blog")).unwrap();
    assert_eq!(binds.resolve(&schema).unwrap(), Path::new("blog.db"));
  }

  #[test]
  fn missing_default_is_a_configuration_error() {
    let binds = Binds::new().bind("blog", "blog.db");
    let schema = Schema::default();
    assert!(matches!(binds.resolve(&schema), Err(Error::NoDatabase)));
  }

  #[test]
  fn bound_schema_does_not_fall_back_to_default() {
    let binds = Binds::single("main.db");
    let schema = Schema::new(None, Some("analytics")).unwrap();
    assert!(matches!(
      binds.resolve(&schema),
      Err(Error::UnboundKey(k)) if k == "analytics"
    ));
  }
}
