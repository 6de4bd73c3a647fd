//! Deserialisable storage configuration.
//!
//! ```toml
//! database     = "blog.db"     # default database (optional when bound)
//! table_prefix = "blog_"       # optional
//! bind_key     = "content"     # optional; selects an entry in [binds]
//!
//! [binds]
//! content = "content.db"
//! ```

use std::{collections::BTreeMap, path::PathBuf};

use quire_core::schema::Schema;
use serde::Deserialize;

use crate::{Binds, Result, SqliteStore};

/// Runtime storage configuration, deserialised by the caller (e.g. through
/// the `config` crate).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
  #[serde(default)]
  pub database:     Option<PathBuf>,
  #[serde(default)]
  pub table_prefix: Option<String>,
  #[serde(default)]
  pub bind_key:     Option<String>,
  #[serde(default)]
  pub binds:        BTreeMap<String, PathBuf>,
}

impl StorageConfig {
  pub fn schema(&self) -> Result<Schema> {
    Ok(Schema::new(self.table_prefix.as_deref(), self.bind_key.as_deref())?)
  }

  pub fn binds(&self) -> Binds {
    let binds = self
      .binds
      .iter()
      .fold(Binds::new(), |b, (key, path)| b.bind(key.clone(), path.clone()));
    match &self.database {
      Some(path) => binds.with_default(path.clone()),
      None => binds,
    }
  }

  /// Map every configured path through `f` (e.g. to expand `~`).
  pub fn map_paths(mut self, f: impl Fn(PathBuf) -> PathBuf) -> Self {
    self.database = self.database.map(&f);
    self.binds = self.binds.into_iter().map(|(k, p)| (k, f(p))).collect();
    self
  }

  /// Build the schema and open the database it is bound to.
  pub fn open(&self) -> Result<SqliteStore> {
    SqliteStore::connect(&self.binds(), self.schema()?)
  }
}
