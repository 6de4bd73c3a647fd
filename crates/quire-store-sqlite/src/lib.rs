//! SQLite backend for the Quire blog store.
//!
//! Uses blocking [`rusqlite`] calls; each [`SqliteStore`] owns one
//! connection and is meant to be driven from a single thread.

mod encode;
mod reconcile;
mod schema;
mod store;

pub mod binds;
pub mod config;
pub mod error;

pub use binds::Binds;
pub use config::StorageConfig;
pub use error::{Error, Result};
pub use schema::ddl;
pub use store::SqliteStore;
