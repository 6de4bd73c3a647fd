//! Core types and trait definitions for the Quire blog store.
//!
//! This crate is deliberately free of database dependencies. Backends
//! (`quire-store-sqlite`) and front ends (`quire-cli`) depend on it; it
//! depends on nothing but `chrono`, `serde` and `thiserror`.

pub mod error;
pub mod post;
pub mod schema;
pub mod store;
pub mod tags;

pub use error::{Error, Result};
