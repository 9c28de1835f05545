//! Movie list data model types and YAML I/O for the canonical movie set.
//!
//! This crate defines the persistent data model (users, movies, lists and
//! their ranked entries) without any database dependencies. Consumers can use
//! these types directly for serialization, display, or passing to
//! `cinelist-db` for persistence.

pub mod types;
pub mod yaml;

pub use types::*;
pub use yaml::{load_catalog, load_seed_movies};
