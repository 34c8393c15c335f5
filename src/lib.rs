//! Duck Secrets - idempotent DuckDB secret registration.
//!
//! This library registers object-storage credentials with an embedded DuckDB
//! session, treating an already-registered secret as success, and runs
//! queries against the storage once the secret is in place.

pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod query;
pub mod registrar;
pub mod session;

pub use error::{Error, Result};
