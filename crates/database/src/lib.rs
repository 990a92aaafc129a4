//! # Bookshelf Database Crate
//!
//! This crate is the application-specific interface to the SQLite catalog
//! database. It owns every persisted `Author` and `Book`.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. Handlers talk to `DbRepository` and never
//!   see a query string.
//! - **Asynchronous & Pooled:** All operations are asynchronous and go through a
//!   `SqlitePool`; a connection is checked out per query or transaction and
//!   returned on every exit path.
//! - **Scoped transactions:** Multi-step writes run inside a transaction that is
//!   rolled back when dropped without a commit.
//!
//! ## Public API
//!
//! - `connect` / `connect_in_memory`: build the connection pool.
//! - `run_migrations`: apply the embedded schema (idempotent).
//! - `DbRepository`: the catalog's data access methods.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, connect_in_memory, run_migrations};
pub use error::DbError;
pub use repository::{DbRepository, DeletedBook};
