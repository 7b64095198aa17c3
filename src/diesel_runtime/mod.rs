//! Diesel ORM runtime infrastructure
//!
//! Connection pooling shared by the live schema introspector and the
//! database-backed menu repository.
//!
//! # Features
//!
//! - `postgres` (default): PostgreSQL backend
//! - `mysql`: MySQL / MariaDB backend

pub mod database;

pub use database::{Database, DatabaseConfig, DbConnection, Pool, PooledConnection};
