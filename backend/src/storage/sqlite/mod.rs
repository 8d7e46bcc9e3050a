//! # SQLite Storage Module
//!
//! Default backend: one database file under the data directory, opened once
//! at startup and kept open for the life of the process.

pub mod connection;
pub mod record_store;

pub use connection::DbConnection;
pub use record_store::SqliteRecordStore;
