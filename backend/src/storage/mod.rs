//! # Storage Module
//!
//! Backends implementing [`RecordStore`]. Module controllers only ever see
//! the trait, so SQLite and CSV can be swapped through configuration.

pub mod constraints;
pub mod csv;
pub mod sqlite;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use csv::{CsvConnection, CsvRecordStore};
pub use sqlite::{DbConnection, SqliteRecordStore};
pub use traits::RecordStore;
