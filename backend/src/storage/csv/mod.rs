//! # CSV Storage Module
//!
//! Plain-file backend selected with `storage: csv` in the configuration.
//!
//! ## File Format
//!
//! ```csv
//! id,producto_sku,cantidad,fecha_creacion
//! 1,AB1,50,2025-02-10 14:03:12
//! ```
//!
//! Flags are written as `1`/`0`. `sequences.yaml` in the same directory
//! records the last identifier handed out per table.

pub mod connection;
pub mod record_store;

pub use connection::CsvConnection;
pub use record_store::CsvRecordStore;
