//! # Storage Traits
//!
//! This module defines the storage abstraction that lets the SQLite and CSV
//! backends be used interchangeably by the module controllers.

use async_trait::async_trait;

use crate::domain::entities::EntityKind;
use crate::domain::errors::RecordResult;
use crate::domain::models::{FieldValue, NewRecord, Record};

/// Trait defining the interface every record store implements
///
/// Implementations must serialize operations: a `list` issued after a
/// successful `create` or `delete` always observes that write.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a validated record and return its new identifier.
    ///
    /// Fails with `Conflict` on a duplicate unique column and with
    /// `Referential` when the referenced parent does not exist. Either way
    /// nothing is written.
    async fn create(&self, record: &NewRecord) -> RecordResult<i64>;

    /// Delete by identifier; `NotFound` if absent, `Conflict` if other rows
    /// still reference it
    async fn delete(&self, kind: EntityKind, id: i64) -> RecordResult<()>;

    /// All rows of a kind in the descriptor's listing order
    async fn list(&self, kind: EntityKind) -> RecordResult<Vec<Record>>;

    /// Rows of `child` referencing the parent with identifier `parent_id`
    async fn list_children(&self, child: EntityKind, parent_id: i64) -> RecordResult<Vec<Record>>;

    /// Whether any row of `kind` has `field` equal to `value`
    async fn exists(&self, kind: EntityKind, field: &str, value: &FieldValue) -> RecordResult<bool>;

    /// Fails with `Store` when the underlying handle is no longer usable
    async fn health_check(&self) -> RecordResult<()>;

    /// Short backend name for logging
    fn backend_name(&self) -> &'static str;
}
