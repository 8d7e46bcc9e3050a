//! Store fixtures shared by the domain tests.

use async_trait::async_trait;
use std::sync::Arc;
use tempfile::TempDir;

use super::{CsvConnection, CsvRecordStore, DbConnection, RecordStore, SqliteRecordStore};
use crate::domain::entities::EntityKind;
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{FieldValue, NewRecord, Record};

/// Fresh in-memory SQLite store
pub async fn sqlite_store() -> Arc<dyn RecordStore> {
    let db = DbConnection::in_memory()
        .await
        .expect("Failed to create test database");
    Arc::new(SqliteRecordStore::new(db))
}

/// CSV store in a temporary directory; keep the `TempDir` alive for the test
pub fn csv_store() -> (Arc<dyn RecordStore>, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let connection = CsvConnection::new(temp_dir.path()).expect("Failed to create connection");
    (Arc::new(CsvRecordStore::new(connection)), temp_dir)
}

/// Forwards writes to `inner` but fails every listing
pub struct ListingFailsStore {
    inner: Arc<dyn RecordStore>,
}

impl ListingFailsStore {
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl RecordStore for ListingFailsStore {
    async fn create(&self, record: &NewRecord) -> RecordResult<i64> {
        self.inner.create(record).await
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> RecordResult<()> {
        self.inner.delete(kind, id).await
    }

    async fn list(&self, _kind: EntityKind) -> RecordResult<Vec<Record>> {
        Err(RecordError::Store("listing unavailable".to_string()))
    }

    async fn list_children(&self, child: EntityKind, parent_id: i64) -> RecordResult<Vec<Record>> {
        self.inner.list_children(child, parent_id).await
    }

    async fn exists(&self, kind: EntityKind, field: &str, value: &FieldValue) -> RecordResult<bool> {
        self.inner.exists(kind, field, value).await
    }

    async fn health_check(&self) -> RecordResult<()> {
        self.inner.health_check().await
    }

    fn backend_name(&self) -> &'static str {
        "listing-fails"
    }
}
