//! # CSV Record Store
//!
//! File-backed alternative to the SQLite store. Each table lives in
//! `<data dir>/<table>.csv` with an `id` column followed by the descriptor's
//! columns; identifiers come from `sequences.yaml` and are never reused.
//!
//! Every write rewrites the whole table file through a temp file and a
//! rename, so a reader never sees a half-written table.

use async_trait::async_trait;
use log::info;
use std::collections::HashMap;
use tokio::sync::Mutex;

use super::connection::CsvConnection;
use crate::domain::entities::{now_timestamp, EntityKind, FieldKind};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{sort_records, FieldValue, NewRecord, Record};
use crate::storage::constraints::{check_create_constraints, check_delete_constraints};
use crate::storage::traits::RecordStore;

pub struct CsvRecordStore {
    connection: CsvConnection,
    op_lock: Mutex<()>,
}

impl CsvRecordStore {
    pub fn new(connection: CsvConnection) -> Self {
        Self {
            connection,
            op_lock: Mutex::new(()),
        }
    }

    /// Fill in joined parent columns, then order rows for listing
    fn present(&self, kind: EntityKind, mut rows: Vec<Record>) -> RecordResult<Vec<Record>> {
        let descriptor = kind.descriptor();

        if let Some(join) = descriptor.join {
            let parents = self.connection.read_table(join.parent.descriptor())?;
            let lookup: HashMap<String, FieldValue> = parents
                .iter()
                .filter_map(|p| {
                    let key = p.value(join.parent_key)?.to_string();
                    let value = p.value(join.parent_field)?;
                    Some((key, value))
                })
                .collect();

            for row in rows.iter_mut() {
                let matched = row
                    .value(join.local_key)
                    .and_then(|key| lookup.get(&key.to_string()).cloned());
                if let Some(value) = matched {
                    row.values.insert(join.alias.to_string(), value);
                }
            }
        }

        sort_records(&mut rows, descriptor.order_by);
        Ok(rows)
    }
}

#[async_trait]
impl RecordStore for CsvRecordStore {
    async fn create(&self, record: &NewRecord) -> RecordResult<i64> {
        let descriptor = record.kind.descriptor();
        let _guard = self.op_lock.lock().await;

        check_create_constraints(self, record).await?;

        let mut rows = self.connection.read_table(descriptor)?;
        let floor = rows.iter().map(|r| r.id).max().unwrap_or(0);
        let id = self.connection.next_id(descriptor, floor)?;

        let stamp = now_timestamp();
        let mut row = Record::new(id);
        for spec in descriptor.fields {
            let value = if spec.kind == FieldKind::CreatedAt {
                FieldValue::Text(stamp.clone())
            } else {
                record
                    .get(spec.name)
                    .cloned()
                    .ok_or_else(|| RecordError::validation(spec.name, "is required"))?
            };
            row.values.insert(spec.name.to_string(), value);
        }

        rows.push(row);
        self.connection.write_table(descriptor, &rows)?;

        info!("Inserted {} {} into {}.csv", record.kind, id, descriptor.table);
        Ok(id)
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> RecordResult<()> {
        let descriptor = kind.descriptor();
        let _guard = self.op_lock.lock().await;

        let mut rows = self.connection.read_table(descriptor)?;
        let position = rows
            .iter()
            .position(|r| r.id == id)
            .ok_or(RecordError::NotFound { kind, id })?;

        check_delete_constraints(self, kind, &rows[position]).await?;

        rows.remove(position);
        self.connection.write_table(descriptor, &rows)?;

        info!("Deleted {} {} from {}.csv", kind, id, descriptor.table);
        Ok(())
    }

    async fn list(&self, kind: EntityKind) -> RecordResult<Vec<Record>> {
        let rows = self.connection.read_table(kind.descriptor())?;
        self.present(kind, rows)
    }

    async fn list_children(&self, child: EntityKind, parent_id: i64) -> RecordResult<Vec<Record>> {
        let reference = child.descriptor().reference.ok_or_else(|| {
            RecordError::Store(format!("{} has no parent entity", child))
        })?;

        let parent = self
            .connection
            .read_table(reference.parent.descriptor())?
            .into_iter()
            .find(|r| r.id == parent_id)
            .ok_or(RecordError::NotFound {
                kind: reference.parent,
                id: parent_id,
            })?;
        let key = parent.value(reference.parent_key);

        let rows = self
            .connection
            .read_table(child.descriptor())?
            .into_iter()
            .filter(|r| r.value(reference.field) == key)
            .collect();

        self.present(child, rows)
    }

    async fn exists(&self, kind: EntityKind, field: &str, value: &FieldValue) -> RecordResult<bool> {
        let descriptor = kind.descriptor();
        if field != "id" && descriptor.field(field).is_none() {
            return Err(RecordError::Store(format!("{} has no column {}", descriptor.table, field)));
        }

        let rows = self.connection.read_table(descriptor)?;
        Ok(rows.iter().any(|r| r.value(field).as_ref() == Some(value)))
    }

    async fn health_check(&self) -> RecordResult<()> {
        let base = self.connection.base_directory();
        if !base.is_dir() {
            return Err(RecordError::Store(format!(
                "data directory {} is not available",
                base.display()
            )));
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "csv"
    }
}
