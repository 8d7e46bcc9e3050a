use async_trait::async_trait;
use log::{debug, info};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;
use tokio::sync::Mutex;

use super::connection::DbConnection;
use crate::domain::entities::{now_timestamp, EntityDescriptor, EntityKind, FieldKind};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{FieldValue, NewRecord, Record};
use crate::storage::constraints::{check_create_constraints, check_delete_constraints};
use crate::storage::traits::RecordStore;

/// Record store over the SQLite schema set up by [`DbConnection`]
pub struct SqliteRecordStore {
    db: DbConnection,
    /// Held for the whole of a create or delete, pre-checks included
    op_lock: Mutex<()>,
}

impl SqliteRecordStore {
    pub fn new(db: DbConnection) -> Self {
        Self {
            db,
            op_lock: Mutex::new(()),
        }
    }

    pub fn connection(&self) -> &DbConnection {
        &self.db
    }

    async fn fetch(&self, descriptor: &EntityDescriptor, id: i64) -> RecordResult<Option<Record>> {
        let sql = format!("{} WHERE t.id = ?", select_sql(descriptor));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(self.db.pool())
            .await?;

        row.map(|r| row_to_record(descriptor, &r)).transpose()
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn create(&self, record: &NewRecord) -> RecordResult<i64> {
        let descriptor = record.kind.descriptor();
        let _guard = self.op_lock.lock().await;

        check_create_constraints(self, record).await?;

        let columns = descriptor.column_names();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            descriptor.table,
            columns.join(", "),
            placeholders
        );

        let stamp = now_timestamp();
        let mut query = sqlx::query(&sql);
        for spec in descriptor.fields {
            query = if spec.kind == FieldKind::CreatedAt {
                query.bind(stamp.clone())
            } else {
                let value = record
                    .get(spec.name)
                    .ok_or_else(|| RecordError::validation(spec.name, "is required"))?;
                bind_value(query, value)
            };
        }

        let result = query
            .execute(self.db.pool())
            .await
            .map_err(|e| map_insert_error(descriptor, record, e))?;

        let id = result.last_insert_rowid();
        info!("Inserted {} {} into {}", record.kind, id, descriptor.table);
        Ok(id)
    }

    async fn delete(&self, kind: EntityKind, id: i64) -> RecordResult<()> {
        let descriptor = kind.descriptor();
        let _guard = self.op_lock.lock().await;

        let row = self
            .fetch(descriptor, id)
            .await?
            .ok_or(RecordError::NotFound { kind, id })?;

        check_delete_constraints(self, kind, &row).await?;

        let sql = format!("DELETE FROM {} WHERE id = ?", descriptor.table);
        let result = sqlx::query(&sql)
            .bind(id)
            .execute(self.db.pool())
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    RecordError::Conflict(format!("{} {} is still referenced", kind, id))
                }
                other => RecordError::from(other),
            })?;

        if result.rows_affected() == 0 {
            return Err(RecordError::NotFound { kind, id });
        }

        info!("Deleted {} {} from {}", kind, id, descriptor.table);
        Ok(())
    }

    async fn list(&self, kind: EntityKind) -> RecordResult<Vec<Record>> {
        let descriptor = kind.descriptor();
        let sql = format!("{} {}", select_sql(descriptor), order_sql(descriptor));

        let rows = sqlx::query(&sql).fetch_all(self.db.pool()).await?;
        debug!("Listed {} rows from {}", rows.len(), descriptor.table);

        rows.iter().map(|r| row_to_record(descriptor, r)).collect()
    }

    async fn list_children(&self, child: EntityKind, parent_id: i64) -> RecordResult<Vec<Record>> {
        let descriptor = child.descriptor();
        let reference = descriptor.reference.ok_or_else(|| {
            RecordError::Store(format!("{} has no parent entity", child))
        })?;

        let parent = self
            .fetch(reference.parent.descriptor(), parent_id)
            .await?
            .ok_or(RecordError::NotFound {
                kind: reference.parent,
                id: parent_id,
            })?;
        let key = parent.value(reference.parent_key).ok_or_else(|| {
            RecordError::Store(format!("{} has no column {}", reference.parent, reference.parent_key))
        })?;

        let sql = format!(
            "{} WHERE t.{} = ? {}",
            select_sql(descriptor),
            reference.field,
            order_sql(descriptor)
        );
        let rows = bind_value(sqlx::query(&sql), &key)
            .fetch_all(self.db.pool())
            .await?;

        rows.iter().map(|r| row_to_record(descriptor, r)).collect()
    }

    async fn exists(&self, kind: EntityKind, field: &str, value: &FieldValue) -> RecordResult<bool> {
        let descriptor = kind.descriptor();
        if field != "id" && descriptor.field(field).is_none() {
            return Err(RecordError::Store(format!("{} has no column {}", descriptor.table, field)));
        }

        let sql = format!("SELECT 1 FROM {} WHERE {} = ? LIMIT 1", descriptor.table, field);
        let row = bind_value(sqlx::query(&sql), value)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.is_some())
    }

    async fn health_check(&self) -> RecordResult<()> {
        if self.db.pool().is_closed() {
            return Err(RecordError::Store("database connection is closed".to_string()));
        }
        sqlx::query("SELECT 1").execute(self.db.pool()).await?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: &FieldValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        FieldValue::Text(s) => query.bind(s.clone()),
        FieldValue::Integer(i) => query.bind(*i),
        FieldValue::Decimal(d) => query.bind(*d),
        FieldValue::Flag(b) => query.bind(i64::from(*b)),
    }
}

/// `SELECT` over the entity table aliased `t`, joined to its parent as `p`
fn select_sql(descriptor: &EntityDescriptor) -> String {
    let mut columns = vec!["t.id AS id".to_string()];
    columns.extend(descriptor.fields.iter().map(|f| format!("t.{0} AS {0}", f.name)));

    let mut from = format!("{} t", descriptor.table);
    if let Some(join) = descriptor.join {
        columns.push(format!("p.{} AS {}", join.parent_field, join.alias));
        from.push_str(&format!(
            " LEFT JOIN {} p ON t.{} = p.{}",
            join.parent.descriptor().table,
            join.local_key,
            join.parent_key
        ));
    }

    format!("SELECT {} FROM {}", columns.join(", "), from)
}

fn order_sql(descriptor: &EntityDescriptor) -> String {
    let terms: Vec<String> = descriptor
        .order_by
        .iter()
        .map(|(field, direction)| format!("t.{} {}", field, direction.sql()))
        .collect();
    format!("ORDER BY {}", terms.join(", "))
}

fn row_to_record(descriptor: &EntityDescriptor, row: &SqliteRow) -> RecordResult<Record> {
    let mut record = Record::new(row.try_get("id")?);

    for spec in descriptor.fields {
        let value = match spec.kind {
            FieldKind::Text | FieldKind::Sku | FieldKind::CreatedAt => {
                FieldValue::Text(row.try_get(spec.name)?)
            }
            FieldKind::Integer | FieldKind::PositiveInteger => FieldValue::Integer(row.try_get(spec.name)?),
            FieldKind::Decimal => FieldValue::Decimal(row.try_get(spec.name)?),
            FieldKind::Flag => FieldValue::Flag(row.try_get::<i64, _>(spec.name)? != 0),
        };
        record.values.insert(spec.name.to_string(), value);
    }

    if let Some(join) = descriptor.join {
        if let Some(name) = row.try_get::<Option<String>, _>(join.alias)? {
            record.values.insert(join.alias.to_string(), FieldValue::Text(name));
        }
    }

    Ok(record)
}

// Normally caught earlier by the constraint pre-checks.
fn map_insert_error(descriptor: &EntityDescriptor, record: &NewRecord, err: sqlx::Error) -> RecordError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return RecordError::Conflict(format!(
                "A {} with the same {} already exists",
                descriptor.kind,
                descriptor.unique.join(", ")
            ));
        }
        if db.is_foreign_key_violation() {
            if let Some(reference) = descriptor.reference {
                return RecordError::Referential {
                    kind: reference.parent,
                    key: record
                        .get(reference.field)
                        .map(ToString::to_string)
                        .unwrap_or_default(),
                };
            }
        }
    }
    RecordError::from(err)
}
