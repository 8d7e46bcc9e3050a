//! Pre-checks shared by both backends.
//!
//! Callers hold the store's operation lock, so nothing can slip in between
//! the check and the write that follows it.

use crate::domain::entities::EntityKind;
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::{NewRecord, Record};
use crate::storage::traits::RecordStore;

/// Unique columns must be free and the referenced parent must exist
pub async fn check_create_constraints<S>(store: &S, record: &NewRecord) -> RecordResult<()>
where
    S: RecordStore + ?Sized,
{
    let descriptor = record.kind.descriptor();

    for field in descriptor.unique {
        if let Some(value) = record.get(field) {
            if store.exists(record.kind, field, value).await? {
                return Err(RecordError::Conflict(format!(
                    "A {} with {} '{}' already exists",
                    record.kind, field, value
                )));
            }
        }
    }

    if let Some(reference) = descriptor.reference {
        let value = record.get(reference.field).ok_or_else(|| {
            RecordError::validation(reference.field, "is required")
        })?;
        if !store.exists(reference.parent, reference.parent_key, value).await? {
            return Err(RecordError::Referential {
                kind: reference.parent,
                key: value.to_string(),
            });
        }
    }

    Ok(())
}

/// A row may not be deleted while another kind still points at it
pub async fn check_delete_constraints<S>(store: &S, kind: EntityKind, row: &Record) -> RecordResult<()>
where
    S: RecordStore + ?Sized,
{
    for dependent in kind.dependents() {
        let Some(reference) = dependent.reference else {
            continue;
        };
        let Some(key) = row.value(reference.parent_key) else {
            continue;
        };
        if store.exists(dependent.kind, reference.field, &key).await? {
            return Err(RecordError::Conflict(format!(
                "{} {} is still referenced by at least one {}",
                kind, row.id, dependent.kind
            )));
        }
    }
    Ok(())
}
