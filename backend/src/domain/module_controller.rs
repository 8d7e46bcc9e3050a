//! Module controller domain logic.
//!
//! One generic controller per entity kind replaces a hand-written service per
//! module. Every operation follows the same path:
//!
//! 1. validation against the entity descriptor (adds only)
//! 2. `health_check` on the injected store
//! 3. the single store write
//! 4. a fresh listing re-read from the store
//!
//! A failure in steps 1-3 returns before the next one, so a rejected form
//! never reaches the store. Once the write has committed, a failed re-read
//! is reported next to the result instead of replacing it.

use log::{info, warn};
use shared::FieldMap;
use std::sync::Arc;

use crate::domain::commands::{AddRecordCommand, AddRecordResult, DeleteRecordCommand, DeleteRecordResult};
use crate::domain::entities::{EntityDescriptor, EntityKind};
use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::Record;
use crate::domain::validation::validate;
use crate::storage::RecordStore;

#[derive(Clone)]
pub struct ModuleController {
    descriptor: &'static EntityDescriptor,
    store: Arc<dyn RecordStore>,
}

impl ModuleController {
    pub fn new(kind: EntityKind, store: Arc<dyn RecordStore>) -> Self {
        Self {
            descriptor: kind.descriptor(),
            store,
        }
    }

    pub fn kind(&self) -> EntityKind {
        self.descriptor.kind
    }

    pub fn descriptor(&self) -> &'static EntityDescriptor {
        self.descriptor
    }

    /// Validate `fields` and insert them, returning the new identifier
    pub async fn add(&self, fields: &FieldMap) -> RecordResult<i64> {
        let record = validate(self.descriptor, fields).map_err(|e| {
            warn!("Rejected {} form: {}", self.kind(), e);
            e
        })?;

        self.store.health_check().await?;

        let id = self.store.create(&record).await.map_err(|e| {
            warn!("Failed to add {}: {}", self.kind(), e);
            e
        })?;

        info!("Added {} {} via {} store", self.kind(), id, self.store.backend_name());
        Ok(id)
    }

    pub async fn delete(&self, id: i64) -> RecordResult<()> {
        self.store.health_check().await?;

        self.store.delete(self.kind(), id).await.map_err(|e| {
            warn!("Failed to delete {} {}: {}", self.kind(), id, e);
            e
        })?;

        info!("Deleted {} {}", self.kind(), id);
        Ok(())
    }

    /// Current listing in the kind's display order
    pub async fn refresh(&self) -> RecordResult<Vec<Record>> {
        self.store.health_check().await?;
        self.store.list(self.kind()).await
    }

    /// Child rows of `parent_id`, e.g. the quality controls of a lot
    pub async fn children_for(&self, parent_id: i64) -> RecordResult<Vec<Record>> {
        let child = self.descriptor.child.ok_or_else(|| {
            RecordError::Store(format!("{} records have no children", self.kind()))
        })?;

        self.store.health_check().await?;
        self.store.list_children(child, parent_id).await
    }

    /// Add, then return the refreshed listing with a confirmation message
    pub async fn add_record(&self, command: AddRecordCommand) -> RecordResult<AddRecordResult> {
        let id = self.add(&command.fields).await?;

        Ok(AddRecordResult {
            id,
            success_message: format!("{} {} added successfully", capitalize(self.kind()), id),
            listing: self.listing_after_write().await,
        })
    }

    pub async fn delete_record(&self, command: DeleteRecordCommand) -> RecordResult<DeleteRecordResult> {
        self.delete(command.id).await?;

        Ok(DeleteRecordResult {
            deleted_id: command.id,
            success_message: format!("{} {} deleted successfully", capitalize(self.kind()), command.id),
            listing: self.listing_after_write().await,
        })
    }

    async fn listing_after_write(&self) -> RecordResult<Vec<Record>> {
        self.refresh().await.map_err(|e| {
            warn!("{} write committed but the listing could not be re-read: {}", self.kind(), e);
            e
        })
    }
}

fn capitalize(kind: EntityKind) -> String {
    let label = kind.to_string();
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => label,
    }
}

/// The production module: products, their lots and the lots' quality controls
#[derive(Clone)]
pub struct ProductionModule {
    pub products: ModuleController,
    pub lots: ModuleController,
    pub quality_controls: ModuleController,
}

impl ProductionModule {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            products: ModuleController::new(EntityKind::Product, store.clone()),
            lots: ModuleController::new(EntityKind::Lot, store.clone()),
            quality_controls: ModuleController::new(EntityKind::QualityControl, store),
        }
    }

    /// Traceability view of one lot
    pub async fn quality_controls_for(&self, lot_id: i64) -> RecordResult<Vec<Record>> {
        self.lots.children_for(lot_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::{csv_store, sqlite_store, ListingFailsStore};

    fn form(pairs: &[(&str, &str)]) -> FieldMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn purchase_form(supplier: &str) -> FieldMap {
        form(&[
            ("fecha", "2025-02-10"),
            ("proveedor", supplier),
            ("monto", "1250.75"),
            ("identificador_producto", "P-100"),
            ("cliente", "Tienda Centro"),
        ])
    }

    #[tokio::test]
    async fn test_add_purchase_round_trips() {
        let controller = ModuleController::new(EntityKind::Purchase, sqlite_store().await);

        let id = controller.add(&purchase_form(" Textiles SA ")).await.unwrap();
        let rows = controller.refresh().await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, id);
        assert_eq!(rows[0].text("proveedor").unwrap(), " Textiles SA ");
        assert_eq!(rows[0].text("identificador_producto").unwrap(), "P-100");
        assert_eq!(rows[0].decimal("monto").unwrap(), 1250.75);
    }

    #[tokio::test]
    async fn test_missing_field_writes_nothing() {
        let controller = ModuleController::new(EntityKind::Purchase, sqlite_store().await);
        let mut fields = purchase_form("Textiles SA");
        fields.remove("proveedor");

        let result = controller.add(&fields).await;

        assert!(matches!(result, Err(RecordError::Validation { ref field, .. }) if field == "proveedor"));
        assert!(controller.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_missing_purchase() {
        let controller = ModuleController::new(EntityKind::Purchase, sqlite_store().await);
        controller.add(&purchase_form("A")).await.unwrap();

        let result = controller.delete(999).await;

        assert!(matches!(result, Err(RecordError::NotFound { .. })));
        assert_eq!(controller.refresh().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_add_record_returns_refreshed_listing() {
        let controller = ModuleController::new(EntityKind::Purchase, sqlite_store().await);
        controller.add(&purchase_form("Primero")).await.unwrap();

        let result = controller
            .add_record(AddRecordCommand {
                fields: purchase_form("Segundo"),
            })
            .await
            .unwrap();

        let records = result.listing.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, result.id);
        assert_eq!(result.success_message, format!("Purchase {} added successfully", result.id));
    }

    #[tokio::test]
    async fn test_failed_listing_keeps_committed_add() {
        let inner = sqlite_store().await;
        let store: Arc<dyn RecordStore> = Arc::new(ListingFailsStore::new(inner.clone()));
        let controller = ModuleController::new(EntityKind::Purchase, store);

        let result = controller
            .add_record(AddRecordCommand {
                fields: purchase_form("Textiles SA"),
            })
            .await
            .unwrap();

        assert!(result.id > 0);
        assert!(matches!(result.listing, Err(RecordError::Store(_))));
        let stored = inner.list(EntityKind::Purchase).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, result.id);

        let deleted = controller
            .delete_record(DeleteRecordCommand { id: result.id })
            .await
            .unwrap();
        assert_eq!(deleted.deleted_id, result.id);
        assert!(deleted.listing.is_err());
        assert!(inner.list(EntityKind::Purchase).await.unwrap().is_empty());
    }

    async fn assert_traceability(store: Arc<dyn RecordStore>) {
        let production = ProductionModule::new(store);

        production
            .products
            .add(&form(&[("nombre", "Zapatilla"), ("sku", "AB1")]))
            .await
            .unwrap();
        let duplicate = production
            .products
            .add(&form(&[("nombre", "Zapatilla 2"), ("sku", "ab1")]))
            .await;
        assert!(matches!(duplicate, Err(RecordError::Conflict(_))));

        let missing = production
            .lots
            .add(&form(&[("producto_sku", "ZZZ"), ("cantidad", "5")]))
            .await;
        assert!(matches!(missing, Err(RecordError::Referential { .. })));
        assert!(production.lots.refresh().await.unwrap().is_empty());

        let lot = production
            .lots
            .add(&form(&[("producto_sku", "AB1"), ("cantidad", "50")]))
            .await
            .unwrap();
        production
            .quality_controls
            .add(&form(&[
                ("lote_id", &lot.to_string()),
                ("parametro", "weight"),
                ("valor", "12.5"),
                ("aprobado", "true"),
            ]))
            .await
            .unwrap();

        let controls = production.quality_controls_for(lot).await.unwrap();
        assert_eq!(controls.len(), 1);
        assert_eq!(controls[0].text("parametro").unwrap(), "weight");
        assert_eq!(controls[0].decimal("valor").unwrap(), 12.5);
        assert!(controls[0].flag("aprobado").unwrap());

        let products = production.products.refresh().await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].text("sku").unwrap(), "AB1");
    }

    #[tokio::test]
    async fn test_traceability_sqlite() {
        assert_traceability(sqlite_store().await).await;
    }

    #[tokio::test]
    async fn test_traceability_csv() {
        let (store, _temp_dir) = csv_store();
        assert_traceability(store).await;
    }

    #[tokio::test]
    async fn test_children_for_kind_without_children() {
        let controller = ModuleController::new(EntityKind::Purchase, sqlite_store().await);
        assert!(matches!(controller.children_for(1).await, Err(RecordError::Store(_))));
    }

    #[tokio::test]
    async fn test_closed_store_reports_store_error() {
        let db = crate::storage::DbConnection::in_memory().await.unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(crate::storage::SqliteRecordStore::new(db.clone()));
        let controller = ModuleController::new(EntityKind::Employee, store);
        db.close().await;

        assert!(matches!(controller.refresh().await, Err(RecordError::Store(_))));
        assert!(matches!(controller.delete(1).await, Err(RecordError::Store(_))));
    }

    #[tokio::test]
    async fn test_invalid_form_on_closed_store_is_validation_error() {
        let db = crate::storage::DbConnection::in_memory().await.unwrap();
        let store: Arc<dyn RecordStore> = Arc::new(crate::storage::SqliteRecordStore::new(db.clone()));
        let controller = ModuleController::new(EntityKind::Purchase, store);
        db.close().await;

        let mut fields = purchase_form("Textiles SA");
        fields.insert("monto".to_string(), "mil pesos".to_string());
        let result = controller.add(&fields).await;
        assert!(matches!(result, Err(RecordError::Validation { ref field, .. }) if field == "monto"));

        let result = controller.add(&purchase_form("Textiles SA")).await;
        assert!(matches!(result, Err(RecordError::Store(_))));
    }
}
