//! Per-module form state held on behalf of the presentation shell.
//!
//! A session owns the form values, the table rows last loaded from the store
//! and the current selection. Operations walk the phases
//!
//! ```text
//! Idle -> Validating -> Rejected -----------------------> Idle
//!                    -> Writing -> (store error) -------> Idle
//!                               -> Displaying ----------> Idle
//! ```
//!
//! and always end in `Idle`. The phases visited by the most recent operation
//! are available from [`FormSession::trail`].
//!
//! If the write commits but the reload in `Displaying` fails, the operation
//! still succeeds; the rows keep their previous contents and the failure is
//! held in [`FormSession::listing_error`] until the next successful reload.

use log::{debug, info, warn};
use shared::FieldMap;

use crate::domain::errors::{RecordError, RecordResult};
use crate::domain::models::Record;
use crate::domain::module_controller::ModuleController;
use crate::domain::validation::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Rejected,
    Writing,
    Displaying,
}

pub struct FormSession {
    controller: ModuleController,
    fields: FieldMap,
    selection: Option<i64>,
    rows: Vec<Record>,
    phase: Phase,
    trail: Vec<Phase>,
    listing_error: Option<RecordError>,
}

impl FormSession {
    pub fn new(controller: ModuleController) -> Self {
        Self {
            controller,
            fields: FieldMap::new(),
            selection: None,
            rows: Vec::new(),
            phase: Phase::Idle,
            trail: Vec::new(),
            listing_error: None,
        }
    }

    /// Load the initial listing
    pub async fn open(&mut self) -> RecordResult<()> {
        self.trail.clear();
        let result = self.reload().await;
        self.enter(Phase::Idle);
        result
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn trail(&self) -> &[Phase] {
        &self.trail
    }

    pub fn selection(&self) -> Option<i64> {
        self.selection
    }

    /// Why the rows could not be reloaded after the last committed write
    pub fn listing_error(&self) -> Option<&RecordError> {
        self.listing_error.as_ref()
    }

    /// Select a row of the current listing
    pub fn select(&mut self, id: i64) -> RecordResult<()> {
        if !self.rows.iter().any(|r| r.id == id) {
            return Err(RecordError::NotFound {
                kind: self.controller.kind(),
                id,
            });
        }
        self.selection = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    /// Validate and store the form. The form is cleared only on success.
    pub async fn submit(&mut self) -> RecordResult<i64> {
        self.trail.clear();
        self.enter(Phase::Validating);

        if let Err(e) = validate(self.controller.descriptor(), &self.fields) {
            self.enter(Phase::Rejected);
            self.enter(Phase::Idle);
            return Err(e);
        }

        self.enter(Phase::Writing);
        let id = match self.controller.add(&self.fields).await {
            Ok(id) => id,
            Err(e) => {
                self.enter(Phase::Idle);
                return Err(e);
            }
        };

        self.fields.clear();
        self.reload_after_write().await;
        self.enter(Phase::Idle);
        Ok(id)
    }

    /// Delete the selected row once `confirm` agrees. Returns `false` when the
    /// user declined.
    pub async fn delete_selected<F>(&mut self, confirm: F) -> RecordResult<bool>
    where
        F: FnOnce(&Record) -> bool,
    {
        self.trail.clear();
        let id = self.selection.ok_or(RecordError::NoSelection)?;
        let row = self
            .rows
            .iter()
            .find(|r| r.id == id)
            .ok_or(RecordError::NoSelection)?;

        if !confirm(row) {
            debug!("Delete of {} {} cancelled", self.controller.kind(), id);
            return Ok(false);
        }

        self.enter(Phase::Writing);
        if let Err(e) = self.controller.delete(id).await {
            self.enter(Phase::Idle);
            return Err(e);
        }

        self.selection = None;
        self.reload_after_write().await;
        self.enter(Phase::Idle);
        Ok(true)
    }

    /// Child rows of the selected record (the quality controls of a lot)
    pub async fn selected_children(&self) -> RecordResult<Vec<Record>> {
        let id = self.selection.ok_or(RecordError::NoSelection)?;
        self.controller.children_for(id).await
    }

    async fn reload_after_write(&mut self) {
        if let Err(e) = self.reload().await {
            warn!("{} listing not reloaded after write: {}", self.controller.kind(), e);
            self.listing_error = Some(e);
        }
    }

    async fn reload(&mut self) -> RecordResult<()> {
        self.enter(Phase::Displaying);
        self.rows = self.controller.refresh().await?;
        self.listing_error = None;
        if let Some(id) = self.selection {
            if !self.rows.iter().any(|r| r.id == id) {
                self.selection = None;
            }
        }
        info!("{} listing shows {} rows", self.controller.kind(), self.rows.len());
        Ok(())
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.trail.push(phase);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::EntityKind;
    use crate::storage::test_utils::{sqlite_store, ListingFailsStore};
    use crate::storage::RecordStore;
    use std::sync::Arc;

    async fn employee_session() -> FormSession {
        let controller = ModuleController::new(EntityKind::Employee, sqlite_store().await);
        let mut session = FormSession::new(controller);
        session.open().await.unwrap();
        session
    }

    fn fill_employee(session: &mut FormSession, name: &str) {
        session.set_field("nombre", name);
        session.set_field("puesto", "Cajero");
        session.set_field("fecha_ingreso", "2024-03-01");
        session.set_field("sueldo", "350000");
        session.set_field("sucursal", "Centro");
        session.set_field("contacto_mail", "caja@example.com");
        session.set_field("celular", "11-4444-0000");
    }

    #[tokio::test]
    async fn test_successful_submit_clears_form() {
        let mut session = employee_session().await;
        fill_employee(&mut session, "Marta");

        let id = session.submit().await.unwrap();

        assert!(session.fields().is_empty());
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].id, id);
        assert_eq!(session.phase(), Phase::Idle);
        assert_eq!(
            session.trail(),
            &[Phase::Validating, Phase::Writing, Phase::Displaying, Phase::Idle]
        );
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_form() {
        let mut session = employee_session().await;
        fill_employee(&mut session, "Marta");
        session.set_field("sueldo", "mucho");

        let result = session.submit().await;

        assert!(matches!(result, Err(RecordError::Validation { ref field, .. }) if field == "sueldo"));
        assert_eq!(session.fields()["sueldo"], "mucho");
        assert_eq!(session.fields()["nombre"], "Marta");
        assert!(session.rows().is_empty());
        assert_eq!(session.trail(), &[Phase::Validating, Phase::Rejected, Phase::Idle]);
    }

    #[tokio::test]
    async fn test_store_rejection_keeps_form() {
        let controller = ModuleController::new(EntityKind::Lot, sqlite_store().await);
        let mut session = FormSession::new(controller);
        session.set_field("producto_sku", "ZZZ");
        session.set_field("cantidad", "5");

        let result = session.submit().await;

        assert!(matches!(result, Err(RecordError::Referential { .. })));
        assert_eq!(session.fields()["producto_sku"], "ZZZ");
        assert_eq!(session.trail(), &[Phase::Validating, Phase::Writing, Phase::Idle]);
    }

    #[tokio::test]
    async fn test_delete_without_selection() {
        let mut session = employee_session().await;
        fill_employee(&mut session, "Marta");
        session.submit().await.unwrap();

        let result = session.delete_selected(|_| true).await;

        assert!(matches!(result, Err(RecordError::NoSelection)));
        assert_eq!(session.rows().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_selected_after_confirmation() {
        let mut session = employee_session().await;
        fill_employee(&mut session, "Marta");
        let first = session.submit().await.unwrap();
        fill_employee(&mut session, "Jorge");
        session.submit().await.unwrap();

        session.select(first).unwrap();
        let declined = session.delete_selected(|_| false).await.unwrap();
        assert!(!declined);
        assert_eq!(session.rows().len(), 2);
        assert_eq!(session.selection(), Some(first));

        let deleted = session
            .delete_selected(|row| row.text("nombre").unwrap() == "Marta")
            .await
            .unwrap();
        assert!(deleted);
        assert_eq!(session.selection(), None);
        assert_eq!(session.rows().len(), 1);
        assert_eq!(session.rows()[0].text("nombre").unwrap(), "Jorge");
    }

    #[tokio::test]
    async fn test_select_unknown_row() {
        let mut session = employee_session().await;
        assert!(matches!(session.select(5), Err(RecordError::NotFound { id: 5, .. })));
        assert_eq!(session.selection(), None);
    }

    #[tokio::test]
    async fn test_selected_children_without_selection() {
        let controller = ModuleController::new(EntityKind::Lot, sqlite_store().await);
        let session = FormSession::new(controller);

        assert!(matches!(session.selected_children().await, Err(RecordError::NoSelection)));
    }

    #[tokio::test]
    async fn test_committed_submit_survives_failed_reload() {
        let inner = sqlite_store().await;
        let store: Arc<dyn RecordStore> = Arc::new(ListingFailsStore::new(inner.clone()));
        let mut session = FormSession::new(ModuleController::new(EntityKind::Employee, store));
        fill_employee(&mut session, "Marta");

        let id = session.submit().await.unwrap();

        assert!(session.fields().is_empty());
        assert!(session.rows().is_empty());
        assert!(matches!(session.listing_error(), Some(RecordError::Store(_))));
        assert_eq!(
            session.trail(),
            &[Phase::Validating, Phase::Writing, Phase::Displaying, Phase::Idle]
        );
        let stored = inner.list(EntityKind::Employee).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, id);
    }

    #[tokio::test]
    async fn test_listing_error_cleared_by_next_reload() {
        let inner = sqlite_store().await;
        let failing: Arc<dyn RecordStore> = Arc::new(ListingFailsStore::new(inner.clone()));
        let mut session = FormSession::new(ModuleController::new(EntityKind::Employee, failing));
        fill_employee(&mut session, "Marta");
        session.submit().await.unwrap();
        assert!(session.listing_error().is_some());

        session.controller = ModuleController::new(EntityKind::Employee, inner);
        session.open().await.unwrap();

        assert!(session.listing_error().is_none());
        assert_eq!(session.rows().len(), 1);
    }
}
