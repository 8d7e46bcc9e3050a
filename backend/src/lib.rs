//! # Business Manager Backend
//!
//! Record keeping for purchases, employees and production traceability,
//! stored in SQLite or plain CSV files.
//!
//! ## Architecture
//!
//! ```text
//! Desktop shell (out of tree)
//!     ↓  JSON over HTTP
//! IO layer (axum routers, DTO mappers)
//!     ↓
//! Domain layer (module controllers, validation, form sessions, login)
//!     ↓
//! Storage layer (RecordStore: SQLite or CSV)
//! ```
//!
//! The store is opened once at startup and shared by every controller.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use anyhow::{Context, Result};
use axum::{
    http::{HeaderValue, Method},
    Router,
};
use log::info;
use std::fs;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::config::{AppConfig, Credentials, StorageKind};
use crate::domain::{AuthService, EntityKind, ModuleController, ProductionModule, StaticCredentials};
use crate::storage::{CsvConnection, CsvRecordStore, DbConnection, RecordStore, SqliteRecordStore};

/// Controllers and services shared by every request handler
#[derive(Clone)]
pub struct AppState {
    pub purchases: ModuleController,
    pub employees: ModuleController,
    pub production: ProductionModule,
    pub auth_service: Arc<AuthService>,
}

/// Open the configured store. Any failure here is fatal for the application.
pub async fn open_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>> {
    fs::create_dir_all(&config.data_directory).with_context(|| {
        format!("Failed to create data directory {}", config.data_directory.display())
    })?;

    let store: Arc<dyn RecordStore> = match config.storage {
        StorageKind::Sqlite => {
            let db = DbConnection::open(&config.database_path()).await?;
            Arc::new(SqliteRecordStore::new(db))
        }
        StorageKind::Csv => {
            let connection = CsvConnection::new(&config.data_directory)?;
            Arc::new(CsvRecordStore::new(connection))
        }
    };

    store
        .health_check()
        .await
        .context("Record store failed its startup check")?;

    info!(
        "Using {} store in {}",
        store.backend_name(),
        config.data_directory.display()
    );
    Ok(store)
}

/// Initialize the backend with all required services
pub async fn initialize_backend(config: &AppConfig) -> Result<AppState> {
    info!("Setting up record store");
    let store = open_store(config).await?;

    info!("Setting up application state");
    Ok(initialize_with_store(store, &config.credentials))
}

/// Wire every controller to an already opened store
pub fn initialize_with_store(store: Arc<dyn RecordStore>, credentials: &Credentials) -> AppState {
    let checker = StaticCredentials::new(credentials.username.clone(), credentials.password.clone());

    AppState {
        purchases: ModuleController::new(EntityKind::Purchase, store.clone()),
        employees: ModuleController::new(EntityKind::Employee, store.clone()),
        production: ProductionModule::new(store),
        auth_service: Arc::new(AuthService::new(Box::new(checker))),
    }
}

/// Create the Axum router with all routes configured
pub fn create_router(app_state: AppState) -> Router {
    // CORS setup to allow frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(HeaderValue::from_static("http://localhost:8080"))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(Any);

    let api_routes = Router::new()
        .nest("/login", io::rest::auth_apis::router())
        .nest("/purchases", io::rest::purchase_apis::router())
        .nest("/employees", io::rest::employee_apis::router())
        .nest("/products", io::rest::production_apis::product_router())
        .nest("/lots", io::rest::production_apis::lot_router())
        .nest("/quality-controls", io::rest::production_apis::quality_control_router());

    Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir, storage: StorageKind) -> AppConfig {
        AppConfig {
            storage,
            data_directory: dir.path().join("data"),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_initialize_sqlite_backend_creates_database() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir, StorageKind::Sqlite);

        let state = initialize_backend(&config).await.unwrap();

        assert!(config.database_path().exists());
        assert!(state.purchases.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_initialize_csv_backend() {
        let temp_dir = TempDir::new().unwrap();
        let config = config_in(&temp_dir, StorageKind::Csv);

        let state = initialize_backend(&config).await.unwrap();

        assert!(config.data_directory.is_dir());
        assert!(state.production.lots.refresh().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unopenable_store_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();

        let config = AppConfig {
            data_directory: blocker.join("data"),
            ..AppConfig::default()
        };

        assert!(initialize_backend(&config).await.is_err());
    }
}
