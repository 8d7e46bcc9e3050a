//! # Application Configuration
//!
//! Settings are read from a YAML file and may be overridden from the
//! environment. Lookup order for the file:
//!
//! 1. the path in `BUSINESS_MANAGER_CONFIG`
//! 2. `config.yaml` inside the default data directory
//! 3. built-in defaults when neither exists
//!
//! ```yaml
//! storage: sqlite
//! data_directory: /home/me/Documents/Business Manager
//! database_file: business.db
//! bind_address: 127.0.0.1:3000
//! credentials:
//!   username: admin
//!   password: "1234"
//! ```

use anyhow::{bail, Context, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const CONFIG_PATH_ENV: &str = "BUSINESS_MANAGER_CONFIG";
pub const DATA_DIR_ENV: &str = "BUSINESS_MANAGER_DATA_DIR";
pub const STORAGE_ENV: &str = "BUSINESS_MANAGER_STORAGE";

const CONFIG_FILE: &str = "config.yaml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    Sqlite,
    Csv,
}

impl FromStr for StorageKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(StorageKind::Sqlite),
            "csv" => Ok(StorageKind::Csv),
            other => bail!("Unknown storage backend '{}', expected sqlite or csv", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "1234".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub storage: StorageKind,
    pub data_directory: PathBuf,
    pub database_file: String,
    pub bind_address: SocketAddr,
    pub credentials: Credentials,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage: StorageKind::Sqlite,
            data_directory: default_data_directory(),
            database_file: "business.db".to_string(),
            bind_address: SocketAddr::from(([127, 0, 0, 1], 3000)),
            credentials: Credentials::default(),
        }
    }
}

impl AppConfig {
    /// Load from the configured location and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = match std::env::var_os(CONFIG_PATH_ENV) {
            Some(explicit) => Some(PathBuf::from(explicit)),
            None => {
                let candidate = default_data_directory().join(CONFIG_FILE);
                candidate.exists().then_some(candidate)
            }
        };

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => {
                info!("No configuration file found, using defaults");
                Self::default()
            }
        };

        config.apply_overrides(
            std::env::var(DATA_DIR_ENV).ok(),
            std::env::var(STORAGE_ENV).ok(),
        )?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = serde_yaml::from_str(&content)
            .with_context(|| format!("Invalid configuration file {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    fn apply_overrides(&mut self, data_dir: Option<String>, storage: Option<String>) -> Result<()> {
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.data_directory = PathBuf::from(dir);
        }
        if let Some(kind) = storage.filter(|s| !s.trim().is_empty()) {
            self.storage = kind.parse()?;
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_directory.join(&self.database_file)
    }
}

/// `~/Documents/Business Manager`, falling back to the working directory
/// when no home directory can be determined
pub fn default_data_directory() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("Business Manager")
}
