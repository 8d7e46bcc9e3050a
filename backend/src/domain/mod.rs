//! # Domain Module
//!
//! Business rules for the purchases, employees and production modules,
//! independent of how records are stored or how requests arrive.

pub mod auth_service;
pub mod commands;
pub mod entities;
pub mod errors;
pub mod form_session;
pub mod models;
pub mod module_controller;
pub mod validation;

pub use auth_service::{AuthService, CredentialCheck, StaticCredentials};
pub use entities::EntityKind;
pub use errors::{RecordError, RecordResult};
pub use form_session::{FormSession, Phase};
pub use module_controller::{ModuleController, ProductionModule};
