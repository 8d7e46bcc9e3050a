//! Login gate in front of the business modules.
//!
//! A single credential pair, taken from configuration, grants access. The
//! check sits behind [`CredentialCheck`] so a different source can be
//! plugged in without touching the io layer.

use log::{info, warn};

use crate::domain::commands::{LoginCommand, LoginResult};

pub trait CredentialCheck: Send + Sync {
    fn verify(&self, username: &str, password: &str) -> bool;
}

/// Exact match against one configured username and password
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    username: String,
    password: String,
}

impl StaticCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl CredentialCheck for StaticCredentials {
    fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && password == self.password
    }
}

pub struct AuthService {
    checker: Box<dyn CredentialCheck>,
}

impl AuthService {
    pub fn new(checker: Box<dyn CredentialCheck>) -> Self {
        Self { checker }
    }

    pub fn login(&self, command: LoginCommand) -> LoginResult {
        if self.checker.verify(&command.username, &command.password) {
            info!("Login succeeded for user '{}'", command.username);
            LoginResult {
                success: true,
                message: "Login successful".to_string(),
            }
        } else {
            warn!("Login failed for user '{}'", command.username);
            LoginResult {
                success: false,
                message: "Incorrect username or password".to_string(),
            }
        }
    }
}
