use std::{collections::HashMap, fs, io, path::Path};

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Credential, CredentialEntry, Role},
};

/// Layout of the credentials file
#[derive(Debug, Deserialize)]
struct CredentialsFile {
    #[serde(default)]
    users: HashMap<String, CredentialEntry>,
}

/// Login check against a static credential set
///
/// Passwords are compared verbatim. There is no hashing, lockout or rate
/// limiting; the gate only decides admitted or denied.
#[derive(Debug, Clone)]
pub struct AccessGate {
    credentials: HashMap<String, Credential>,
}

impl AccessGate {
    pub fn new(credentials: impl IntoIterator<Item = Credential>) -> Self {
        Self {
            credentials: credentials
                .into_iter()
                .map(|c| (c.username.clone(), c))
                .collect(),
        }
    }

    /// Loads the credential set once from a JSON file
    ///
    /// A missing file falls back to the built-in demo accounts; an
    /// unreadable or malformed file is an error.
    pub fn load(path: &Path) -> AppResult<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.display(),
                    "Credentials file not found, using demo accounts"
                );
                return Ok(Self::demo());
            }
            Err(e) => return Err(AppError::malformed(path, e.to_string())),
        };

        let file: CredentialsFile =
            serde_json::from_str(&raw).map_err(|e| AppError::malformed(path, e.to_string()))?;
        let gate = Self::new(
            file.users
                .into_iter()
                .map(|(username, entry)| entry.into_credential(username)),
        );

        tracing::info!(accounts = gate.credentials.len(), "Loaded credentials");
        Ok(gate)
    }

    /// Demo accounts used when no credentials file exists
    pub fn demo() -> Self {
        Self::new([
            Credential {
                username: "demo".to_string(),
                password: "demo123".to_string(),
                role: Role::Guest,
                name: "Demo User".to_string(),
                email: Some("demo@example.com".to_string()),
            },
            Credential {
                username: "admin".to_string(),
                password: "admin123".to_string(),
                role: Role::Admin,
                name: "Administrator".to_string(),
                email: Some("admin@example.com".to_string()),
            },
        ])
    }

    /// Admits the pair only on an exact username and password match
    pub fn authenticate(&self, username: &str, password: &str) -> AppResult<&Credential> {
        match self.credentials.get(username) {
            Some(credential) if credential.password == password => {
                tracing::info!(username = %username, "Login admitted");
                Ok(credential)
            }
            _ => {
                tracing::warn!(username = %username, "Login denied");
                Err(AppError::InvalidCredentials)
            }
        }
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}
