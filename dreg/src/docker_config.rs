//! Docker client configuration, limited to the stored registry credentials.

use std::collections::HashMap;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;

/// Credentials stored for one registry host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthEntry {
    /// base64 of `username:password`
    #[serde(default)]
    pub auth: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

impl AuthEntry {
    /// The token sent after `Basic `, if the entry carries credentials.
    pub fn token(&self) -> Option<String> {
        if !self.auth.is_empty() {
            return Some(self.auth.clone());
        }
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => {
                Some(STANDARD.encode(format!("{}:{}", username, password)))
            }
            _ => None,
        }
    }
}

/// The subset of `~/.docker/config.json` holding registry credentials.
///
/// Keys are registry hosts as written by `docker login`, `host[:port]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DockerConfig {
    #[serde(default)]
    pub auths: HashMap<String, AuthEntry>,
}

impl DockerConfig {
    /// Read the credential store.
    ///
    /// The file is optional: a missing or malformed file yields an empty
    /// store, so requests simply go out without credentials.
    pub fn load(path: &Path) -> Self {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) => {
                debug!("Not reading docker config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&data) {
            Ok(config) => config,
            Err(e) => {
                debug!("Ignoring malformed docker config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Token stored for a registry host, if any.
    pub fn token(&self, host: &str) -> Option<String> {
        self.auths.get(host).and_then(AuthEntry::token)
    }
}
