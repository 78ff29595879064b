use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

use crate::digest::DigestError;

/// Errors returned by registry calls.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Unauthenticated: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registry returned {status}: {message}")]
    UnexpectedStatus { status: StatusCode, message: String },

    #[error("Invalid registry response: {0}")]
    InvalidResponse(String),

    #[error("Invalid registry URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    #[error("Digest error: {0}")]
    Digest(#[from] DigestError),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl RegistryError {
    /// Build an error from a non-success response status and its body.
    ///
    /// Bodies in the registry's `{"errors": [...]}` shape contribute their
    /// messages; anything else falls back to the canonical status reason.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = error_message(body)
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| status.to_string());

        match status {
            StatusCode::UNAUTHORIZED => RegistryError::Unauthorized(message),
            StatusCode::FORBIDDEN => RegistryError::Forbidden(message),
            StatusCode::NOT_FOUND => RegistryError::NotFound(message),
            _ => RegistryError::UnexpectedStatus { status, message },
        }
    }

    /// Whether the registry rejected the caller's credentials.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            RegistryError::Unauthorized(_) | RegistryError::Forbidden(_)
        )
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    errors: Vec<ErrorInfo>,
}

#[derive(Debug, Deserialize)]
struct ErrorInfo {
    code: String,
    #[serde(default)]
    message: String,
}

fn error_message(body: &str) -> Option<String> {
    let response: ErrorResponse = serde_json::from_str(body).ok()?;
    let messages: Vec<String> = response
        .errors
        .iter()
        .map(|e| {
            if e.message.is_empty() {
                e.code.clone()
            } else {
                format!("{} ({})", e.message, e.code)
            }
        })
        .collect();

    if messages.is_empty() {
        None
    } else {
        Some(messages.join("; "))
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
