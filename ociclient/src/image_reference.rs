use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Reference used when an image specifier names only a repository.
pub const DEFAULT_REFERENCE: &str = "latest";

/// Error type for image specifier parsing
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageReferenceError {
    #[error("Invalid image reference format: {0}")]
    InvalidFormat(String),
}

/// An image within a registry, written `repository[:reference]`.
///
/// The string is split on the first `:` only, so everything after it is the
/// reference (a tag or a digest). A missing reference means `latest`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReference {
    /// Repository name
    pub repository: String,
    /// Tag or digest
    pub reference: String,
}

impl ImageReference {
    pub fn new(repository: impl Into<String>, reference: impl Into<String>) -> Self {
        Self {
            repository: repository.into(),
            reference: reference.into(),
        }
    }
}

impl FromStr for ImageReference {
    type Err = ImageReferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (repository, reference) = s.split_once(':').unwrap_or((s, DEFAULT_REFERENCE));

        if repository.is_empty() || reference.is_empty() {
            return Err(ImageReferenceError::InvalidFormat(s.to_string()));
        }

        Ok(ImageReference::new(repository, reference))
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.repository, self.reference)
    }
}
