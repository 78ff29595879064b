pub mod client;
pub mod digest;
pub mod error;
pub mod image_reference;
pub mod models;
pub mod registry;

// Re-export main client types for convenience
pub use client::{Client, ClientOption};
pub use digest::{DigestError, OciDigest};
pub use error::RegistryError;
pub use image_reference::{DEFAULT_REFERENCE, ImageReference, ImageReferenceError};
pub use models::{Descriptor, ImageManifest, TagList};
pub use registry::Registry;
pub use reqwest::StatusCode;
