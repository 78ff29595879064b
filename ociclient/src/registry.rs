use async_trait::async_trait;

use crate::digest::OciDigest;
use crate::error::Result;
use crate::models::{ImageManifest, TagList};

/// The registry operations the command layer relies on.
///
/// Each method is a single request/response exchange with no retries.
/// [`crate::Client`] implements this over HTTP; tests substitute in-memory
/// registries.
#[async_trait]
pub trait Registry: Send + Sync {
    /// Succeeds iff the registry answers the V2 API version check.
    async fn check_api(&self) -> Result<()>;

    /// All repository names known to the registry, in registry order.
    async fn list_repositories(&self) -> Result<Vec<String>>;

    /// Tags of one repository, in registry order.
    async fn list_tags(&self, name: &str) -> Result<TagList>;

    /// Manifest identified by a repository and a tag or digest.
    async fn get_manifest(&self, name: &str, reference: &str) -> Result<ImageManifest>;

    /// Content digest of the manifest a reference currently points at.
    async fn get_digest(&self, name: &str, reference: &str) -> Result<OciDigest>;

    /// Delete a manifest. Registries only accept a digest as the reference.
    async fn delete_image(&self, name: &str, reference: &str) -> Result<()>;
}
