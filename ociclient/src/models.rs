use serde::{Deserialize, Serialize};

use crate::digest::OciDigest;

/// Docker image manifest, schema 2.
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// OCI image manifest.
pub const OCI_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
/// Docker multi-platform manifest list.
pub const DOCKER_MANIFEST_LIST_V2: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";
/// OCI image index.
pub const OCI_INDEX_V1: &str = "application/vnd.oci.image.index.v1+json";

/// Represents a descriptor for a content blob in an OCI registry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    /// Media type of the referenced content
    #[serde(default)]
    pub media_type: String,
    /// Digest of the referenced content
    pub digest: OciDigest,
    /// Size of the referenced content in bytes
    pub size: u64,
}

/// Represents an image manifest (Docker schema 2 or OCI)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifest {
    /// Schema version of the manifest
    pub schema_version: i32,
    /// Media type of the manifest
    #[serde(default)]
    pub media_type: String,
    /// Descriptor for the config blob
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Descriptor>,
    /// Descriptors for the layer blobs
    #[serde(default)]
    pub layers: Vec<Descriptor>,
}

impl ImageManifest {
    /// Sum of the declared (compressed) sizes of every layer.
    pub fn total_size(&self) -> u64 {
        self.layers.iter().map(|layer| layer.size).sum()
    }
}

/// Tags of a single repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagList {
    pub name: String,
    pub tags: Vec<String>,
}

// Catalog response
#[derive(Debug, Deserialize)]
pub(crate) struct CatalogResponse {
    #[serde(default)]
    pub repositories: Option<Vec<String>>,
}

// Tags list response; registries send `"tags": null` for untagged repositories
#[derive(Debug, Deserialize)]
pub(crate) struct TagsListResponse {
    pub name: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}
