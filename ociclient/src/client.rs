use std::fmt;

use async_trait::async_trait;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as ReqwestClient, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::digest::OciDigest;
use crate::error::{RegistryError, Result};
use crate::models::{
    CatalogResponse, DOCKER_MANIFEST_LIST_V2, DOCKER_MANIFEST_V2, ImageManifest, OCI_INDEX_V1,
    OCI_MANIFEST_V1, TagList, TagsListResponse,
};
use crate::registry::Registry;

const DOCKER_CONTENT_DIGEST: &str = "Docker-Content-Digest";

/// Decoration applied to every request a [`Client`] sends.
#[derive(Clone, PartialEq, Eq)]
pub enum ClientOption {
    /// Send a fixed header with each request.
    Header { name: String, value: String },
}

impl ClientOption {
    pub fn header(name: impl Into<String>, value: impl Into<String>) -> Self {
        ClientOption::Header {
            name: name.into(),
            value: value.into(),
        }
    }

    fn apply(&self, headers: &mut HeaderMap) -> Result<()> {
        match self {
            ClientOption::Header { name, value } => {
                let name = HeaderName::from_bytes(name.as_bytes())
                    .map_err(|e| RegistryError::InvalidHeader(format!("{}: {}", name, e)))?;
                let mut value = HeaderValue::from_str(value).map_err(|e| {
                    RegistryError::InvalidHeader(format!("{}: {}", name.as_str(), e))
                })?;
                if name == header::AUTHORIZATION {
                    value.set_sensitive(true);
                }
                headers.insert(name, value);
            }
        }
        Ok(())
    }
}

// Credentials must not end up in logs
impl fmt::Debug for ClientOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientOption::Header { name, value } => {
                let shown = if name.eq_ignore_ascii_case("authorization") {
                    "<redacted>"
                } else {
                    value.as_str()
                };
                f.debug_struct("Header")
                    .field("name", name)
                    .field("value", &shown)
                    .finish()
            }
        }
    }
}

/// A client for interacting with a Docker Registry V2 API.
#[derive(Debug, Clone)]
pub struct Client {
    base: Url,
    registry_url: String,
    client: ReqwestClient,
}

impl Client {
    /// Create a new client for the given registry URL.
    pub fn new(registry_url: &str, options: Vec<ClientOption>) -> Result<Self> {
        let base = Url::parse(registry_url)?;

        let mut headers = HeaderMap::new();
        for option in &options {
            option.apply(&mut headers)?;
        }

        let client = ReqwestClient::builder().default_headers(headers).build()?;

        Ok(Self {
            registry_url: base.as_str().trim_end_matches('/').to_string(),
            base,
            client,
        })
    }

    /// The registry base URL, without a trailing slash.
    pub fn registry_url(&self) -> &str {
        &self.registry_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.registry_url, path)
    }

    /// Send a request and turn non-success statuses into errors.
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(RegistryError::from_status(status, &body))
    }

    /// GET every page of a paginated listing, following `Link` headers.
    async fn get_pages<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let mut pages = Vec::new();
        let mut next = Some(self.url(path));

        while let Some(url) = next.take() {
            debug!("GET {}", url);
            let response = self.send(self.client.get(&url)).await?;

            next = match next_link(response.headers()) {
                Some(link) => {
                    let resolved = self.base.join(&link)?.to_string();
                    // A registry pointing back at the same page would loop forever
                    (resolved != url).then_some(resolved)
                }
                None => None,
            };

            pages.push(response.json::<T>().await?);
        }

        Ok(pages)
    }

    fn manifest_accept() -> String {
        format!("{}, {}", DOCKER_MANIFEST_V2, OCI_MANIFEST_V1)
    }

    // Without the list types a registry answers for one platform's child
    // manifest instead of the one the tag points at
    fn digest_accept() -> String {
        format!(
            "{}, {}, {}, {}",
            DOCKER_MANIFEST_LIST_V2, OCI_INDEX_V1, DOCKER_MANIFEST_V2, OCI_MANIFEST_V1
        )
    }
}

#[async_trait]
impl Registry for Client {
    async fn check_api(&self) -> Result<()> {
        let url = self.url("/v2/");
        debug!("GET {}", url);
        self.send(self.client.get(&url)).await?;
        Ok(())
    }

    async fn list_repositories(&self) -> Result<Vec<String>> {
        let pages: Vec<CatalogResponse> = self.get_pages("/v2/_catalog").await?;
        Ok(pages
            .into_iter()
            .flat_map(|page| page.repositories.unwrap_or_default())
            .collect())
    }

    async fn list_tags(&self, name: &str) -> Result<TagList> {
        let pages: Vec<TagsListResponse> =
            self.get_pages(&format!("/v2/{}/tags/list", name)).await?;

        let mut list = TagList {
            name: name.to_string(),
            tags: Vec::new(),
        };
        for page in pages {
            list.name = page.name;
            list.tags.extend(page.tags.unwrap_or_default());
        }
        Ok(list)
    }

    async fn get_manifest(&self, name: &str, reference: &str) -> Result<ImageManifest> {
        let url = self.url(&format!("/v2/{}/manifests/{}", name, reference));
        debug!("GET {}", url);

        let request = self
            .client
            .get(&url)
            .header(header::ACCEPT, Self::manifest_accept());
        let response = self.send(request).await?;

        Ok(response.json().await?)
    }

    async fn get_digest(&self, name: &str, reference: &str) -> Result<OciDigest> {
        let url = self.url(&format!("/v2/{}/manifests/{}", name, reference));
        debug!("HEAD {}", url);

        let request = self
            .client
            .head(&url)
            .header(header::ACCEPT, Self::digest_accept());
        let response = self.send(request).await?;

        let digest = response
            .headers()
            .get(DOCKER_CONTENT_DIGEST)
            .ok_or_else(|| {
                RegistryError::InvalidResponse(format!(
                    "no {} header for {}:{}",
                    DOCKER_CONTENT_DIGEST, name, reference
                ))
            })?
            .to_str()
            .map_err(|e| RegistryError::InvalidResponse(e.to_string()))?;

        Ok(digest.parse()?)
    }

    async fn delete_image(&self, name: &str, reference: &str) -> Result<()> {
        let url = self.url(&format!("/v2/{}/manifests/{}", name, reference));
        debug!("DELETE {}", url);
        self.send(self.client.delete(&url)).await?;
        Ok(())
    }
}

/// Extract the `rel="next"` target from `Link` headers.
fn next_link(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .find_map(|link| {
            let (target, params) = link.split_once(';')?;
            let is_next = params.split(';').any(|param| {
                let param = param.trim().replace(' ', "");
                param == "rel=\"next\"" || param == "rel=next"
            });
            if !is_next {
                return None;
            }
            let target = target.trim().strip_prefix('<')?.strip_suffix('>')?;
            Some(target.to_string())
        })
}
