use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use ociclient::{Client, ClientOption, Registry, RegistryError};

const DIGEST: &str = "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
const LIST_DIGEST: &str =
    "sha256:5b0bcabd1ed22e9fb1310cf6c2dec7cdef19f0ad69efa1f392e94a4333501270";
const AMD64_DIGEST: &str =
    "sha256:ca5534a51dd04bbcebe9b23ba05f389466cf0c190f1f8f182d7eea92a9671d00";
const DOCKER_MANIFEST_LIST: &str = "application/vnd.docker.distribution.manifest.list.v2+json";
const AUTH: &str = "Basic dXNlcjpwYXNz";

#[derive(Default)]
struct StubRegistry {
    required_auth: Option<String>,
    deleted: Mutex<Vec<String>>,
}

type StubState = Arc<StubRegistry>;

fn registry_error(status: StatusCode, code: &str, message: &str) -> Response {
    let body = json!({ "errors": [{ "code": code, "message": message, "detail": null }] });
    (status, axum::Json(body)).into_response()
}

fn authorized(state: &StubRegistry, headers: &HeaderMap) -> bool {
    match &state.required_auth {
        Some(expected) => headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v == expected),
        None => true,
    }
}

async fn api_version_check(State(state): State<StubState>, headers: HeaderMap) -> Response {
    if !authorized(&state, &headers) {
        return registry_error(StatusCode::UNAUTHORIZED, "UNAUTHORIZED", "authentication required");
    }
    axum::Json(json!({})).into_response()
}

async fn list_repositories(Query(params): Query<HashMap<String, String>>) -> Response {
    match params.get("last").map(String::as_str) {
        None => (
            [(header::LINK, r#"</v2/_catalog?last=busybox&n=2>; rel="next""#)],
            axum::Json(json!({ "repositories": ["nginx", "busybox"] })),
        )
            .into_response(),
        Some("busybox") => axum::Json(json!({ "repositories": ["alpine"] })).into_response(),
        Some(_) => axum::Json(json!({ "repositories": [] })).into_response(),
    }
}

async fn list_tags(Path(name): Path<String>) -> Response {
    match name.as_str() {
        "alpine" => axum::Json(json!({ "name": "alpine", "tags": ["latest", "3.19"] })).into_response(),
        "empty" => axum::Json(json!({ "name": "empty", "tags": null })).into_response(),
        _ => registry_error(StatusCode::NOT_FOUND, "NAME_UNKNOWN", "repository name not known to registry"),
    }
}

async fn get_manifest(Path((_name, reference)): Path<(String, String)>) -> Response {
    if reference == "missing" {
        return registry_error(StatusCode::NOT_FOUND, "MANIFEST_UNKNOWN", "manifest unknown");
    }
    let manifest = json!({
        "schemaVersion": 2,
        "mediaType": "application/vnd.docker.distribution.manifest.v2+json",
        "config": { "mediaType": "application/vnd.docker.container.image.v1+json", "size": 7, "digest": DIGEST },
        "layers": [
            { "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip", "size": 10, "digest": DIGEST },
            { "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip", "size": 20, "digest": DIGEST },
            { "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip", "size": 5, "digest": DIGEST }
        ]
    });
    axum::Json(manifest).into_response()
}

async fn head_manifest(
    headers: HeaderMap,
    Path((name, reference)): Path<(String, String)>,
) -> Response {
    if name == "multiarch" {
        // Registries fall back to the amd64 child unless a list is acceptable
        let accepts_list = headers
            .get_all(header::ACCEPT)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.contains(DOCKER_MANIFEST_LIST));
        let digest = if accepts_list { LIST_DIGEST } else { AMD64_DIGEST };
        return (StatusCode::OK, [("Docker-Content-Digest", digest)]).into_response();
    }
    if reference == "missing" {
        return StatusCode::NOT_FOUND.into_response();
    }
    if reference == "nodigest" {
        return StatusCode::OK.into_response();
    }
    (StatusCode::OK, [("Docker-Content-Digest", DIGEST)]).into_response()
}

async fn delete_manifest(
    State(state): State<StubState>,
    Path((name, reference)): Path<(String, String)>,
) -> Response {
    if !reference.starts_with("sha256:") {
        return registry_error(StatusCode::BAD_REQUEST, "DIGEST_INVALID", "provided digest did not match");
    }
    state.deleted.lock().unwrap().push(format!("{}@{}", name, reference));
    StatusCode::ACCEPTED.into_response()
}

// Helper function to start a stub registry for testing
async fn start_test_server(state: StubState) -> (JoinHandle<()>, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let app = Router::new()
        .route("/v2/", get(api_version_check))
        .route("/v2/_catalog", get(list_repositories))
        .route("/v2/{name}/tags/list", get(list_tags))
        .route(
            "/v2/{name}/manifests/{reference}",
            get(get_manifest).head(head_manifest).delete(delete_manifest),
        )
        .with_state(state);

    let server = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (server, format!("http://127.0.0.1:{}", port))
}

#[tokio::test]
async fn test_api_version_check() {
    let (server, url) = start_test_server(StubState::default()).await;

    let client = Client::new(&url, Vec::new()).unwrap();
    client.check_api().await.unwrap();

    server.abort();
}

#[tokio::test]
async fn test_api_version_check_requires_credentials() {
    let state = Arc::new(StubRegistry {
        required_auth: Some(AUTH.to_string()),
        ..Default::default()
    });
    let (server, url) = start_test_server(state).await;

    let anonymous = Client::new(&url, Vec::new()).unwrap();
    let err = anonymous.check_api().await.unwrap_err();
    assert!(err.is_auth_failure(), "unexpected error: {err}");

    let authenticated =
        Client::new(&url, vec![ClientOption::header("Authorization", AUTH)]).unwrap();
    authenticated.check_api().await.unwrap();

    server.abort();
}

#[tokio::test]
async fn test_list_repositories_follows_pagination() {
    let (server, url) = start_test_server(StubState::default()).await;

    let client = Client::new(&url, Vec::new()).unwrap();
    let repositories = client.list_repositories().await.unwrap();
    assert_eq!(repositories, vec!["nginx", "busybox", "alpine"]);

    server.abort();
}

#[tokio::test]
async fn test_list_tags() {
    let (server, url) = start_test_server(StubState::default()).await;
    let client = Client::new(&url, Vec::new()).unwrap();

    let list = client.list_tags("alpine").await.unwrap();
    assert_eq!(list.name, "alpine");
    assert_eq!(list.tags, vec!["latest", "3.19"]);

    let empty = client.list_tags("empty").await.unwrap();
    assert!(empty.tags.is_empty());

    let err = client.list_tags("unknown").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)), "unexpected error: {err}");
    assert!(err.to_string().contains("NAME_UNKNOWN"));

    server.abort();
}

#[tokio::test]
async fn test_get_manifest() {
    let (server, url) = start_test_server(StubState::default()).await;
    let client = Client::new(&url, Vec::new()).unwrap();

    let manifest = client.get_manifest("alpine", "latest").await.unwrap();
    assert_eq!(manifest.layers.len(), 3);
    assert_eq!(manifest.total_size(), 35);

    let err = client.get_manifest("alpine", "missing").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));

    server.abort();
}

#[tokio::test]
async fn test_get_digest() {
    let (server, url) = start_test_server(StubState::default()).await;
    let client = Client::new(&url, Vec::new()).unwrap();

    let digest = client.get_digest("alpine", "latest").await.unwrap();
    assert_eq!(digest.to_string(), DIGEST);

    let err = client.get_digest("alpine", "missing").await.unwrap_err();
    assert!(matches!(err, RegistryError::NotFound(_)));

    let err = client.get_digest("alpine", "nodigest").await.unwrap_err();
    assert!(matches!(err, RegistryError::InvalidResponse(_)));

    server.abort();
}

#[tokio::test]
async fn test_delete_image() {
    let state = StubState::default();
    let (server, url) = start_test_server(Arc::clone(&state)).await;
    let client = Client::new(&url, Vec::new()).unwrap();

    client.delete_image("alpine", DIGEST).await.unwrap();
    assert_eq!(
        *state.deleted.lock().unwrap(),
        vec![format!("alpine@{}", DIGEST)]
    );

    let err = client.delete_image("alpine", "latest").await.unwrap_err();
    assert!(matches!(
        err,
        RegistryError::UnexpectedStatus { status, .. } if status.as_u16() == 400
    ));

    server.abort();
}

#[tokio::test]
async fn test_delete_multiarch_image_removes_list() {
    let state = StubState::default();
    let (server, url) = start_test_server(Arc::clone(&state)).await;
    let client = Client::new(&url, Vec::new()).unwrap();

    let digest = client.get_digest("multiarch", "latest").await.unwrap();
    assert_eq!(digest.to_string(), LIST_DIGEST);

    client.delete_image("multiarch", &digest.to_string()).await.unwrap();
    assert_eq!(
        *state.deleted.lock().unwrap(),
        vec![format!("multiarch@{}", LIST_DIGEST)]
    );

    server.abort();
}
