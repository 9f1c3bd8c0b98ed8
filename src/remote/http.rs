//! HTTP implementation of the object store contract.
//!
//! Talks to the store's REST surface: `GET /files` for listings,
//! `PUT`/`DELETE /files?path=` for single objects, `POST /files/move` and
//! `/files/copy` for key rewrites, `GET /files/content?path=` for downloads.
//! Mutating requests carry a bearer token from the shared credential store.

use crate::auth::CredentialStore;
use crate::error::ExplorerError;
use crate::index::path;
use crate::remote::ObjectStore;
use crate::types::ObjectEntry;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct ListResponse {
    #[serde(default)]
    files: Vec<ObjectEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutResponse {
    entity_tag: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RekeyRequest<'a> {
    path: &'a str,
    new_path: &'a str,
}

/// reqwest-backed [`ObjectStore`].
pub struct HttpObjectStore {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<CredentialStore>,
}

impl HttpObjectStore {
    /// Build a client for `endpoint` (e.g. `https://store.example.com/api`).
    pub fn new(
        endpoint: &str,
        credentials: Arc<CredentialStore>,
        timeout: Duration,
    ) -> Result<Self, ExplorerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExplorerError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    fn files_url(&self) -> String {
        format!("{}/files", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ExplorerError> {
        let token = self.credentials.require_token()?;
        Ok(request.bearer_auth(token))
    }

    async fn list(&self, query_path: Option<&str>) -> Result<Vec<ObjectEntry>, ExplorerError> {
        let mut request = self.client.get(self.files_url());
        if let Some(p) = query_path {
            request = request.query(&[("path", p)]);
        }
        let response = request.send().await?;
        let response = check_status(response, query_path.unwrap_or("/")).await?;
        let body: ListResponse = response.json().await?;
        debug!(
            path = query_path.unwrap_or("/"),
            count = body.files.len(),
            "Fetched listing"
        );
        // The store hands back whatever key shape it holds; normalize before
        // the entries reach the index.
        Ok(body
            .files
            .into_iter()
            .map(|mut entry| {
                entry.path = path::normalize(&entry.path);
                entry
            })
            .filter(|entry| !entry.path.is_empty())
            .collect())
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn fetch_all_entries(&self) -> Result<Vec<ObjectEntry>, ExplorerError> {
        self.list(None).await
    }

    async fn fetch_directory(&self, path: &str) -> Result<Vec<ObjectEntry>, ExplorerError> {
        self.list(Some(path)).await
    }

    async fn fetch_object(&self, path: &str) -> Result<Vec<u8>, ExplorerError> {
        let response = self
            .client
            .get(format!("{}/content", self.files_url()))
            .query(&[("path", path)])
            .send()
            .await?;
        let response = check_status(response, path).await?;

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(bytes)
    }

    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, ExplorerError> {
        let request = self
            .client
            .put(self.files_url())
            .query(&[("path", path)])
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes);
        let response = self.authorized(request)?.send().await?;
        let response = check_status(response, path).await?;
        let body: PutResponse = response.json().await?;
        debug!(path, etag = %body.entity_tag, "Stored object");
        Ok(body.entity_tag)
    }

    async fn delete_object(&self, path: &str) -> Result<(), ExplorerError> {
        let request = self
            .client
            .delete(self.files_url())
            .query(&[("path", path)]);
        let response = self.authorized(request)?.send().await?;
        check_status(response, path).await?;
        debug!(path, "Deleted object");
        Ok(())
    }

    async fn move_object(&self, path: &str, new_path: &str) -> Result<(), ExplorerError> {
        self.rekey("move", path, new_path).await
    }

    async fn copy_object(&self, path: &str, new_path: &str) -> Result<(), ExplorerError> {
        self.rekey("copy", path, new_path).await
    }
}

impl HttpObjectStore {
    async fn rekey(&self, verb: &str, path: &str, new_path: &str) -> Result<(), ExplorerError> {
        let request = self
            .client
            .post(format!("{}/{}", self.files_url(), verb))
            .json(&RekeyRequest { path, new_path });
        let response = self.authorized(request)?.send().await?;
        check_status(response, path).await?;
        debug!(path, new_path, verb, "Rekeyed object");
        Ok(())
    }
}

/// Map a non-success response onto the error taxonomy.
async fn check_status(
    response: reqwest::Response,
    context: &str,
) -> Result<reqwest::Response, ExplorerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(classify_status(status, context, &body))
}

fn classify_status(status: StatusCode, context: &str, body: &str) -> ExplorerError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            ExplorerError::Auth(format!("store rejected credential for '{}'", context))
        }
        StatusCode::NOT_FOUND => ExplorerError::NotFound(context.to_string()),
        _ => ExplorerError::Transport(format!(
            "store returned {} for '{}': {}",
            status,
            context,
            body.chars().take(200).collect::<String>()
        )),
    }
}
