//! HTTP client for the query service: `/api/query` plus the index endpoints.

use std::path::Path;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use crate::messages::{DocumentList, ErrorDetail, QueryResponse, StatusMessage};

/// Client request error.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("server returned {status}: {}", .detail.as_deref().unwrap_or("no detail"))]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Client bound to one query service, e.g. `http://localhost:8000`.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    base: Url,
}

impl QueryClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let invalid = |reason: String| ClientError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let mut base =
            Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(invalid("not a hierarchical URL".into()));
        }
        // Endpoints are joined relative to the base, so keep any path prefix.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        self.base
            .join(path)
            .map_err(|e| ClientError::InvalidBaseUrl {
                url: self.base.to_string(),
                reason: e.to_string(),
            })
    }

    /// Full request URL for `text`, with `query_text` percent-encoded.
    pub fn query_url(&self, text: &str) -> Result<Url, ClientError> {
        let mut url = self.endpoint("api/query")?;
        url.query_pairs_mut().append_pair("query_text", text);
        Ok(url)
    }

    /// `GET /api/query?query_text=<text>`. One request, no retry, no timeout.
    pub async fn query(&self, text: &str) -> Result<QueryResponse, ClientError> {
        let url = self.query_url(text)?;
        tracing::debug!(%url, "sending query");
        let resp = self.http.get(url).send().await?;
        read_json(resp).await
    }

    /// `GET /api/documents`.
    pub async fn list_documents(&self) -> Result<DocumentList, ClientError> {
        let resp = self.http.get(self.endpoint("api/documents")?).send().await?;
        read_json(resp).await
    }

    /// `POST /api/reload`: ask the service to rebuild its index.
    pub async fn reload_index(&self) -> Result<StatusMessage, ClientError> {
        let resp = self.http.post(self.endpoint("api/reload")?).send().await?;
        read_json(resp).await
    }

    /// `POST /api/upload` with the file as multipart field `file`.
    pub async fn upload(&self, path: &Path) -> Result<StatusMessage, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".into());
        tracing::debug!(file = %file_name, size = bytes.len(), "uploading document");

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(self.endpoint("api/upload")?)
            .multipart(form)
            .send()
            .await?;
        read_json(resp).await
    }
}

async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorDetail>(&body)
            .map(|e| e.detail)
            .ok();
        return Err(ClientError::Status { status, detail });
    }
    Ok(serde_json::from_slice(&body)?)
}
