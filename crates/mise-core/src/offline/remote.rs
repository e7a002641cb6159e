use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use log::debug;
use serde_json::Value;

use crate::offline::error::OfflineSyncError;
use crate::offline::types::{OfflineData, Operation};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HttpMethod::Post => f.write_str("POST"),
            HttpMethod::Put => f.write_str("PUT"),
            HttpMethod::Delete => f.write_str("DELETE"),
        }
    }
}

/// One REST call replaying a queued mutation
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub method: HttpMethod,
    /// Unencoded path segments below the API base URL, e.g. `["api", "orders", "42"]`
    pub segments: Vec<String>,
    pub body: Option<Value>,
}

impl MutationRequest {
    /// create -> `POST /api/{collection}`, update -> `PUT /api/{collection}/{id}`,
    /// delete -> `DELETE /api/{collection}/{id}`
    pub fn for_entry(entry: &OfflineData) -> Result<Self, OfflineSyncError> {
        let collection = entry.collection()?;
        let payload_id = || {
            entry.payload_id().ok_or_else(|| OfflineSyncError::MissingPayloadId {
                entry_id: entry.id.clone(),
                operation: entry.operation.to_string(),
            })
        };
        let mut segments = vec!["api".to_string(), collection.to_string()];
        let (method, body) = match entry.operation {
            Operation::Create => (HttpMethod::Post, Some(entry.data.clone())),
            Operation::Update => {
                segments.push(payload_id()?);
                (HttpMethod::Put, Some(entry.data.clone()))
            }
            Operation::Delete => {
                segments.push(payload_id()?);
                (HttpMethod::Delete, None)
            }
        };
        Ok(Self { method, segments, body })
    }

    /// Human-readable path, e.g. `/api/orders/42`
    pub fn path(&self) -> String {
        format!("/{}", self.segments.join("/"))
    }

    /// Append the segments to `base_url`, percent-encoding each one so an id
    /// can never add segments, a query or a fragment.
    pub fn url(&self, base_url: &str) -> Result<Url, OfflineSyncError> {
        let invalid = |reason: String| OfflineSyncError::InvalidBaseUrl {
            base_url: base_url.to_string(),
            reason,
        };
        let mut url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| invalid("cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(&self.segments);
        Ok(url)
    }
}

impl fmt::Display for MutationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path())
    }
}

/// The remote REST API mutations are replayed against
#[async_trait]
pub trait RemoteApi: Send + Sync + fmt::Debug {
    /// Issue the request once; any non-2xx status is a failure
    async fn send(&self, request: &MutationRequest) -> Result<(), OfflineSyncError>;
}

#[derive(Debug, Clone)]
pub struct HttpRemoteApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRemoteApi {
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    /// HTTP client with the given per-request timeout
    pub fn client(timeout: Duration) -> Result<reqwest::Client, OfflineSyncError> {
        reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(OfflineSyncError::ClientBuild)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteApi for HttpRemoteApi {
    async fn send(&self, request: &MutationRequest) -> Result<(), OfflineSyncError> {
        let url = request.url(&self.base_url)?;
        debug!("Replaying {} against {}", request, url);

        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        let response = builder.send().await.map_err(|source| OfflineSyncError::Transport {
            request: request.to_string(),
            source,
        })?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(OfflineSyncError::Status {
                request: request.to_string(),
                status: status.as_u16(),
            })
        }
    }
}
