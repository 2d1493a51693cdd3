// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::{ApiError, Result, SearchError};
use crate::models::search::{
    BulkItem, BulkItemError, BulkOutcome, ClusterHealth, IndexStats, RawSearchResponse,
    ServerInfo, WriteAck,
};
use crate::models::settings::{Credentials, Settings};
use crate::services::backend::SearchBackend;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use url::Url;

/// Base delay between retries, multiplied by the attempt number
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// HTTP client wrapper for an Elasticsearch-compatible search service.
///
/// The only way to obtain one is [`SearchClient::connect`], which pings the
/// server first, so a `SearchClient` is always usable. Dropping it releases
/// the underlying connection pool.
pub struct SearchClient {
    transport: Transport,
    server: ServerInfo,
}

impl SearchClient {
    /// Build the HTTP client and verify the server answers with the given
    /// credentials
    pub async fn connect(settings: &Settings) -> Result<Self> {
        info!(
            endpoint = %settings.endpoint,
            auth = %settings.credentials,
            "Connecting to search service"
        );

        let http = reqwest::Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| SearchError::connection(settings.endpoint.as_str(), e))?;

        let transport = Transport {
            http,
            endpoint: settings.endpoint.clone(),
            credentials: settings.credentials.clone(),
            max_retries: settings.max_retries,
        };

        let server = transport.server_info().await.inspect_err(|e| match e {
            SearchError::Authentication { .. } => warn!("Check ELASTIC_API_KEY or ELASTIC_PASSWORD"),
            SearchError::Connection { .. } => warn!("Check ELASTIC_URL and network access"),
            _ => {}
        })?;

        info!(
            version = %server.version,
            cluster = %server.cluster_name,
            "Connected to search service"
        );

        Ok(Self { transport, server })
    }

    /// Identity of the server reported at connect time
    pub fn server_info(&self) -> &ServerInfo {
        &self.server
    }

    /// Release the client explicitly
    pub fn close(self) {
        info!(endpoint = %self.transport.endpoint, "Connection closed");
    }
}

impl SearchBackend for SearchClient {
    async fn search(&self, index: &str, query: &Value) -> Result<RawSearchResponse> {
        let url = self.transport.url(&[index, "_search"])?;
        let request = self.transport.request(Method::POST, url).json(query);
        self.transport.call_json(request, "search failed").await
    }

    async fn bulk_write(&self, index: &str, items: Vec<BulkItem>) -> Result<BulkOutcome> {
        let url = self.transport.url(&[index, "_bulk"])?;
        let body = bulk_body(&items)?;
        let request = self
            .transport
            .request(Method::POST, url)
            .header(CONTENT_TYPE, "application/x-ndjson")
            .body(body);

        let response: Value = self
            .transport
            .call_json(request, "bulk write failed")
            .await?;
        parse_bulk_response(&response, items.len())
    }

    async fn write(&self, index: &str, id: Option<&str>, document: &Value) -> Result<WriteAck> {
        let request = match id {
            Some(id) => {
                let url = self.transport.url(&[index, "_doc", id])?;
                self.transport.request(Method::PUT, url)
            }
            None => {
                let url = self.transport.url(&[index, "_doc"])?;
                self.transport.request(Method::POST, url)
            }
        };
        self.transport
            .call_json(request.json(document), "failed to index document")
            .await
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Map<String, Value>>> {
        let url = self.transport.url(&[index, "_doc", id])?;
        let context = format!("failed to get document {}", id);
        let request = self.transport.request(Method::GET, url);

        let Some(response) = self.transport.call_allow_missing(request, &context).await? else {
            return Ok(None);
        };

        #[derive(Deserialize)]
        struct GetResponse {
            #[serde(rename = "_source", default)]
            source: Map<String, Value>,
        }

        let found: GetResponse = Transport::decode(response, &context).await?;
        Ok(Some(found.source))
    }

    async fn delete(&self, index: &str, id: &str) -> Result<bool> {
        let url = self.transport.url(&[index, "_doc", id])?;
        let context = format!("failed to delete document {}", id);
        let request = self.transport.request(Method::DELETE, url);

        Ok(self
            .transport
            .call_allow_missing(request, &context)
            .await?
            .is_some())
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        let url = self.transport.url(&[index])?;
        let request = self.transport.request(Method::HEAD, url);
        let context = "failed to check index existence";

        let response = self.transport.send(request, context).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            _ => Transport::check(response, context).await.map(|_| true),
        }
    }

    async fn create_index(&self, index: &str, definition: &Value) -> Result<()> {
        let url = self.transport.url(&[index])?;
        let request = self.transport.request(Method::PUT, url).json(definition);
        self.transport
            .call(request, "failed to create index")
            .await
            .map(drop)
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        let url = self.transport.url(&[index])?;
        let request = self.transport.request(Method::DELETE, url);
        self.transport
            .call(request, "failed to delete index")
            .await
            .map(drop)
    }

    async fn count(&self, index: &str) -> Result<u64> {
        #[derive(Deserialize)]
        struct CountResponse {
            count: u64,
        }

        let url = self.transport.url(&[index, "_count"])?;
        let request = self.transport.request(Method::GET, url);
        let response: CountResponse = self
            .transport
            .call_json(request, "failed to count documents")
            .await?;
        Ok(response.count)
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        let url = self.transport.url(&[index, "_refresh"])?;
        let request = self.transport.request(Method::POST, url);
        self.transport
            .call(request, "failed to refresh index")
            .await
            .map(drop)
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        let url = self.transport.url(&[index, "_stats"])?;
        let request = self.transport.request(Method::GET, url);

        match self
            .transport
            .call_json::<Value>(request, "failed to read index stats")
            .await
        {
            Ok(stats) => parse_index_stats(&stats).ok_or_else(|| {
                SearchError::backend("failed to read index stats", "unexpected stats layout")
            }),
            Err(e) if e.api_error().is_some_and(ApiError::is_api_unavailable) => {
                info!("Index stats not available on this deployment, falling back to count");
                Ok(IndexStats {
                    doc_count: self.count(index).await?,
                    size_bytes: None,
                })
            }
            Err(e) => Err(e),
        }
    }

    async fn health(&self) -> Result<ClusterHealth> {
        #[derive(Deserialize)]
        struct HealthResponse {
            status: String,
            number_of_nodes: Option<u64>,
            active_primary_shards: Option<u64>,
        }

        let url = self.transport.url(&["_cluster", "health"])?;
        let request = self.transport.request(Method::GET, url);

        match self
            .transport
            .call_json::<HealthResponse>(request, "failed to check cluster health")
            .await
        {
            Ok(health) => {
                info!(
                    status = %health.status,
                    nodes = health.number_of_nodes,
                    primary_shards = health.active_primary_shards,
                    "Cluster health"
                );
                Ok(ClusterHealth {
                    status: health.status,
                    number_of_nodes: health.number_of_nodes,
                    active_primary_shards: health.active_primary_shards,
                    cluster_uuid: self.server.cluster_uuid.clone(),
                })
            }
            // Only the explicit "API not available" answer means serverless
            Err(e) if e.api_error().is_some_and(ApiError::is_api_unavailable) => {
                info!("Cluster health not available, using server info (serverless)");
                let server = self.transport.server_info().await?;
                Ok(ClusterHealth {
                    status: "serverless".to_string(),
                    number_of_nodes: None,
                    active_primary_shards: None,
                    cluster_uuid: server.cluster_uuid,
                })
            }
            Err(e) => Err(e),
        }
    }
}

/// Request plumbing shared by every backend call
struct Transport {
    http: reqwest::Client,
    endpoint: Url,
    credentials: Credentials,
    max_retries: u32,
}

impl Transport {
    /// Endpoint URL with percent-encoded path segments appended
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| {
                SearchError::Configuration(vec![format!(
                    "endpoint cannot be used as a base URL: {}",
                    self.endpoint
                )])
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.http.request(method, url);
        match &self.credentials {
            Credentials::ApiKey(key) => builder.header(AUTHORIZATION, format!("ApiKey {}", key)),
            Credentials::Basic { username, password } => builder.basic_auth(username, Some(password)),
        }
    }

    /// Send with bounded retries on timeouts, connection failures and
    /// gateway errors. Any status code is returned to the caller.
    async fn send(&self, request: RequestBuilder, context: &str) -> Result<Response> {
        let mut attempt: u32 = 0;
        loop {
            let pending = request
                .try_clone()
                .ok_or_else(|| SearchError::backend(context, "request body cannot be replayed"))?;

            let outcome = pending.send().await;
            let retryable = match &outcome {
                Ok(response) => is_retryable_status(response.status()),
                Err(e) => e.is_timeout() || e.is_connect(),
            };

            if retryable && attempt < self.max_retries {
                attempt += 1;
                warn!(context, attempt, max_retries = self.max_retries, "Retrying request");
                sleep(RETRY_BACKOFF * attempt).await;
                continue;
            }

            return outcome.map_err(|e| {
                if e.is_timeout() || e.is_connect() {
                    SearchError::connection(self.endpoint.as_str(), e)
                } else {
                    SearchError::backend(context.to_string(), e)
                }
            });
        }
    }

    /// Turn a non-2xx response into an error
    async fn check(response: Response, context: &str) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = ApiError::from_body(status.as_u16(), &body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SearchError::Authentication {
                reason: api_error.reason,
            });
        }
        Err(SearchError::backend(context.to_string(), api_error))
    }

    async fn decode<T: DeserializeOwned>(response: Response, context: &str) -> Result<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| SearchError::backend(context.to_string(), e))
    }

    async fn call(&self, request: RequestBuilder, context: &str) -> Result<Response> {
        let response = self.send(request, context).await?;
        Self::check(response, context).await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<T> {
        let response = self.call(request, context).await?;
        Self::decode(response, context).await
    }

    /// Like [`Transport::call`], but a 404 for a missing document yields
    /// None. A 404 carrying an error type (e.g. a missing index) is still an
    /// error.
    async fn call_allow_missing(
        &self,
        request: RequestBuilder,
        context: &str,
    ) -> Result<Option<Response>> {
        let response = self.send(request, context).await?;
        if response.status() != StatusCode::NOT_FOUND {
            return Self::check(response, context).await.map(Some);
        }

        let body = response.text().await.unwrap_or_default();
        let api_error = ApiError::from_body(StatusCode::NOT_FOUND.as_u16(), &body);
        match api_error.error_type {
            Some(_) => Err(SearchError::backend(context.to_string(), api_error)),
            None => {
                debug!(context, "Document not found");
                Ok(None)
            }
        }
    }

    async fn server_info(&self) -> Result<ServerInfo> {
        #[derive(Deserialize)]
        struct Version {
            number: String,
        }

        #[derive(Deserialize)]
        struct InfoResponse {
            cluster_name: String,
            cluster_uuid: Option<String>,
            version: Version,
        }

        let url = self.url(&[])?;
        let request = self.request(Method::GET, url);
        let info: InfoResponse = self.call_json(request, "failed to read server info").await?;

        Ok(ServerInfo {
            cluster_name: info.cluster_name,
            cluster_uuid: info.cluster_uuid,
            version: info.version.number,
        })
    }
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Newline-delimited bulk body: one action line and one source line per item
pub fn bulk_body(items: &[BulkItem]) -> Result<String> {
    let mut body = String::new();
    for item in items {
        let action = json!({ "index": { "_id": item.id } });
        for line in [&action, &item.document] {
            let encoded = serde_json::to_string(line)
                .map_err(|e| SearchError::backend("failed to encode bulk body", e))?;
            body.push_str(&encoded);
            body.push('\n');
        }
    }
    Ok(body)
}

/// Count 2xx items as successes and collect every other item as an error.
///
/// The response must report exactly one item per submitted document.
pub fn parse_bulk_response(response: &Value, submitted: usize) -> Result<BulkOutcome> {
    let items = response
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            SearchError::backend("malformed bulk response", "response has no items array")
        })?;
    if items.len() != submitted {
        return Err(SearchError::backend(
            "malformed bulk response",
            format!("{} items reported for {} submitted", items.len(), submitted),
        ));
    }

    let mut outcome = BulkOutcome::default();

    for entry in items {
        // Each entry is keyed by its action: {"index": {...}}
        let Some(result) = entry.as_object().and_then(|o| o.values().next()) else {
            continue;
        };

        let status = result.get("status").and_then(Value::as_u64).unwrap_or(0) as u16;
        let error = result.get("error");

        if (200..300).contains(&status) && error.is_none() {
            outcome.success_count += 1;
            continue;
        }

        outcome.errors.push(BulkItemError {
            id: result
                .get("_id")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status,
            error_type: error
                .and_then(|e| e.get("type"))
                .and_then(Value::as_str)
                .map(str::to_string),
            reason: error
                .and_then(|e| e.get("reason"))
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| format!("item failed with status {}", status)),
        });
    }

    Ok(outcome)
}

/// Primary document count and store size from an `_stats` response
pub fn parse_index_stats(stats: &Value) -> Option<IndexStats> {
    let primaries = stats.get("_all")?.get("primaries")?;
    Some(IndexStats {
        doc_count: primaries.get("docs")?.get("count")?.as_u64()?,
        size_bytes: primaries
            .get("store")
            .and_then(|s| s.get("size_in_bytes"))
            .and_then(Value::as_u64),
    })
}
