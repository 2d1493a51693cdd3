// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A tale to be indexed for full-text search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Who wrote it (exact-match keyword)
    pub author: String,
    /// Category such as `terror` or `infantil` (exact-match keyword)
    pub document_type: String,
    /// Free text, analyzed for relevance search
    pub text: String,
    /// Publication date as `YYYY-MM-DD`
    pub date: String,
}

impl Document {
    pub fn new(
        author: impl Into<String>,
        document_type: impl Into<String>,
        text: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            author: author.into(),
            document_type: document_type.into(),
            text: text.into(),
            date: date.into(),
        }
    }
}

/// Uniform shape of a single search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Backend document id
    pub id: String,
    /// Stored fields, possibly restricted by `_source` filtering
    pub data: Map<String, Value>,
    /// Relevance score, only for relevance-ranked queries
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl ResultRecord {
    /// Read the hit back as a full [`Document`]. Returns `None` when fields
    /// were filtered out or the stored record does not match the schema.
    pub fn document(&self) -> Option<Document> {
        serde_json::from_value(Value::Object(self.data.clone())).ok()
    }

    /// String value of a stored field
    pub fn field(&self, name: &str) -> Option<&str> {
        self.data.get(name).and_then(Value::as_str)
    }
}

/// One group of a terms aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationBucket {
    pub key: String,
    pub count: u64,
}

/// Raw `_search` response as returned by the backend
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSearchResponse {
    #[serde(default)]
    pub hits: RawHits,
    /// Aggregation results keyed by aggregation name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregations: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawHits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<RawTotal>,
    #[serde(default)]
    pub hits: Vec<RawHit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTotal {
    pub value: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawHit {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBucket {
    pub key: Value,
    pub doc_count: u64,
}

impl RawSearchResponse {
    /// Total hit count reported by the backend, or the page length if absent
    pub fn total(&self) -> u64 {
        self.hits
            .total
            .as_ref()
            .map(|t| t.value)
            .unwrap_or(self.hits.hits.len() as u64)
    }

    /// Buckets of the named terms aggregation, in backend order
    pub fn buckets(&self, name: &str) -> Option<Vec<RawBucket>> {
        let buckets = self.aggregations.as_ref()?.get(name)?.get("buckets")?;
        serde_json::from_value(buckets.clone()).ok()
    }
}

/// One document of a bulk write
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkItem {
    pub id: String,
    pub document: Value,
}

/// Failure of one item inside a bulk write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkItemError {
    pub id: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    pub reason: String,
}

/// Result of a bulk write: successes are counted, failures are listed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub success_count: usize,
    pub errors: Vec<BulkItemError>,
}

/// Acknowledgment of a single-document write
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteAck {
    #[serde(rename = "_index")]
    pub index: String,
    #[serde(rename = "_id")]
    pub id: String,
    /// `created` or `updated`
    pub result: String,
    #[serde(rename = "_version", default)]
    pub version: u64,
}

/// Document count and on-disk size of an index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub doc_count: u64,
    /// Unknown when the deployment does not expose index statistics
    pub size_bytes: Option<u64>,
}

/// Cluster health as reported by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterHealth {
    /// `green`, `yellow`, `red`, or `serverless` when health is not exposed
    pub status: String,
    pub number_of_nodes: Option<u64>,
    pub active_primary_shards: Option<u64>,
    pub cluster_uuid: Option<String>,
}

impl ClusterHealth {
    pub fn is_serverless(&self) -> bool {
        self.status == "serverless"
    }
}

/// Identity of the connected server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    pub cluster_name: String,
    pub cluster_uuid: Option<String>,
    pub version: String,
}
