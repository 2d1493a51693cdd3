// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::{Result, SearchError};
use crate::models::query::{range_bounds, BoolQuery, QueryIntent};
use crate::models::search::{AggregationBucket, RawSearchResponse, ResultRecord};
use crate::services::backend::SearchBackend;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

/// Output of an executed intent: documents, or buckets for aggregations
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome {
    Hits(Vec<ResultRecord>),
    Buckets(Vec<AggregationBucket>),
}

/// Build the query description for an intent.
///
/// This mapping is the compatibility contract with the query DSL and must not
/// drift: keys and nesting are exactly what an Elasticsearch-compatible
/// `_search` endpoint expects.
pub fn build_query(intent: &QueryIntent) -> Value {
    let mut body = match intent {
        QueryIntent::MatchAll { size } => json!({
            "query": { "match_all": {} },
            "size": size
        }),
        QueryIntent::Term { field, value } => json!({
            "query": { "term": { field.as_str(): value } }
        }),
        QueryIntent::Match { field, text, .. } => json!({
            "query": { "match": { field.as_str(): text } }
        }),
        QueryIntent::Range {
            field, gte, lte, ..
        } => json!({
            "query": { "range": { field.as_str(): range_bounds(gte.as_ref(), lte.as_ref()) } }
        }),
        QueryIntent::Bool { query, .. } => json!({ "query": query.to_dsl() }),
        QueryIntent::MultiMatch { text, fields, .. } => json!({
            "query": { "multi_match": { "query": text, "fields": fields } }
        }),
        QueryIntent::Aggregation { field, name } => json!({
            "size": 0,
            "aggs": { name.as_str(): { "terms": { "field": field } } }
        }),
    };

    if let Some(fields) = intent.source_fields().filter(|f| !f.is_empty()) {
        body["_source"] = json!(fields);
    }

    body
}

/// Map raw hits into uniform records. Scores are kept only when asked for.
pub fn to_records(response: RawSearchResponse, include_score: bool) -> Vec<ResultRecord> {
    response
        .hits
        .hits
        .into_iter()
        .map(|hit| ResultRecord {
            id: hit.id,
            data: hit.source,
            score: if include_score { hit.score } else { None },
        })
        .collect()
}

/// Map the named terms aggregation into `{key, count}` pairs, keeping the
/// backend's order.
pub fn to_buckets(response: &RawSearchResponse, name: &str) -> Result<Vec<AggregationBucket>> {
    let buckets = response.buckets(name).ok_or_else(|| {
        SearchError::backend(
            "malformed aggregation response",
            format!("aggregation '{}' has no buckets", name),
        )
    })?;

    Ok(buckets
        .into_iter()
        .map(|bucket| AggregationBucket {
            key: match bucket.key {
                Value::String(s) => s,
                other => other.to_string(),
            },
            count: bucket.doc_count,
        })
        .collect())
}

/// Executes query intents against one index through an injected backend
pub struct QueryNormalizer<B> {
    backend: Arc<B>,
    index_name: String,
}

impl<B: SearchBackend> QueryNormalizer<B> {
    pub fn new(backend: Arc<B>, index_name: impl Into<String>) -> Self {
        Self {
            backend,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Build, submit and normalize one intent. Backend errors are returned as-is.
    pub async fn execute(&self, intent: &QueryIntent) -> Result<QueryOutcome> {
        if let QueryIntent::Aggregation { field, name } = intent {
            return self.aggregate(field, name).await.map(QueryOutcome::Buckets);
        }

        let response = self.submit(intent).await?;
        let total = response.total();
        let records = to_records(response, intent.is_scored());
        info!(
            kind = intent.kind(),
            total,
            returned = records.len(),
            "Query completed"
        );

        Ok(QueryOutcome::Hits(records))
    }

    async fn submit(&self, intent: &QueryIntent) -> Result<RawSearchResponse> {
        let query = build_query(intent);
        debug!(kind = intent.kind(), index = %self.index_name, %query, "Executing query");
        self.backend.search(&self.index_name, &query).await
    }

    /// Execute an intent that yields documents
    pub async fn search(&self, intent: &QueryIntent) -> Result<Vec<ResultRecord>> {
        match self.execute(intent).await? {
            QueryOutcome::Hits(records) => Ok(records),
            QueryOutcome::Buckets(_) => Err(SearchError::backend(
                "unexpected response shape",
                "aggregation intents return buckets; use aggregate()",
            )),
        }
    }

    /// All documents, up to `size`
    pub async fn match_all(&self, size: usize) -> Result<Vec<ResultRecord>> {
        self.search(&QueryIntent::match_all(size)).await
    }

    /// Exact equality on an unanalyzed field
    pub async fn term(&self, field: &str, value: impl Into<Value>) -> Result<Vec<ResultRecord>> {
        self.search(&QueryIntent::term(field, value)).await
    }

    /// Analyzed full-text match, scored by relevance
    pub async fn match_text(
        &self,
        field: &str,
        text: &str,
        source_fields: Option<Vec<String>>,
    ) -> Result<Vec<ResultRecord>> {
        let intent = QueryIntent::Match {
            field: field.to_string(),
            text: text.to_string(),
            source_fields,
        };
        self.search(&intent).await
    }

    /// Inclusive range, either bound optional
    pub async fn range(
        &self,
        field: &str,
        gte: Option<Value>,
        lte: Option<Value>,
        source_fields: Option<Vec<String>>,
    ) -> Result<Vec<ResultRecord>> {
        let intent = QueryIntent::Range {
            field: field.to_string(),
            gte,
            lte,
            source_fields,
        };
        self.search(&intent).await
    }

    pub async fn boolean(
        &self,
        query: BoolQuery,
        source_fields: Option<Vec<String>>,
    ) -> Result<Vec<ResultRecord>> {
        self.search(&QueryIntent::Bool {
            query,
            source_fields,
        })
        .await
    }

    /// Full-text match across several fields
    pub async fn multi_match(
        &self,
        text: &str,
        fields: Vec<String>,
        source_fields: Option<Vec<String>>,
    ) -> Result<Vec<ResultRecord>> {
        let intent = QueryIntent::MultiMatch {
            text: text.to_string(),
            fields,
            source_fields,
        };
        self.search(&intent).await
    }

    /// Terms aggregation over a keyword field
    pub async fn aggregate(&self, field: &str, name: &str) -> Result<Vec<AggregationBucket>> {
        let response = self.submit(&QueryIntent::aggregation(field, name)).await?;
        let buckets = to_buckets(&response, name)?;
        info!(field, categories = buckets.len(), "Aggregation completed");
        Ok(buckets)
    }
}
