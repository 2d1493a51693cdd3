// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! In-memory stand-in for the search service.
//!
//! Evaluates the subset of the query DSL the crate produces (match_all, term,
//! match, range, bool, multi_match, terms aggregations and `_source`
//! filtering) so query semantics can be checked without a running server.

#![allow(dead_code)]

use cuentos_search::error::{ApiError, Result, SearchError};
use cuentos_search::models::sample::sample_documents;
use cuentos_search::models::search::{
    BulkItem, BulkItemError, BulkOutcome, ClusterHealth, IndexStats, RawSearchResponse, WriteAck,
};
use cuentos_search::services::backend::SearchBackend;
use cuentos_search::services::indexer::DocumentIndexer;
use serde_json::{json, Map, Value};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const TEST_INDEX: &str = "cuentos_test";

/// A fake holding the ten sample tales under ids "1".."10"
pub async fn seeded_backend() -> Arc<FakeBackend> {
    let backend = Arc::new(FakeBackend::new());
    let outcome = DocumentIndexer::new(backend.clone(), TEST_INDEX)
        .index_bulk(&sample_documents())
        .await
        .expect("sample tales index cleanly");
    assert_eq!(outcome.success_count, 10);
    backend
}

#[derive(Default)]
struct Index {
    definition: Value,
    docs: Vec<(String, Map<String, Value>)>,
    next_auto_id: usize,
}

#[derive(Default)]
pub struct FakeBackend {
    indexes: Mutex<HashMap<String, Index>>,
    rejected_ids: Mutex<HashSet<String>>,
    failure: Mutex<Option<ApiError>>,
    searches: Mutex<Vec<Value>>,
    bulk_batches: Mutex<Vec<Vec<String>>>,
    writes: Mutex<usize>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk items with this id fail with a mapping error
    pub fn reject_id(&self, id: &str) {
        self.rejected_ids.lock().unwrap().insert(id.to_string());
    }

    /// Every subsequent search fails with this error
    pub fn fail_searches_with(&self, error: ApiError) {
        *self.failure.lock().unwrap() = Some(error);
    }

    /// Query bodies received by `search`, in order
    pub fn searches(&self) -> Vec<Value> {
        self.searches.lock().unwrap().clone()
    }

    /// Ids of each bulk batch received, in order
    pub fn bulk_batches(&self) -> Vec<Vec<String>> {
        self.bulk_batches.lock().unwrap().clone()
    }

    pub fn single_writes(&self) -> usize {
        *self.writes.lock().unwrap()
    }

    pub fn definition(&self, index: &str) -> Option<Value> {
        self.indexes
            .lock()
            .unwrap()
            .get(index)
            .map(|i| i.definition.clone())
    }

    fn missing_index(index: &str) -> SearchError {
        SearchError::backend(
            "index not found",
            ApiError {
                status: 404,
                error_type: Some("index_not_found_exception".to_string()),
                reason: format!("no such index [{}]", index),
            },
        )
    }

    fn with_index<T>(&self, index: &str, f: impl FnOnce(&mut Index) -> T) -> Result<T> {
        let mut indexes = self.indexes.lock().unwrap();
        let index_data = indexes
            .get_mut(index)
            .ok_or_else(|| Self::missing_index(index))?;
        Ok(f(index_data))
    }
}

impl SearchBackend for FakeBackend {
    async fn search(&self, index: &str, query: &Value) -> Result<RawSearchResponse> {
        self.searches.lock().unwrap().push(query.clone());
        if let Some(error) = self.failure.lock().unwrap().clone() {
            return Err(SearchError::backend("search failed", error));
        }

        let docs = self.with_index(index, |i| i.docs.clone())?;
        let response = match query.get("aggs") {
            Some(aggs) => aggregate(&docs, aggs),
            None => run_query(&docs, query),
        };
        Ok(serde_json::from_value(response).expect("fake response is well-formed"))
    }

    async fn bulk_write(&self, index: &str, items: Vec<BulkItem>) -> Result<BulkOutcome> {
        self.bulk_batches
            .lock()
            .unwrap()
            .push(items.iter().map(|i| i.id.clone()).collect());

        let rejected = self.rejected_ids.lock().unwrap().clone();
        let mut indexes = self.indexes.lock().unwrap();
        let target = indexes.entry(index.to_string()).or_default();
        let mut outcome = BulkOutcome::default();

        for item in items {
            if rejected.contains(&item.id) {
                outcome.errors.push(BulkItemError {
                    id: item.id,
                    status: 400,
                    error_type: Some("document_parsing_exception".to_string()),
                    reason: "failed to parse field [date]".to_string(),
                });
                continue;
            }
            let source = item.document.as_object().cloned().unwrap_or_default();
            upsert(target, item.id, source);
            outcome.success_count += 1;
        }
        Ok(outcome)
    }

    async fn write(&self, index: &str, id: Option<&str>, document: &Value) -> Result<WriteAck> {
        *self.writes.lock().unwrap() += 1;

        let mut indexes = self.indexes.lock().unwrap();
        let target = indexes.entry(index.to_string()).or_default();
        let id = match id {
            Some(id) => id.to_string(),
            None => {
                target.next_auto_id += 1;
                format!("auto-{}", target.next_auto_id)
            }
        };
        let source = document.as_object().cloned().unwrap_or_default();
        let created = upsert(target, id.clone(), source);

        Ok(WriteAck {
            index: index.to_string(),
            id,
            result: if created { "created" } else { "updated" }.to_string(),
            version: if created { 1 } else { 2 },
        })
    }

    async fn get(&self, index: &str, id: &str) -> Result<Option<Map<String, Value>>> {
        self.with_index(index, |i| {
            i.docs
                .iter()
                .find(|(doc_id, _)| doc_id == id)
                .map(|(_, source)| source.clone())
        })
    }

    async fn delete(&self, index: &str, id: &str) -> Result<bool> {
        self.with_index(index, |i| {
            let before = i.docs.len();
            i.docs.retain(|(doc_id, _)| doc_id != id);
            i.docs.len() != before
        })
    }

    async fn index_exists(&self, index: &str) -> Result<bool> {
        Ok(self.indexes.lock().unwrap().contains_key(index))
    }

    async fn create_index(&self, index: &str, definition: &Value) -> Result<()> {
        let mut indexes = self.indexes.lock().unwrap();
        if indexes.contains_key(index) {
            return Err(SearchError::backend(
                "failed to create index",
                ApiError {
                    status: 400,
                    error_type: Some("resource_already_exists_exception".to_string()),
                    reason: format!("index [{}] already exists", index),
                },
            ));
        }
        indexes.insert(
            index.to_string(),
            Index {
                definition: definition.clone(),
                ..Index::default()
            },
        );
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<()> {
        match self.indexes.lock().unwrap().remove(index) {
            Some(_) => Ok(()),
            None => Err(Self::missing_index(index)),
        }
    }

    async fn count(&self, index: &str) -> Result<u64> {
        self.with_index(index, |i| i.docs.len() as u64)
    }

    async fn refresh(&self, index: &str) -> Result<()> {
        self.with_index(index, |_| ())
    }

    async fn index_stats(&self, index: &str) -> Result<IndexStats> {
        self.with_index(index, |i| IndexStats {
            doc_count: i.docs.len() as u64,
            size_bytes: Some(
                i.docs
                    .iter()
                    .map(|(_, s)| Value::Object(s.clone()).to_string().len() as u64)
                    .sum(),
            ),
        })
    }

    async fn health(&self) -> Result<ClusterHealth> {
        Ok(ClusterHealth {
            status: "green".to_string(),
            number_of_nodes: Some(1),
            active_primary_shards: Some(self.indexes.lock().unwrap().len() as u64),
            cluster_uuid: None,
        })
    }
}

/// Insert or replace; true when the id was new
fn upsert(index: &mut Index, id: String, source: Map<String, Value>) -> bool {
    match index.docs.iter_mut().find(|(doc_id, _)| *doc_id == id) {
        Some(existing) => {
            existing.1 = source;
            false
        }
        None => {
            index.docs.push((id, source));
            true
        }
    }
}

fn run_query(docs: &[(String, Map<String, Value>)], body: &Value) -> Value {
    let clause = body.get("query").cloned().unwrap_or(json!({"match_all": {}}));
    let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

    let mut matched: Vec<(f64, &String, &Map<String, Value>)> = docs
        .iter()
        .filter_map(|(id, source)| evaluate(&clause, source).map(|score| (score, id, source)))
        .collect();
    matched.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    let total = matched.len();
    let hits: Vec<Value> = matched
        .into_iter()
        .take(size)
        .map(|(score, id, source)| {
            json!({
                "_index": "fake",
                "_id": id,
                "_score": score,
                "_source": filter_source(source, body.get("_source")),
            })
        })
        .collect();

    json!({ "hits": { "total": { "value": total, "relation": "eq" }, "hits": hits } })
}

fn aggregate(docs: &[(String, Map<String, Value>)], aggs: &Value) -> Value {
    let mut aggregations = Map::new();
    for (name, agg) in aggs.as_object().into_iter().flatten() {
        let field = agg["terms"]["field"].as_str().unwrap_or_default();
        let mut counts: HashMap<String, u64> = HashMap::new();
        for (_, source) in docs {
            if let Some(key) = source.get(field).and_then(Value::as_str) {
                *counts.entry(key.to_string()).or_default() += 1;
            }
        }
        let mut buckets: Vec<(String, u64)> = counts.into_iter().collect();
        buckets.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let buckets: Vec<Value> = buckets
            .into_iter()
            .map(|(key, count)| json!({ "key": key, "doc_count": count }))
            .collect();
        aggregations.insert(name.clone(), json!({ "buckets": buckets }));
    }

    json!({
        "hits": { "total": { "value": docs.len(), "relation": "eq" }, "hits": [] },
        "aggregations": aggregations,
    })
}

fn filter_source(source: &Map<String, Value>, fields: Option<&Value>) -> Map<String, Value> {
    match fields.and_then(Value::as_array) {
        Some(fields) => source
            .iter()
            .filter(|(k, _)| fields.iter().any(|f| f.as_str() == Some(k.as_str())))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        None => source.clone(),
    }
}

/// Score of a document for a clause, None when it does not match
fn evaluate(clause: &Value, doc: &Map<String, Value>) -> Option<f64> {
    let (kind, body) = clause.as_object()?.iter().next()?;
    match kind.as_str() {
        "match_all" => Some(1.0),
        "term" => {
            let (field, value) = body.as_object()?.iter().next()?;
            (doc.get(field) == Some(value)).then_some(1.0)
        }
        "match" => {
            let (field, text) = body.as_object()?.iter().next()?;
            text_score(doc.get(field), text.as_str()?)
        }
        "multi_match" => {
            let text = body["query"].as_str()?;
            let score: f64 = body["fields"]
                .as_array()?
                .iter()
                .filter_map(|f| text_score(doc.get(f.as_str()?), text))
                .sum();
            (score > 0.0).then_some(score)
        }
        "range" => {
            let (field, bounds) = body.as_object()?.iter().next()?;
            let value = doc.get(field)?;
            let lower_ok = bounds.get("gte").map_or(true, |b| compare(value, b) != Some(Ordering::Less));
            let upper_ok = bounds.get("lte").map_or(true, |b| compare(value, b) != Some(Ordering::Greater));
            (lower_ok && upper_ok).then_some(1.0)
        }
        "bool" => evaluate_bool(body, doc),
        _ => None,
    }
}

fn evaluate_bool(body: &Value, doc: &Map<String, Value>) -> Option<f64> {
    let clauses = |name: &str| body.get(name).and_then(Value::as_array).cloned().unwrap_or_default();
    let (must, filter, should) = (clauses("must"), clauses("filter"), clauses("should"));

    let mut score = 0.0;
    for clause in &must {
        score += evaluate(clause, doc)?;
    }
    for clause in &filter {
        evaluate(clause, doc)?;
    }

    let should_scores: Vec<f64> = should.iter().filter_map(|c| evaluate(c, doc)).collect();
    if must.is_empty() && filter.is_empty() && !should.is_empty() && should_scores.is_empty() {
        return None;
    }
    Some(score + should_scores.iter().sum::<f64>())
}

fn text_score(field: Option<&Value>, text: &str) -> Option<f64> {
    let haystack = tokens(field?.as_str()?);
    let hits = tokens(text).iter().filter(|t| haystack.contains(*t)).count();
    (hits > 0).then_some(hits as f64)
}

fn tokens(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn compare(value: &Value, bound: &Value) -> Option<Ordering> {
    match (value, bound) {
        (Value::String(a), Value::String(b)) => Some(a.as_str().cmp(b.as_str())),
        _ => value.as_f64()?.partial_cmp(&bound.as_f64()?),
    }
}
