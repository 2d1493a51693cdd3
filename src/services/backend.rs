// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! The capability every search backend provides.
//!
//! Components such as [`crate::services::normalizer::QueryNormalizer`] and
//! [`crate::services::indexer::DocumentIndexer`] are generic over this trait,
//! so they can run against the HTTP client or against an in-memory fake in
//! tests.

use crate::error::Result;
use crate::models::search::{
    BulkItem, BulkOutcome, ClusterHealth, IndexStats, RawSearchResponse, WriteAck,
};
use serde_json::{Map, Value};
use std::future::Future;

pub trait SearchBackend: Send + Sync {
    /// Run a query description against an index
    fn search(
        &self,
        index: &str,
        query: &Value,
    ) -> impl Future<Output = Result<RawSearchResponse>> + Send;

    /// Write all items in one batch. Item-level failures are reported in the
    /// outcome, not as an error.
    fn bulk_write(
        &self,
        index: &str,
        items: Vec<BulkItem>,
    ) -> impl Future<Output = Result<BulkOutcome>> + Send;

    /// Write one document, letting the backend assign an id when `id` is None
    fn write(
        &self,
        index: &str,
        id: Option<&str>,
        document: &Value,
    ) -> impl Future<Output = Result<WriteAck>> + Send;

    /// Stored fields of a document, None when it does not exist
    fn get(
        &self,
        index: &str,
        id: &str,
    ) -> impl Future<Output = Result<Option<Map<String, Value>>>> + Send;

    /// Returns false when the document did not exist
    fn delete(&self, index: &str, id: &str) -> impl Future<Output = Result<bool>> + Send;

    fn index_exists(&self, index: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Create an index with the given settings and mappings document
    fn create_index(
        &self,
        index: &str,
        definition: &Value,
    ) -> impl Future<Output = Result<()>> + Send;

    fn delete_index(&self, index: &str) -> impl Future<Output = Result<()>> + Send;

    fn count(&self, index: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Make recent writes visible to search
    fn refresh(&self, index: &str) -> impl Future<Output = Result<()>> + Send;

    fn index_stats(&self, index: &str) -> impl Future<Output = Result<IndexStats>> + Send;

    fn health(&self) -> impl Future<Output = Result<ClusterHealth>> + Send;
}
