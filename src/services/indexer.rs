// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::{Result, SearchError, ValidationError};
use crate::models::search::{BulkItem, BulkOutcome, WriteAck};
use crate::services::backend::SearchBackend;
use crate::services::validator::validate;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Number of item failures echoed to the log after a bulk write
const LOGGED_ITEM_ERRORS: usize = 5;

/// Validates documents and submits them to one index
pub struct DocumentIndexer<B> {
    backend: Arc<B>,
    index_name: String,
}

impl<B: SearchBackend> DocumentIndexer<B> {
    pub fn new(backend: Arc<B>, index_name: impl Into<String>) -> Self {
        Self {
            backend,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    /// Validate and write one document.
    /// The backend assigns an id when `id` is None.
    pub async fn index_single<T: Serialize>(
        &self,
        document: &T,
        id: Option<&str>,
    ) -> Result<WriteAck> {
        let record = to_record(document)?;
        validate(&record)?;

        let ack = self
            .backend
            .write(&self.index_name, id, &record)
            .await
            .inspect_err(|e| error!(error = %e, "Failed to index document"))?;

        info!(id = %ack.id, result = %ack.result, "Document indexed");
        Ok(ack)
    }

    /// Validate every document, then submit them as one batch with ids
    /// `"1"..="N"` in input order.
    ///
    /// Any invalid document aborts the call before anything is sent.
    /// Item-level write failures are returned in the outcome.
    pub async fn index_bulk<T: Serialize>(&self, documents: &[T]) -> Result<BulkOutcome> {
        if documents.is_empty() {
            return Ok(BulkOutcome::default());
        }

        info!(count = documents.len(), "Starting bulk indexing");

        let mut items = Vec::with_capacity(documents.len());
        for (position, document) in documents.iter().enumerate() {
            let record = to_record(document)
                .and_then(|record| validate(&record).map(|()| record))
                .map_err(|source| SearchError::InvalidBatchDocument { position, source })?;
            items.push(BulkItem {
                id: (position + 1).to_string(),
                document: record,
            });
        }

        let outcome = self
            .backend
            .bulk_write(&self.index_name, items)
            .await
            .inspect_err(|e| error!(error = %e, "Bulk indexing failed"))?;

        info!(succeeded = outcome.success_count, "Bulk indexing completed");
        if !outcome.errors.is_empty() {
            warn!(failed = outcome.errors.len(), "Some documents were not indexed");
            for item in outcome.errors.iter().take(LOGGED_ITEM_ERRORS) {
                warn!(id = %item.id, status = item.status, reason = %item.reason, "Item failed");
            }
        }

        Ok(outcome)
    }

    /// Number of documents in the index
    pub async fn count(&self) -> Result<u64> {
        let count = self.backend.count(&self.index_name).await?;
        info!(index = %self.index_name, count, "Counted documents");
        Ok(count)
    }

    /// Stored fields of one document, None when it does not exist
    pub async fn get_document(&self, id: &str) -> Result<Option<Map<String, Value>>> {
        self.backend.get(&self.index_name, id).await
    }

    /// Returns false when the document did not exist
    pub async fn delete_document(&self, id: &str) -> Result<bool> {
        let deleted = self.backend.delete(&self.index_name, id).await?;
        if deleted {
            info!(id, "Document deleted");
        } else {
            warn!(id, "Document to delete was not found");
        }
        Ok(deleted)
    }
}

fn to_record<T: Serialize>(document: &T) -> std::result::Result<Value, ValidationError> {
    serde_json::to_value(document).map_err(|e| ValidationError::Unserializable(e.to_string()))
}
