// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::Result;
use crate::models::search::IndexStats;
use crate::services::backend::SearchBackend;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Name of the custom analyzer applied to `text`
pub const TEXT_ANALYZER: &str = "spanish_analyzer";

/// Longest `text` value copied into the `text.keyword` sub-field
pub const KEYWORD_IGNORE_ABOVE: u32 = 256;

/// Settings and mappings used when creating the tales index.
///
/// `author` and `document_type` are exact-match keywords, `date` is a
/// `yyyy-MM-dd` date, and `text` is analyzed with lowercase, accent folding,
/// Spanish stopwords and stemming, plus a `text.keyword` sub-field.
pub fn index_definition() -> Value {
    json!({
        "settings": {
            "analysis": {
                "analyzer": {
                    TEXT_ANALYZER: {
                        "type": "custom",
                        "tokenizer": "standard",
                        "filter": ["lowercase", "asciifolding", "spanish_stop", "spanish_stemmer"]
                    }
                },
                "filter": {
                    "spanish_stop": { "type": "stop", "stopwords": "_spanish_" },
                    "spanish_stemmer": { "type": "stemmer", "language": "spanish" }
                }
            }
        },
        "mappings": {
            "properties": {
                "author": { "type": "keyword" },
                "document_type": { "type": "keyword" },
                "date": { "type": "date", "format": "yyyy-MM-dd" },
                "text": {
                    "type": "text",
                    "analyzer": TEXT_ANALYZER,
                    "fields": {
                        "keyword": { "type": "keyword", "ignore_above": KEYWORD_IGNORE_ABOVE }
                    }
                }
            }
        }
    })
}

/// Creates, inspects and drops the index
pub struct IndexManager<B> {
    backend: Arc<B>,
    index_name: String,
}

impl<B: SearchBackend> IndexManager<B> {
    pub fn new(backend: Arc<B>, index_name: impl Into<String>) -> Self {
        Self {
            backend,
            index_name: index_name.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index_name
    }

    pub async fn exists(&self) -> Result<bool> {
        self.backend.index_exists(&self.index_name).await
    }

    /// Create the index with [`index_definition`].
    ///
    /// Returns false when the index already exists and `delete_if_exists`
    /// is not set.
    pub async fn create(&self, delete_if_exists: bool) -> Result<bool> {
        if delete_if_exists {
            self.delete().await?;
        } else if self.exists().await? {
            warn!(index = %self.index_name, "Index already exists");
            return Ok(false);
        }

        self.backend
            .create_index(&self.index_name, &index_definition())
            .await?;

        info!(
            index = %self.index_name,
            analyzer = TEXT_ANALYZER,
            "Index created"
        );
        Ok(true)
    }

    /// Drop the index. Succeeds when it was already absent.
    pub async fn delete(&self) -> Result<bool> {
        if self.exists().await? {
            self.backend.delete_index(&self.index_name).await?;
            info!(index = %self.index_name, "Index deleted");
        } else {
            info!(index = %self.index_name, "Index does not exist, nothing to delete");
        }
        Ok(true)
    }

    /// Document count and size, None when the index does not exist
    pub async fn info(&self) -> Result<Option<IndexStats>> {
        if !self.exists().await? {
            warn!(index = %self.index_name, "Index does not exist");
            return Ok(None);
        }

        let stats = self.backend.index_stats(&self.index_name).await?;
        info!(
            index = %self.index_name,
            documents = stats.doc_count,
            size_bytes = stats.size_bytes,
            "Index info"
        );
        Ok(Some(stats))
    }

    /// Make recent writes searchable
    pub async fn refresh(&self) -> Result<()> {
        self.backend.refresh(&self.index_name).await?;
        debug!(index = %self.index_name, "Index refreshed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_fields() {
        let definition = index_definition();
        let properties = &definition["mappings"]["properties"];
        assert_eq!(properties["author"]["type"], "keyword");
        assert_eq!(properties["document_type"]["type"], "keyword");
    }

    #[test]
    fn test_date_field_format() {
        let date = &index_definition()["mappings"]["properties"]["date"];
        assert_eq!(date["type"], "date");
        assert_eq!(date["format"], "yyyy-MM-dd");
    }

    #[test]
    fn test_text_field_analyzer_and_keyword_subfield() {
        let definition = index_definition();
        let text = &definition["mappings"]["properties"]["text"];
        assert_eq!(text["type"], "text");
        assert_eq!(text["analyzer"], TEXT_ANALYZER);
        assert_eq!(text["fields"]["keyword"]["type"], "keyword");
        assert_eq!(text["fields"]["keyword"]["ignore_above"], 256);
    }

    #[test]
    fn test_analyzer_pipeline() {
        let definition = index_definition();
        let analysis = &definition["settings"]["analysis"];
        assert_eq!(
            analysis["analyzer"][TEXT_ANALYZER]["filter"],
            json!(["lowercase", "asciifolding", "spanish_stop", "spanish_stemmer"])
        );
        assert_eq!(analysis["filter"]["spanish_stop"]["stopwords"], "_spanish_");
        assert_eq!(analysis["filter"]["spanish_stemmer"]["language"], "spanish");
    }
}
