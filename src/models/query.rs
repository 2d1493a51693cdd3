// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Default page size of a match-all query
pub const DEFAULT_MATCH_ALL_SIZE: usize = 100;

/// Default name of a terms aggregation
pub const DEFAULT_AGGREGATION_NAME: &str = "aggregation";

/// Abstract search request, translated into the query DSL by
/// [`crate::services::normalizer::build_query`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QueryIntent {
    MatchAll {
        size: usize,
    },
    /// Exact, unanalyzed equality
    Term {
        field: String,
        value: Value,
    },
    /// Analyzed full-text match
    Match {
        field: String,
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_fields: Option<Vec<String>>,
    },
    /// Inclusive bounds, either may be absent
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_fields: Option<Vec<String>>,
    },
    Bool {
        query: BoolQuery,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_fields: Option<Vec<String>>,
    },
    MultiMatch {
        text: String,
        fields: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        source_fields: Option<Vec<String>>,
    },
    /// Terms aggregation; yields buckets instead of documents
    Aggregation {
        field: String,
        name: String,
    },
}

impl QueryIntent {
    pub fn match_all(size: usize) -> Self {
        QueryIntent::MatchAll { size }
    }

    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        QueryIntent::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matching(field: impl Into<String>, text: impl Into<String>) -> Self {
        QueryIntent::Match {
            field: field.into(),
            text: text.into(),
            source_fields: None,
        }
    }

    pub fn range<T: Into<Value>>(
        field: impl Into<String>,
        gte: Option<T>,
        lte: Option<T>,
    ) -> Self {
        QueryIntent::Range {
            field: field.into(),
            gte: gte.map(Into::into),
            lte: lte.map(Into::into),
            source_fields: None,
        }
    }

    pub fn boolean(query: BoolQuery) -> Self {
        QueryIntent::Bool {
            query,
            source_fields: None,
        }
    }

    pub fn multi_match<S: Into<String>>(
        text: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        QueryIntent::MultiMatch {
            text: text.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            source_fields: None,
        }
    }

    pub fn aggregation(field: impl Into<String>, name: impl Into<String>) -> Self {
        QueryIntent::Aggregation {
            field: field.into(),
            name: name.into(),
        }
    }

    /// Restrict returned fields. Ignored by intents without `_source` support
    /// (match-all, term, aggregation).
    pub fn with_source_fields<S: Into<String>>(
        mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Self {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        match &mut self {
            QueryIntent::Match { source_fields, .. }
            | QueryIntent::Range { source_fields, .. }
            | QueryIntent::Bool { source_fields, .. }
            | QueryIntent::MultiMatch { source_fields, .. } => *source_fields = Some(fields),
            QueryIntent::MatchAll { .. }
            | QueryIntent::Term { .. }
            | QueryIntent::Aggregation { .. } => {}
        }
        self
    }

    /// Relevance-ranked intents keep the backend score in their results
    pub fn is_scored(&self) -> bool {
        matches!(
            self,
            QueryIntent::Match { .. } | QueryIntent::Bool { .. } | QueryIntent::MultiMatch { .. }
        )
    }

    pub fn source_fields(&self) -> Option<&[String]> {
        match self {
            QueryIntent::Match { source_fields, .. }
            | QueryIntent::Range { source_fields, .. }
            | QueryIntent::Bool { source_fields, .. }
            | QueryIntent::MultiMatch { source_fields, .. } => source_fields.as_deref(),
            _ => None,
        }
    }

    /// Short name used in log lines
    pub fn kind(&self) -> &'static str {
        match self {
            QueryIntent::MatchAll { .. } => "match_all",
            QueryIntent::Term { .. } => "term",
            QueryIntent::Match { .. } => "match",
            QueryIntent::Range { .. } => "range",
            QueryIntent::Bool { .. } => "bool",
            QueryIntent::MultiMatch { .. } => "multi_match",
            QueryIntent::Aggregation { .. } => "aggregation",
        }
    }
}

/// Leaf or compound condition inside a bool query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clause {
    MatchAll,
    Term {
        field: String,
        value: Value,
    },
    Match {
        field: String,
        text: String,
    },
    Range {
        field: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        gte: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        lte: Option<Value>,
    },
    MultiMatch {
        text: String,
        fields: Vec<String>,
    },
    Bool(BoolQuery),
}

impl Clause {
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Clause::Term {
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn matching(field: impl Into<String>, text: impl Into<String>) -> Self {
        Clause::Match {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn range<T: Into<Value>>(
        field: impl Into<String>,
        gte: Option<T>,
        lte: Option<T>,
    ) -> Self {
        Clause::Range {
            field: field.into(),
            gte: gte.map(Into::into),
            lte: lte.map(Into::into),
        }
    }

    /// Render as a query DSL object
    pub fn to_dsl(&self) -> Value {
        match self {
            Clause::MatchAll => json!({ "match_all": {} }),
            Clause::Term { field, value } => json!({ "term": { field.as_str(): value } }),
            Clause::Match { field, text } => json!({ "match": { field.as_str(): text } }),
            Clause::Range { field, gte, lte } => {
                json!({ "range": { field.as_str(): range_bounds(gte.as_ref(), lte.as_ref()) } })
            }
            Clause::MultiMatch { text, fields } => {
                json!({ "multi_match": { "query": text, "fields": fields } })
            }
            Clause::Bool(query) => query.to_dsl(),
        }
    }
}

/// `must` clauses score, `filter` clauses only restrict, `should` clauses boost
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoolQuery {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub must: Vec<Clause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filter: Vec<Clause>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub should: Vec<Clause>,
}

impl BoolQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must(mut self, clause: Clause) -> Self {
        self.must.push(clause);
        self
    }

    pub fn filter(mut self, clause: Clause) -> Self {
        self.filter.push(clause);
        self
    }

    pub fn should(mut self, clause: Clause) -> Self {
        self.should.push(clause);
        self
    }

    /// Render as `{"bool": {...}}`, leaving out empty clause lists
    pub fn to_dsl(&self) -> Value {
        let mut conditions = Map::new();
        for (name, clauses) in [
            ("must", &self.must),
            ("filter", &self.filter),
            ("should", &self.should),
        ] {
            if !clauses.is_empty() {
                let rendered = clauses.iter().map(Clause::to_dsl).collect();
                conditions.insert(name.to_string(), Value::Array(rendered));
            }
        }
        json!({ "bool": conditions })
    }
}

pub(crate) fn range_bounds(gte: Option<&Value>, lte: Option<&Value>) -> Value {
    let mut bounds = Map::new();
    if let Some(gte) = gte {
        bounds.insert("gte".to_string(), gte.clone());
    }
    if let Some(lte) = lte {
        bounds.insert("lte".to_string(), lte.clone());
    }
    Value::Object(bounds)
}
