// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::Result;
use clap::{Parser, Subcommand};
use cuentos_search::models::query::{
    BoolQuery, Clause, DEFAULT_AGGREGATION_NAME, DEFAULT_MATCH_ALL_SIZE,
};
use cuentos_search::models::sample::sample_documents;
use cuentos_search::models::search::{AggregationBucket, ResultRecord};
use cuentos_search::models::settings::Settings;
use cuentos_search::services::backend::SearchBackend;
use cuentos_search::services::index_manager::IndexManager;
use cuentos_search::services::indexer::DocumentIndexer;
use cuentos_search::services::logging;
use cuentos_search::services::normalizer::QueryNormalizer;
use cuentos_search::services::search::SearchClient;
use cuentos_search::VERSION;
use serde_json::Value;
use std::sync::Arc;

const SEPARATOR_WIDTH: usize = 70;
const MAX_TEXT_PREVIEW: usize = 100;

/// Index and query short tales in an Elasticsearch-compatible service.
///
/// Connection settings come from ELASTIC_URL, ELASTIC_API_KEY (or
/// ELASTIC_USER/ELASTIC_PASSWORD), ELASTIC_REQUEST_TIMEOUT_SECS,
/// ELASTIC_MAX_RETRIES, INDEX_NAME, LOG_LEVEL and LOG_FILE.
#[derive(Parser)]
#[command(name = "cuentos", version = VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show cluster health
    Health,
    /// Create the index with the tales mapping
    InitIndex {
        /// Drop the index first if it exists
        #[arg(long)]
        recreate: bool,
    },
    /// Drop the index
    DeleteIndex,
    /// Show document count and size of the index
    IndexInfo,
    /// Bulk-index the bundled sample tales
    LoadSample,
    /// Count indexed documents
    Count,
    /// Fetch one document by id
    Get { id: String },
    /// Delete one document by id
    Delete { id: String },
    /// List all documents
    MatchAll {
        #[arg(long, default_value_t = DEFAULT_MATCH_ALL_SIZE)]
        size: usize,
    },
    /// Exact match on a keyword field
    Term { field: String, value: String },
    /// Full-text search on one field
    Match {
        field: String,
        text: String,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Inclusive range, e.g. on `date`
    Range {
        field: String,
        #[arg(long)]
        gte: Option<String>,
        #[arg(long)]
        lte: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Full-text search across several fields
    MultiMatch {
        text: String,
        #[arg(long, value_delimiter = ',', required = true)]
        fields: Vec<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Full-text search on `text`, filtered by category and start date
    Filter {
        text: String,
        #[arg(long)]
        document_type: Option<String>,
        /// Only tales dated on or after this day (YYYY-MM-DD)
        #[arg(long)]
        since: Option<String>,
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Count documents per value of a keyword field
    Aggregate {
        field: String,
        #[arg(long, default_value = DEFAULT_AGGREGATION_NAME)]
        name: String,
    },
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Only return these fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    source_fields: Vec<String>,
}

impl SourceArgs {
    fn into_option(self) -> Option<Vec<String>> {
        Some(self.source_fields).filter(|f| !f.is_empty())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = Settings::from_env()?;
    logging::init(&settings.log_level, settings.log_file.as_deref())?;

    let client = Arc::new(SearchClient::connect(&settings).await?);
    let result = run(cli.command, client.clone(), &settings.index_name).await;

    // Release the connection whether or not the command succeeded
    if let Ok(client) = Arc::try_unwrap(client) {
        client.close();
    }

    result
}

async fn run(command: Command, client: Arc<SearchClient>, index_name: &str) -> Result<()> {
    let manager = IndexManager::new(client.clone(), index_name);
    let indexer = DocumentIndexer::new(client.clone(), index_name);
    let normalizer = QueryNormalizer::new(client.clone(), index_name);

    match command {
        Command::Health => show_health(&client).await?,
        Command::InitIndex { recreate } => {
            if manager.create(recreate).await? {
                println!("Index '{}' created", index_name);
            } else {
                println!("Index '{}' already exists (use --recreate)", index_name);
            }
        }
        Command::DeleteIndex => {
            manager.delete().await?;
            println!("Index '{}' deleted", index_name);
        }
        Command::IndexInfo => show_index_info(&manager).await?,
        Command::LoadSample => load_sample(&indexer, &manager).await?,
        Command::Count => println!("{}", indexer.count().await?),
        Command::Get { id } => match indexer.get_document(&id).await? {
            Some(source) => println!("{}", serde_json::to_string_pretty(&source)?),
            None => println!("Document '{}' not found", id),
        },
        Command::Delete { id } => {
            if indexer.delete_document(&id).await? {
                println!("Document '{}' deleted", id);
            } else {
                println!("Document '{}' not found", id);
            }
        }
        Command::MatchAll { size } => {
            print_results("MATCH ALL", &normalizer.match_all(size).await?);
        }
        Command::Term { field, value } => {
            print_results("TERM", &normalizer.term(&field, value).await?);
        }
        Command::Match {
            field,
            text,
            source,
        } => {
            let results = normalizer
                .match_text(&field, &text, source.into_option())
                .await?;
            print_results("MATCH", &results);
        }
        Command::Range {
            field,
            gte,
            lte,
            source,
        } => {
            let (gte, lte) = (gte.map(Value::from), lte.map(Value::from));
            let results = normalizer
                .range(&field, gte, lte, source.into_option())
                .await?;
            print_results("RANGE", &results);
        }
        Command::MultiMatch {
            text,
            fields,
            source,
        } => {
            let results = normalizer
                .multi_match(&text, fields, source.into_option())
                .await?;
            print_results("MULTI MATCH", &results);
        }
        Command::Filter {
            text,
            document_type,
            since,
            source,
        } => {
            let query = filtered_search(text, document_type, since);
            let results = normalizer.boolean(query, source.into_option()).await?;
            print_results("FILTERED SEARCH", &results);
        }
        Command::Aggregate { field, name } => {
            print_buckets(&field, &normalizer.aggregate(&field, &name).await?);
        }
    }
    Ok(())
}

async fn show_health(client: &SearchClient) -> Result<()> {
    print_separator("CLUSTER HEALTH");
    let health = client.health().await?;
    let server = client.server_info();
    println!("Server:  {} ({})", server.version, server.cluster_name);
    println!("Status:  {}", health.status);
    if let Some(nodes) = health.number_of_nodes {
        println!("Nodes:   {}", nodes);
    }
    if let Some(uuid) = health.cluster_uuid {
        println!("Cluster: {}", uuid);
    }
    Ok(())
}

async fn show_index_info(manager: &IndexManager<SearchClient>) -> Result<()> {
    let Some(stats) = manager.info().await? else {
        println!("Index '{}' does not exist", manager.index_name());
        return Ok(());
    };

    println!("Index:     {}", manager.index_name());
    println!("Documents: {}", stats.doc_count);
    match stats.size_bytes {
        Some(size) => println!("Size:      {:.2} KB", size as f64 / 1024.0),
        None => println!("Size:      not available"),
    }
    Ok(())
}

async fn load_sample(
    indexer: &DocumentIndexer<SearchClient>,
    manager: &IndexManager<SearchClient>,
) -> Result<()> {
    let outcome = indexer.index_bulk(&sample_documents()).await?;
    manager.refresh().await?;

    println!("Indexed:  {}", outcome.success_count);
    println!("Failed:   {}", outcome.errors.len());
    for error in &outcome.errors {
        println!("  - id {}: {}", error.id, error.reason);
    }
    println!("Total in index: {}", indexer.count().await?);
    Ok(())
}

fn filtered_search(text: String, document_type: Option<String>, since: Option<String>) -> BoolQuery {
    let mut query = BoolQuery::new().must(Clause::matching("text", text));
    if let Some(document_type) = document_type {
        query = query.filter(Clause::term("document_type", document_type));
    }
    if let Some(since) = since {
        query = query.filter(Clause::range("date", Some(since), None));
    }
    query
}

fn print_separator(title: &str) {
    println!("\n{}", "=".repeat(SEPARATOR_WIDTH));
    println!("  {}", title);
    println!("{}\n", "=".repeat(SEPARATOR_WIDTH));
}

fn print_results(title: &str, results: &[ResultRecord]) {
    print_separator(title);
    if results.is_empty() {
        println!("  No results");
        return;
    }

    for (i, record) in results.iter().enumerate() {
        println!("\n{}. ID: {}", i + 1, record.id);
        if let Some(score) = record.score {
            println!("   Score: {:.2}", score);
        }
        for (label, field) in [("Author", "author"), ("Type", "document_type"), ("Date", "date")] {
            if let Some(value) = record.field(field) {
                println!("   {}: {}", label, value);
            }
        }
        if let Some(text) = record.field("text") {
            println!("   Text: {}", preview(text));
        }
    }
}

fn print_buckets(field: &str, buckets: &[AggregationBucket]) {
    print_separator(&format!("DOCUMENTS BY {}", field.to_uppercase()));
    let total: u64 = buckets.iter().map(|b| b.count).sum();
    for bucket in buckets {
        println!("  {:<20} {}", bucket.key, bucket.count);
    }
    println!("  {:<20} {}", "total", total);
}

fn preview(text: &str) -> String {
    if text.chars().count() > MAX_TEXT_PREVIEW {
        let cut: String = text.chars().take(MAX_TEXT_PREVIEW).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}
