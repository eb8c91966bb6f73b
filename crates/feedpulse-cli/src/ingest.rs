//! Feedback ingestion command handlers.
//!
//! Both flows turn their input into drafts, run them through one pipeline
//! batch and print the caller summary as JSON.

use std::path::PathBuf;

use clap::Subcommand;
use feedpulse_classifier::{ClassifierClient, ClassifierConfig};
use feedpulse_core::AppConfig;
use feedpulse_db::PgFeedbackStore;
use feedpulse_pipeline::{
    build_fetch_client, comments_to_records, fetch_comments, parse_feedback_file,
    validate_records, IngestPipeline, IngestionSummary,
};

/// Sub-commands available under `ingest`.
#[derive(Debug, Subcommand)]
pub enum IngestCommands {
    /// Ingest a JSON file of `{date, channel, text}` records
    File {
        /// Path to the JSON file
        path: PathBuf,
        /// Board receiving the feedback
        #[arg(long)]
        board: i64,
    },
    /// Fetch comments from a remote JSON endpoint and ingest them
    Fetch {
        /// Board receiving the feedback
        #[arg(long)]
        board: i64,
        /// Override the comment source URL
        #[arg(long)]
        url: Option<String>,
        /// Ingest at most this many valid comments
        #[arg(long)]
        limit: Option<usize>,
        /// Requester identity attached to log records
        #[arg(long, default_value = "cli")]
        requester: String,
    },
}

pub(crate) async fn run_ingest(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    command: IngestCommands,
) -> anyhow::Result<()> {
    let classifier = ClassifierClient::new(&ClassifierConfig::from_app_config(config)?)?;
    let pipeline = IngestPipeline::new(PgFeedbackStore::new(pool.clone()), classifier);

    let summary = match command {
        IngestCommands::File { path, board } => {
            run_ingest_file(&pipeline, config, &path, board).await?
        }
        IngestCommands::Fetch {
            board,
            url,
            limit,
            requester,
        } => {
            let url = url.unwrap_or_else(|| config.fetch_url.clone());
            run_ingest_fetch(&pipeline, config, &url, board, limit, &requester).await?
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

async fn run_ingest_file(
    pipeline: &IngestPipeline<PgFeedbackStore, ClassifierClient>,
    config: &AppConfig,
    path: &std::path::Path,
    board_id: i64,
) -> anyhow::Result<IngestionSummary> {
    let bytes = tokio::fs::read(path).await?;
    let records = parse_feedback_file(&bytes, config.max_upload_items)?;

    let validated = validate_records(records, board_id);
    for e in &validated.errors {
        tracing::warn!(board_id, error = %e, "rejected feedback record");
    }

    let outcome = pipeline.ingest_upload(&validated.drafts).await?;
    Ok(IngestionSummary::new(validated, outcome))
}

async fn run_ingest_fetch(
    pipeline: &IngestPipeline<PgFeedbackStore, ClassifierClient>,
    config: &AppConfig,
    url: &str,
    board_id: i64,
    limit: Option<usize>,
    requester: &str,
) -> anyhow::Result<IngestionSummary> {
    let client = build_fetch_client(config.fetch_timeout_secs)?;
    let comments = fetch_comments(&client, url).await?;
    tracing::info!(url, count = comments.len(), "comments fetched");

    let records = comments_to_records(comments, &mut rand::rng());
    let mut validated = validate_records(records, board_id);
    if let Some(limit) = limit.filter(|l| *l > 0) {
        validated.truncate(limit);
    }

    let outcome = pipeline.ingest_fetched(&validated.drafts, requester).await?;
    Ok(IngestionSummary::new(validated, outcome))
}
