use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::spool::LocalSpool;
use server_api::validate_answer_set;
use storage::Storage;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/survey.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print stored responses, newest first.
    List {
        #[arg(long)]
        json: bool,
    },
    Count,
    /// Store answer sets kept locally by the survey client.
    ///
    /// All valid entries are inserted in one transaction. Importing the same
    /// spool again stores its entries again; pass --clear to remove the
    /// spool after a complete import.
    ImportSpool {
        path: PathBuf,
        /// Delete the spool once every entry was imported.
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, PartialEq, Eq)]
struct ImportSummary {
    imported: usize,
    total: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::List { json } => {
            let responses = storage.list_responses().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&responses)?);
            } else {
                for record in responses {
                    let answers: Vec<String> = record
                        .answers
                        .iter()
                        .map(|(number, value)| format!("{number}={value}"))
                        .collect();
                    println!(
                        "{}  {}  score={}  {}",
                        record.submitted_at.to_rfc3339(),
                        record.id,
                        record.score,
                        answers.join(" ")
                    );
                }
            }
        }
        Command::Count => {
            println!("{}", storage.count_responses().await?);
        }
        Command::ImportSpool { path, clear } => {
            let summary = import_spool(&storage, &LocalSpool::new(&path)).await?;
            println!(
                "imported {} of {} spooled responses",
                summary.imported, summary.total
            );

            if clear && summary.imported == summary.total && path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("failed to remove spool '{}'", path.display()))?;
            }
        }
    }

    Ok(())
}

fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

/// Inserts every valid spool entry with its spool timestamp. Invalid entries
/// are skipped; a storage failure leaves nothing imported.
async fn import_spool(storage: &Storage, spool: &LocalSpool) -> Result<ImportSummary> {
    let entries = spool.read_all()?;
    let mut batch = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if let Err(error) = validate_answer_set(&entry.answer_set) {
            warn!(entry = position + 1, error = %error.message, "skipping invalid spool entry");
            continue;
        }
        batch.push((entry.answer_set.clone(), entry.spooled_at));
    }

    storage
        .insert_responses_at(&batch)
        .await
        .with_context(|| format!("failed to import spool '{}'", spool.path().display()))?;
    info!(imported = batch.len(), total = entries.len(), "spool imported");
    Ok(ImportSummary {
        imported: batch.len(),
        total: entries.len(),
    })
}
