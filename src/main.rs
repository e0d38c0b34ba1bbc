// Cairn CLI: batch clustering driver.
//
// Walks input JSON files, clusters each through a bounded worker pool, and
// writes colored terminal reports or JSON. File-level failures are warned
// and counted, never fatal to the batch — the exit summary reports how
// many files were skipped.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use cairn::cluster::Clustering;
use cairn::config::ClusteringConfig;
use cairn::document::Document;
use cairn::language::LinguisticResources;
use cairn::output::terminal;
use cairn::pipeline::PipelinePool;

/// Cairn: unsupervised topical clustering for search results.
///
/// Groups retrieved documents (titles/snippets) into labeled topical
/// clusters, with a residual "Other Topics" bucket for everything that
/// fits nowhere confidently.
#[derive(Parser)]
#[command(name = "cairn", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster one or more JSON document files
    Cluster {
        /// Input files, each a JSON array of {id, title, snippet} objects
        files: Vec<PathBuf>,

        /// Language of the documents (tag like "en" or "german")
        #[arg(long, default_value = "en")]
        language: String,

        /// Max number of topical clusters to return
        #[arg(long)]
        clusters: Option<usize>,

        /// Cosine threshold for assigning a document to a cluster (0-1)
        #[arg(long)]
        assignment_threshold: Option<f64>,

        /// Per-file time budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Number of files to cluster in parallel (default: 4)
        #[arg(long, default_value = "4")]
        concurrency: usize,

        /// Emit JSON reports instead of terminal output
        #[arg(long)]
        json: bool,
    },

    /// List the language tags with stemmer + stop-word support
    Languages,
}

/// Input record shape: the connectors upstream produce id + title +
/// snippet; missing fields are treated as empty.
#[derive(Debug, Deserialize)]
struct InputDocument {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Per-file output record for --json mode.
#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    clustered_at: DateTime<Utc>,
    clustering: Clustering,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("cairn=info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Cluster {
            files,
            language,
            clusters,
            assignment_threshold,
            timeout_ms,
            concurrency,
            json,
        } => {
            if files.is_empty() {
                anyhow::bail!("No input files given. Pass at least one JSON document file.");
            }

            // Env-configured defaults, then CLI overrides on top.
            let mut config = ClusteringConfig::from_env()?;
            if let Some(clusters) = clusters {
                config.desired_cluster_count = clusters;
            }
            if let Some(threshold) = assignment_threshold {
                config.assignment_threshold = threshold;
            }
            if let Some(ms) = timeout_ms {
                config.timeout = Some(Duration::from_millis(ms));
            }
            let config = config.validate()?;

            let resources = Arc::new(LinguisticResources::for_language(&language)?);
            let pool = Arc::new(PipelinePool::new(concurrency, resources));

            info!(files = files.len(), concurrency, "Starting batch");

            let pb = ProgressBar::new(files.len() as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("  Clustering [{bar:30}] {pos}/{len} ({eta})")
                    .unwrap(),
            );

            let results: Vec<(PathBuf, Result<Clustering>)> =
                stream::iter(files.into_iter().map(|file| {
                    let pool = Arc::clone(&pool);
                    let config = config.clone();
                    let pb = pb.clone();
                    async move {
                        let task_file = file.clone();
                        let outcome = match tokio::task::spawn_blocking(move || {
                            let documents = read_documents(&task_file)?;
                            let worker = pool.checkout();
                            worker
                                .run(&documents, &config)
                                .map_err(anyhow::Error::from)
                        })
                        .await
                        {
                            Ok(result) => result,
                            Err(e) => Err(anyhow::anyhow!("clustering task panicked: {e}")),
                        };
                        pb.inc(1);
                        (file, outcome)
                    }
                }))
                .buffer_unordered(concurrency)
                .collect()
                .await;
            pb.finish_and_clear();

            let mut warnings = 0;
            for (file, outcome) in results {
                match outcome {
                    Ok(clustering) => {
                        if json {
                            let report = FileReport {
                                file: file.display().to_string(),
                                clustered_at: Utc::now(),
                                clustering,
                            };
                            println!("{}", serde_json::to_string_pretty(&report)?);
                        } else {
                            terminal::display_clustering(
                                &file.display().to_string(),
                                &clustering,
                            );
                        }
                    }
                    Err(e) => {
                        warn!(file = %file.display(), error = %e, "Skipping file");
                        warnings += 1;
                    }
                }
            }

            if warnings > 0 {
                println!(
                    "\n{} {} file(s) skipped with warnings",
                    "!".yellow(),
                    warnings
                );
            }
        }

        Commands::Languages => {
            for tag in [
                "danish", "dutch", "english", "finnish", "french", "german", "hungarian",
                "italian", "norwegian", "portuguese", "romanian", "russian", "spanish",
                "swedish", "turkish",
            ] {
                println!("{tag}");
            }
        }
    }

    Ok(())
}

/// Read and convert one input file.
fn read_documents(path: &PathBuf) -> Result<Vec<Document>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let inputs: Vec<InputDocument> = serde_json::from_str(&raw)
        .with_context(|| format!("cannot parse {} as a JSON document array", path.display()))?;
    Ok(inputs
        .into_iter()
        .map(|d| Document::from_title_snippet(d.id, d.title, d.snippet))
        .collect())
}
