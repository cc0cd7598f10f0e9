mod display;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use clauseguard_ai::{ClauseAnalyzer, EmbeddingProvider, HashedEmbedder};
use clauseguard_core::config::{DEFAULT_FUZZY_MATCH_RATIO, DEFAULT_SIMILARITY_THRESHOLD};
use clauseguard_core::{AnalyzerConfig, Analysis, PatternStore, PatternTable};
use clauseguard_corpus::miner::{DEFAULT_CONTEXT_WINDOW, DEFAULT_CONVERTER, DEFAULT_CONVERT_TIMEOUT_SECS};
use clauseguard_corpus::{CorpusError, MiningConfig, PatternCompiler};
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clauseguard")]
#[command(about = "Clause risk analysis learned from previously redlined agreements", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Mine a training directory and compile the pattern table
    Train {
        #[command(flatten)]
        mining: MiningArgs,

        /// Write the compiled pattern table to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Analyze documents against the compiled patterns
    Analyze {
        /// Documents to analyze (.docx)
        #[arg(required = true)]
        documents: Vec<PathBuf>,

        /// Precompiled pattern table (from `train --output`)
        #[arg(long, conflicts_with = "training_dir")]
        patterns: Option<PathBuf>,

        #[command(flatten)]
        mining: MiningArgs,

        /// Directory holding model.onnx and tokenizer.json
        #[arg(long, env = "CLAUSEGUARD_MODEL_DIR")]
        model_dir: Option<PathBuf>,

        /// Cosine similarity a category must exceed
        #[arg(long, default_value_t = DEFAULT_SIMILARITY_THRESHOLD)]
        similarity_threshold: f32,

        /// Share of a literal pattern's words needed for a fuzzy match
        #[arg(long, default_value_t = DEFAULT_FUZZY_MATCH_RATIO)]
        fuzzy_ratio: f32,

        /// Print reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the clause lexicon
    Categories,
}

#[derive(Args)]
struct MiningArgs {
    /// Directory of redlined .docx/.doc training documents
    #[arg(long, env = "CLAUSEGUARD_TRAINING_DIR")]
    training_dir: Option<PathBuf>,

    /// Use only the mined patterns, without the baseline rules after them
    #[arg(long)]
    no_baseline: bool,

    /// Office suite used to convert legacy .doc files
    #[arg(long, env = "CLAUSEGUARD_CONVERTER", default_value = DEFAULT_CONVERTER)]
    converter: String,

    /// Seconds allowed per legacy conversion
    #[arg(long, default_value_t = DEFAULT_CONVERT_TIMEOUT_SECS)]
    convert_timeout: u64,

    /// Words of surrounding text kept as context for mined changes
    #[arg(long, default_value_t = DEFAULT_CONTEXT_WINDOW)]
    context_window: usize,
}

impl MiningArgs {
    fn config(&self) -> MiningConfig {
        MiningConfig {
            context_window: self.context_window,
            include_baseline: !self.no_baseline,
            converter_program: self.converter.clone(),
            convert_timeout_secs: self.convert_timeout,
        }
    }
}

#[derive(Serialize)]
struct DocumentReport<'a> {
    document: &'a Path,
    #[serde(flatten)]
    analysis: &'a Analysis,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Train { mining, output } => train(&mining, output.as_deref()).await,
        Commands::Analyze {
            documents,
            patterns,
            mining,
            model_dir,
            similarity_threshold,
            fuzzy_ratio,
            json,
        } => {
            let config = AnalyzerConfig::default()
                .with_similarity_threshold(similarity_threshold)
                .with_fuzzy_match_ratio(fuzzy_ratio);
            let table = load_table(patterns.as_deref(), &mining).await?;
            let provider = load_provider(model_dir.as_deref());
            analyze(documents, table, provider, config, json).await
        }
        Commands::Categories => {
            display::print_categories();
            Ok(())
        }
    }
}

async fn train(mining: &MiningArgs, output: Option<&Path>) -> Result<()> {
    let dir = mining
        .training_dir
        .as_deref()
        .context("--training-dir or CLAUSEGUARD_TRAINING_DIR is required")?;
    let compiled = clauseguard_corpus::compile(dir, &mining.config())
        .await
        .with_context(|| format!("mining {}", dir.display()))?;

    display::print_training_summary(&compiled);

    if let Some(path) = output {
        compiled
            .table
            .save(path)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), patterns = compiled.table.len(), "pattern table written");
    }
    Ok(())
}

/// Baseline first; a saved or freshly mined table replaces it when given.
///
/// A missing training directory keeps the baseline.
async fn load_table(patterns: Option<&Path>, mining: &MiningArgs) -> Result<Arc<PatternTable>> {
    let store = PatternStore::new(PatternCompiler::baseline());

    if let Some(path) = patterns {
        let table = PatternTable::load(path)
            .with_context(|| format!("loading pattern table {}", path.display()))?;
        store.publish(table);
    } else if let Some(dir) = mining.training_dir.as_deref() {
        match clauseguard_corpus::compile(dir, &mining.config()).await {
            Ok(compiled) => {
                store.publish(compiled.table);
            }
            Err(CorpusError::CorpusNotFound(missing)) => {
                warn!(
                    training_dir = %missing.display(),
                    "training directory not found, using baseline patterns"
                );
            }
            Err(e) => return Err(e).with_context(|| format!("mining {}", dir.display())),
        }
    }
    Ok(store.current())
}

fn load_provider(model_dir: Option<&Path>) -> Arc<dyn EmbeddingProvider> {
    match model_dir {
        Some(dir) => onnx_provider(dir),
        None => Arc::new(HashedEmbedder::default()),
    }
}

#[cfg(feature = "onnx")]
fn onnx_provider(dir: &Path) -> Arc<dyn EmbeddingProvider> {
    match clauseguard_ai::Embedder::load(dir) {
        Ok(embedder) => Arc::new(embedder),
        Err(e) => {
            warn!(error = %e, "embedding model unavailable, semantic categorization disabled");
            Arc::new(clauseguard_ai::NeutralEmbedder::new(384))
        }
    }
}

#[cfg(not(feature = "onnx"))]
fn onnx_provider(dir: &Path) -> Arc<dyn EmbeddingProvider> {
    warn!(
        model_dir = %dir.display(),
        "built without the onnx feature, using hashed embeddings"
    );
    Arc::new(HashedEmbedder::default())
}

/// Analyze every document concurrently against one table snapshot.
async fn analyze(
    documents: Vec<PathBuf>,
    table: Arc<PatternTable>,
    provider: Arc<dyn EmbeddingProvider>,
    config: AnalyzerConfig,
    json: bool,
) -> Result<()> {
    let analyzer = Arc::new(ClauseAnalyzer::new(provider, config));
    info!(
        documents = documents.len(),
        patterns = table.len(),
        origin = ?table.origin(),
        "analyzing documents"
    );

    let tasks = documents.into_iter().map(|path| {
        let analyzer = Arc::clone(&analyzer);
        let table = Arc::clone(&table);
        tokio::task::spawn_blocking(move || -> Result<(PathBuf, Analysis)> {
            let paragraphs = clauseguard_corpus::read_paragraphs(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            let analysis = analyzer.analyze(&table, &paragraphs);
            Ok((path, analysis))
        })
    });

    let mut failures = 0usize;
    let mut reports = Vec::new();
    for joined in futures::future::join_all(tasks).await {
        match joined.context("analysis task panicked")? {
            Ok(report) => reports.push(report),
            Err(e) => {
                eprintln!("error: {e:#}");
                failures += 1;
            }
        }
    }

    if json {
        let out: Vec<DocumentReport> = reports
            .iter()
            .map(|(document, analysis)| DocumentReport { document, analysis })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for (path, analysis) in &reports {
            display::print_analysis(path, analysis);
        }
    }

    anyhow::ensure!(failures == 0, "{failures} document(s) could not be analyzed");
    Ok(())
}
