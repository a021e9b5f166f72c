//! Mailscreen CLI
//!
//! Batch surface over the dataset memory and scoring engine:
//! - `ingest` caches incoming datasets into the history store
//! - `train` ingests (when an incoming directory exists) and retrains from
//!   the full accumulated history
//! - `score` classifies one email from inline text or a file

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mailscreen_core::EmailMetadata;
use mailscreen_features::ModelArtifact;
use mailscreen_policy::{EnsembleScorer, RiskPolicy};
use mailscreen_training::{ColumnOverrides, HistoryStore, Ingestor, TrainOptions, Trainer};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mailscreen")]
#[command(about = "Phishing email dataset memory and scoring engine", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cache incoming datasets into the history store without retraining
    Ingest {
        /// Data directory containing `incoming/` and `history/`
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Alternate history store location
        #[arg(long)]
        history: Option<PathBuf>,

        /// Preferred text column name
        #[arg(long)]
        text_col: Option<String>,

        /// Preferred label column name
        #[arg(long)]
        label_col: Option<String>,
    },

    /// Ingest any incoming datasets, then retrain on the full history
    Train {
        /// Data directory containing `incoming/` and `history/`
        #[arg(short, long, default_value = "data")]
        data_dir: PathBuf,

        /// Alternate history store location
        #[arg(long)]
        history: Option<PathBuf>,

        /// Output directory for `model.json` and `metadata.json`
        #[arg(short, long, default_value = "models")]
        out: PathBuf,

        /// Preferred text column name
        #[arg(long)]
        text_col: Option<String>,

        /// Preferred label column name
        #[arg(long)]
        label_col: Option<String>,
    },

    /// Score one email against a trained model
    Score {
        /// Path to the trained model bundle
        #[arg(short, long, default_value = "models/model.json")]
        model: PathBuf,

        /// Risk policy YAML; defaults are used when omitted
        #[arg(long)]
        policy: Option<PathBuf>,

        /// Raw email text to classify
        #[arg(long)]
        text: Option<String>,

        /// Path to an email file (.txt, .eml, .html)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Sender address, when known
        #[arg(long)]
        sender: Option<String>,

        /// Subject line, scored together with the body
        #[arg(long)]
        subject: Option<String>,

        /// Whether the email carries an attachment
        #[arg(long)]
        attachment: bool,

        /// Emit the full score report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Ingest {
            data_dir,
            history,
            text_col,
            label_col,
        } => run_ingest(&data_dir, history, overrides(text_col, label_col)),
        Command::Train {
            data_dir,
            history,
            out,
            text_col,
            label_col,
        } => run_train(&data_dir, history, &out, overrides(text_col, label_col)),
        Command::Score {
            model,
            policy,
            text,
            file,
            sender,
            subject,
            attachment,
            json,
        } => run_score(
            &model,
            policy.as_deref(),
            text,
            file,
            sender,
            subject,
            attachment,
            json,
        ),
    }
}

fn overrides(text: Option<String>, label: Option<String>) -> ColumnOverrides {
    ColumnOverrides { text, label }
}

fn history_root(data_dir: &Path, history: Option<PathBuf>) -> PathBuf {
    history.unwrap_or_else(|| data_dir.join("history"))
}

fn run_ingest(data_dir: &Path, history: Option<PathBuf>, columns: ColumnOverrides) -> Result<()> {
    let incoming = data_dir.join("incoming");
    if !incoming.is_dir() {
        bail!("incoming directory not found: {}", incoming.display());
    }
    let store = HistoryStore::open(history_root(data_dir, history))?;

    let report = Ingestor::new(columns).ingest(&store, &incoming)?;
    println!("Datasets cached : {}", report.added.len());
    println!("Duplicates      : {}", report.skipped_duplicates);
    println!("Rejected        : {}", report.rejected);
    for entry in &report.added {
        println!(
            "  + {} ({} rows, hash {})",
            entry.source_name,
            entry.row_count,
            &entry.content_hash[..16]
        );
    }
    Ok(())
}

fn run_train(
    data_dir: &Path,
    history: Option<PathBuf>,
    out: &Path,
    columns: ColumnOverrides,
) -> Result<()> {
    let store = HistoryStore::open(history_root(data_dir, history))?;

    let incoming = data_dir.join("incoming");
    if incoming.is_dir() {
        let report = Ingestor::new(columns.clone()).ingest(&store, &incoming)?;
        info!(
            added = report.added.len(),
            skipped = report.skipped_duplicates,
            "incoming datasets cached"
        );
    }

    let mut options = TrainOptions::new(out);
    options.columns = columns;
    let report = Trainer.train(&store, &options)?;

    println!("==============================");
    println!(" Model training completed");
    println!("==============================");
    println!("Datasets used : {}", report.dataset_count);
    println!("Samples used  : {}", report.sample_count);
    println!(
        "Label balance : {} phishing / {} legitimate",
        report.phishing_count, report.legitimate_count
    );
    if report.dropped_rows > 0 {
        println!("Rows dropped  : {}", report.dropped_rows);
    }
    if report.excluded_datasets > 0 {
        println!("Excluded sets : {}", report.excluded_datasets);
    }
    println!("Threshold     : {:.2}", report.threshold);
    println!(
        "Held-out      : accuracy {:.3}, precision {:.3}, recall {:.3}, F1 {:.3}",
        report.metrics.accuracy, report.metrics.precision, report.metrics.recall, report.metrics.f1
    );
    println!("Artifact      : {}", report.artifact_path.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_score(
    model: &Path,
    policy: Option<&Path>,
    text: Option<String>,
    file: Option<PathBuf>,
    sender: Option<String>,
    subject: Option<String>,
    attachment: bool,
    json: bool,
) -> Result<()> {
    let raw_text = match (text, file) {
        (Some(_), Some(_)) => bail!("use only one of --text or --file"),
        (None, None) => bail!("provide either --text or --file"),
        (Some(text), None) => text,
        (None, Some(path)) => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("cannot read email file {}", path.display()))?;
            String::from_utf8_lossy(&bytes).into_owned()
        }
    };

    let artifact = ModelArtifact::load(model)
        .with_context(|| format!("cannot load model {}", model.display()))?;
    let policy = match policy {
        Some(path) => RiskPolicy::from_file(path)?,
        None => RiskPolicy::default(),
    };
    let scorer = EnsembleScorer::new(Arc::new(artifact), policy);

    let metadata = EmailMetadata {
        sender,
        subject,
        has_attachment: attachment,
    };
    let report = scorer.score(&raw_text, &metadata)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("====================================");
    println!(" Email Classification Result");
    println!("------------------------------------");
    println!("Tier        : {}", report.tier);
    println!(
        "Prediction  : {}",
        if report.is_phishing { "PHISHING" } else { "LEGITIMATE" }
    );
    println!("Ensemble    : {:.2} %", report.ensemble_score * 100.0);
    println!("Model proba : {:.2} %", report.model_probability * 100.0);
    println!("Threshold   : {:.2}", report.threshold);
    println!(
        "Signals     : urgency {:.2}, links {:.2}, domain {:.2}, discount x{:.2}",
        report.signals.urgent_risk,
        report.signals.link_risk,
        report.signals.domain_risk,
        report.signals.trust_discount
    );
    println!("====================================");
    Ok(())
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("mailscreen=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mailscreen=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
