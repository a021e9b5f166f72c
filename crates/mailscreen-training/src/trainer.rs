//! Training orchestration
//!
//! Every run retrains from scratch on the full history store: reload all
//! cached datasets, normalize labels, split, fit, calibrate the threshold
//! on the held-out partition, and atomically persist the artifact bundle.

use crate::corpus::build_corpus;
use crate::metrics::calibrate_threshold;
use crate::split::stratified_split;
use crate::store::HistoryStore;
use crate::table::ColumnOverrides;
use mailscreen_core::{Error, Result};
use mailscreen_features::{
    ExtractorConfig, FeatureExtractor, HeldOutMetrics, LogisticRegression, ModelArtifact,
    TrainConfig, TrainingMetadata, UrgentMatcher,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Knobs for one training run
#[derive(Debug, Clone)]
pub struct TrainOptions {
    /// Column overrides applied to every cached dataset
    pub columns: ColumnOverrides,

    /// Feature extraction settings
    pub extractor: ExtractorConfig,

    /// Classifier hyperparameters
    pub classifier: TrainConfig,

    /// Held-out fraction for the stratified split
    pub test_fraction: f64,

    /// Seed for the stratified split
    pub seed: u64,

    /// Directory receiving `model.json` and `metadata.json`
    pub output_dir: PathBuf,
}

impl TrainOptions {
    /// Defaults with the given output directory
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            columns: ColumnOverrides::default(),
            extractor: ExtractorConfig::default(),
            classifier: TrainConfig::default(),
            test_fraction: 0.2,
            seed: 42,
            output_dir: output_dir.into(),
        }
    }
}

/// Summary of a completed training run
#[derive(Debug, Clone)]
pub struct TrainingReport {
    /// Where the artifact bundle was written
    pub artifact_path: PathBuf,

    /// Calibrated decision threshold
    pub threshold: f64,

    /// Held-out metrics at that threshold
    pub metrics: HeldOutMetrics,

    /// Datasets that contributed rows
    pub dataset_count: usize,

    /// Labeled rows the model was trained and evaluated on
    pub sample_count: usize,

    /// Rows labeled phishing
    pub phishing_count: usize,

    /// Rows labeled legitimate
    pub legitimate_count: usize,

    /// Rows dropped for empty text or unmappable labels
    pub dropped_rows: usize,

    /// Cached datasets excluded for unresolvable columns
    pub excluded_datasets: usize,
}

/// From-scratch trainer over a history store
#[derive(Debug, Clone, Default)]
pub struct Trainer;

impl Trainer {
    /// Train a model on the full accumulated corpus and persist it.
    ///
    /// Fails with `InsufficientData` when the corpus is empty or contains
    /// a single class. A failure at any step leaves a previously persisted
    /// artifact untouched.
    pub fn train(&self, store: &HistoryStore, options: &TrainOptions) -> Result<TrainingReport> {
        let urgent = UrgentMatcher::new(options.extractor.urgent_keywords.clone());
        let (records, stats) = build_corpus(store, &options.columns, &urgent)?;

        if records.is_empty() {
            return Err(Error::insufficient_data(
                "history store holds no usable labeled rows",
            ));
        }
        if stats.phishing_count == 0 || stats.legitimate_count == 0 {
            return Err(Error::insufficient_data(format!(
                "corpus is single-class ({} phishing, {} legitimate)",
                stats.phishing_count, stats.legitimate_count
            )));
        }

        let (train_idx, test_idx) =
            stratified_split(&records, options.test_fraction, options.seed);
        info!(
            train = train_idx.len(),
            held_out = test_idx.len(),
            "corpus split"
        );

        let train_records: Vec<_> = train_idx.iter().map(|&i| records[i].clone()).collect();
        let extractor = FeatureExtractor::new(options.extractor.clone()).fit(&train_records)?;

        let encode = |indices: &[usize]| {
            indices
                .iter()
                .map(|&i| extractor.encode(&extractor.transform_record(&records[i])))
                .collect::<Vec<_>>()
        };
        let train_features = encode(&train_idx);
        let train_labels: Vec<u8> = train_idx.iter().map(|&i| records[i].label).collect();

        let classifier = LogisticRegression::fit(
            &train_features,
            &train_labels,
            extractor.dimension(),
            &options.classifier,
        )?;

        let test_labels: Vec<u8> = test_idx.iter().map(|&i| records[i].label).collect();
        let test_probabilities: Vec<f64> = encode(&test_idx)
            .iter()
            .map(|v| classifier.predict_proba(v))
            .collect();
        let (threshold, metrics) = calibrate_threshold(&test_labels, &test_probabilities);
        info!(threshold, f1 = metrics.f1, "threshold calibrated");

        let metadata = TrainingMetadata::new(
            stats.dataset_count,
            records.len(),
            stats.phishing_count,
            stats.legitimate_count,
            metrics,
        );
        let artifact = ModelArtifact {
            extractor,
            classifier,
            threshold,
            metadata: metadata.clone(),
        };

        let artifact_path = options.output_dir.join("model.json");
        artifact.save(&artifact_path)?;
        write_metadata(&options.output_dir.join("metadata.json"), &metadata)?;

        Ok(TrainingReport {
            artifact_path,
            threshold,
            metrics,
            dataset_count: stats.dataset_count,
            sample_count: records.len(),
            phishing_count: stats.phishing_count,
            legitimate_count: stats.legitimate_count,
            dropped_rows: stats.dropped_rows,
            excluded_datasets: stats.excluded_datasets,
        })
    }
}

fn write_metadata(path: &Path, metadata: &TrainingMetadata) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_vec_pretty(metadata)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
