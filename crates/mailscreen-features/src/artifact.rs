//! Model artifact bundle: frozen transform, classifier, threshold, metadata
//!
//! An artifact is immutable once produced. Persistence is all-or-nothing:
//! the bundle is written to a temporary file and renamed into place, so a
//! failed training run can never leave a half-written artifact behind.

use crate::extractor::FittedExtractor;
use crate::model::LogisticRegression;
use mailscreen_core::{EmailMetadata, Error, Result};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Held-out evaluation metrics at the calibrated threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeldOutMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Metadata describing one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetadata {
    /// Distinct cached datasets the corpus was built from
    pub dataset_count: usize,

    /// Labeled rows in the corpus after label normalization
    pub sample_count: usize,

    /// Rows labeled phishing
    pub phishing_count: usize,

    /// Rows labeled legitimate
    pub legitimate_count: usize,

    /// Held-out metrics at the chosen threshold
    pub metrics: HeldOutMetrics,

    /// RFC 3339 timestamp of the training run
    pub trained_at: String,

    /// Engine version that produced the artifact
    pub version: String,
}

impl TrainingMetadata {
    /// Metadata for a run that just finished
    pub fn new(
        dataset_count: usize,
        sample_count: usize,
        phishing_count: usize,
        legitimate_count: usize,
        metrics: HeldOutMetrics,
    ) -> Self {
        Self {
            dataset_count,
            sample_count,
            phishing_count,
            legitimate_count,
            metrics,
            trained_at: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// A trained, immutable model bundle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Frozen feature transform
    pub extractor: FittedExtractor,

    /// Fitted classifier
    pub classifier: LogisticRegression,

    /// Calibrated decision threshold
    pub threshold: f64,

    /// Training run metadata
    pub metadata: TrainingMetadata,
}

impl ModelArtifact {
    /// Probability that the given email is phishing
    pub fn predict_proba(&self, raw_text: &str, metadata: &EmailMetadata) -> Result<f64> {
        let record = self.extractor.transform(raw_text, metadata)?;
        Ok(self.classifier.predict_proba(&self.extractor.encode(&record)))
    }

    /// Atomically persist the bundle as JSON.
    ///
    /// The write goes to `<path>.tmp` first and is renamed over the target
    /// only on success, leaving any previous artifact untouched on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp = path.with_extension("json.tmp");
        let bytes = serde_json::to_vec(self)?;
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), threshold = self.threshold, "model artifact saved");
        Ok(())
    }

    /// Load a bundle from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            Error::artifact(format!("cannot read model artifact {}: {e}", path.display()))
        })?;
        let artifact = serde_json::from_slice(&bytes)?;
        Ok(artifact)
    }
}

/// Hot-reloadable handle over the current artifact.
///
/// Each loaded artifact is an immutable, reference-counted snapshot:
/// in-flight scoring keeps the `Arc` it started with while new calls pick
/// up a published replacement.
#[derive(Debug)]
pub struct ModelHandle {
    current: RwLock<Arc<ModelArtifact>>,
}

impl ModelHandle {
    /// Wrap a loaded artifact
    pub fn new(artifact: ModelArtifact) -> Self {
        Self {
            current: RwLock::new(Arc::new(artifact)),
        }
    }

    /// Load the artifact at `path` into a handle
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(ModelArtifact::load(path)?))
    }

    /// Snapshot of the current artifact
    pub fn snapshot(&self) -> Arc<ModelArtifact> {
        Arc::clone(&self.current.read())
    }

    /// Publish a new artifact; callers holding older snapshots finish
    /// against the version they started with
    pub fn publish(&self, artifact: ModelArtifact) {
        *self.current.write() = Arc::new(artifact);
    }
}
