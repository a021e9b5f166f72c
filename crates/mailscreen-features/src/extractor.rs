//! Feature extraction: fit once during training, transform many at inference
//!
//! The fit/transform split is structural: [`FeatureExtractor::fit`] consumes
//! nothing but the training corpus and returns a [`FittedExtractor`], and
//! only the fitted form exposes `transform`. Nothing on the fitted form can
//! re-fit, so the vocabulary, scaling statistics, and domain encoding stay
//! stable for the lifetime of an artifact.

use crate::domains::FittedDomainEncoder;
use crate::scaler::FittedScaler;
use crate::signals::{compute_signals, UrgentMatcher};
use crate::vectorizer::{FittedVectorizer, TfidfVectorizer};
use mailscreen_core::{
    text, EmailMetadata, Error, FeatureRecord, LabeledRecord, NumericSignals, Result,
    SparseVector, UNKNOWN_DOMAIN,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Extractor settings, decided before training
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// TF-IDF settings
    pub vectorizer: TfidfVectorizer,

    /// Urgent keyword list to freeze into the fitted extractor
    pub urgent_keywords: Vec<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            vectorizer: TfidfVectorizer::default(),
            urgent_keywords: crate::signals::DEFAULT_URGENT_KEYWORDS
                .iter()
                .map(|k| (*k).to_string())
                .collect(),
        }
    }
}

/// The unfitted extractor; holds configuration only
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: ExtractorConfig,
}

impl FeatureExtractor {
    /// Create an extractor with the given configuration
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Fit the lexical vocabulary, numeric scaling, and domain encoding on
    /// the training corpus, producing the frozen transform.
    pub fn fit(&self, corpus: &[LabeledRecord]) -> Result<FittedExtractor> {
        if corpus.is_empty() {
            return Err(Error::insufficient_data("cannot fit on an empty corpus"));
        }

        let texts: Vec<&str> = corpus.iter().map(|r| r.text.as_str()).collect();
        let vectorizer = self.config.vectorizer.fit(&texts);

        let rows: Vec<[f64; NumericSignals::COLUMNS]> =
            corpus.iter().map(|r| r.signals.as_vector()).collect();
        let scaler = FittedScaler::fit(&rows);

        let domains: Vec<&str> = corpus.iter().map(|r| r.sender_domain.as_str()).collect();
        let domains = FittedDomainEncoder::fit(&domains);

        debug!(
            vocabulary = vectorizer.vocabulary_size(),
            domains = domains.width(),
            samples = corpus.len(),
            "feature extractor fitted"
        );

        Ok(FittedExtractor {
            vectorizer,
            scaler,
            domains,
            urgent: UrgentMatcher::new(self.config.urgent_keywords.clone()),
        })
    }
}

/// The frozen feature transform. Immutable once produced; `transform` is
/// pure and safe to call from any number of threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedExtractor {
    vectorizer: FittedVectorizer,
    scaler: FittedScaler,
    domains: FittedDomainEncoder,
    urgent: UrgentMatcher,
}

impl FittedExtractor {
    /// Derive the feature record for one raw email.
    ///
    /// A subject line in the metadata is concatenated ahead of the body,
    /// matching how subject/body dataset columns are merged at training
    /// time.
    pub fn transform(&self, raw_text: &str, metadata: &EmailMetadata) -> Result<FeatureRecord> {
        let combined = match metadata.subject.as_deref() {
            Some(subject) if !subject.trim().is_empty() => format!("{subject} {raw_text}"),
            _ => raw_text.to_string(),
        };
        let normalized = text::normalize_text(&combined);
        let signals = compute_signals(&combined, metadata.has_attachment, &self.urgent)?;

        let sender_domain = metadata
            .sender
            .as_deref()
            .and_then(text::extract_sender_domain)
            .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string());

        Ok(FeatureRecord {
            lexical: self.vectorizer.transform(&normalized),
            signals,
            sender_domain,
        })
    }

    /// Feature record for an already-normalized training example
    pub fn transform_record(&self, record: &LabeledRecord) -> FeatureRecord {
        FeatureRecord {
            lexical: self.vectorizer.transform(&record.text),
            signals: record.signals,
            sender_domain: record.sender_domain.clone(),
        }
    }

    /// Assemble the full model input: TF-IDF block, then scaled numeric
    /// columns, then the one-hot domain block.
    pub fn encode(&self, record: &FeatureRecord) -> SparseVector {
        let mut vector = record.lexical.clone();

        let base = self.vectorizer.vocabulary_size() as u32;
        let scaled = self.scaler.transform(&record.signals.as_vector());
        for (col, value) in scaled.iter().enumerate() {
            if *value != 0.0 {
                vector.push(base + col as u32, *value);
            }
        }

        let domain_base = base + NumericSignals::COLUMNS as u32;
        if let Some(col) = self.domains.column(&record.sender_domain) {
            vector.push(domain_base + col, 1.0);
        }

        vector
    }

    /// Total width of the encoded feature space
    pub fn dimension(&self) -> usize {
        self.vectorizer.vocabulary_size() + NumericSignals::COLUMNS + self.domains.width()
    }

    /// The frozen urgent keyword matcher
    pub fn urgent_matcher(&self) -> &UrgentMatcher {
        &self.urgent
    }
}
