//! Core types for Mailscreen

use serde::{Deserialize, Serialize};

/// Sentinel value used when no sender domain can be resolved
pub const UNKNOWN_DOMAIN: &str = "unknown";

/// Risk tier derived from the ensemble score and two cutoffs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    /// Ensemble score below the trained threshold
    Safe,
    /// Ensemble score at or above the threshold but below the phishing cutoff
    Suspicious,
    /// Ensemble score at or above the phishing cutoff
    Phishing,
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Safe => write!(f, "SAFE"),
            Self::Suspicious => write!(f, "SUSPICIOUS"),
            Self::Phishing => write!(f, "PHISHING"),
        }
    }
}

impl Tier {
    /// Classify an ensemble score against the trained threshold and the
    /// fixed upper cutoff. Boundary scores land in the higher tier.
    pub fn from_score(score: f64, threshold: f64, phishing_cutoff: f64) -> Self {
        if score >= phishing_cutoff {
            Self::Phishing
        } else if score >= threshold {
            Self::Suspicious
        } else {
            Self::Safe
        }
    }
}

/// Optional structured metadata accompanying an email body at inference time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmailMetadata {
    /// Sender address or bare domain, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,

    /// Subject line, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// Whether the email carries an attachment
    #[serde(default)]
    pub has_attachment: bool,
}

impl EmailMetadata {
    /// Metadata with a sender address
    pub fn with_sender(sender: impl Into<String>) -> Self {
        Self {
            sender: Some(sender.into()),
            ..Self::default()
        }
    }
}

/// Sparse feature vector: sorted `(index, value)` pairs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    /// Entries sorted by index, indices unique
    pub entries: Vec<(u32, f64)>,
}

impl SparseVector {
    /// Create an empty vector
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry. Indices must be pushed in ascending order.
    pub fn push(&mut self, index: u32, value: f64) {
        debug_assert!(self.entries.last().map_or(true, |(i, _)| *i < index));
        self.entries.push((index, value));
    }

    /// Number of non-zero entries
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Dot product against a dense weight slice
    pub fn dot(&self, weights: &[f64]) -> f64 {
        self.entries
            .iter()
            .map(|(i, v)| weights.get(*i as usize).copied().unwrap_or(0.0) * v)
            .sum()
    }

    /// L2 norm of the entries
    pub fn norm(&self) -> f64 {
        self.entries
            .iter()
            .map(|(_, v)| v * v)
            .sum::<f64>()
            .sqrt()
    }
}

/// Deterministic numeric signals computed from one email
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumericSignals {
    /// Count of URL-like substrings in the body
    pub links_count: u32,

    /// Whether the email carries (or mentions) an attachment
    pub has_attachment: bool,

    /// Whether any urgent keyword matched the body
    pub urgent_keywords: bool,

    /// Body length in characters, before markup stripping
    pub body_length: u32,

    /// Number of exclamation marks in the body
    pub exclamation_count: u32,
}

impl NumericSignals {
    /// Dense representation in a fixed column order, for scaling
    pub fn as_vector(&self) -> [f64; 5] {
        [
            f64::from(self.links_count),
            f64::from(u8::from(self.has_attachment)),
            f64::from(u8::from(self.urgent_keywords)),
            f64::from(self.body_length),
            f64::from(self.exclamation_count),
        ]
    }

    /// Number of numeric feature columns
    pub const COLUMNS: usize = 5;
}

/// Feature record derived deterministically from one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    /// Sparse term-weighting vector over the frozen vocabulary
    pub lexical: SparseVector,

    /// Numeric signals
    pub signals: NumericSignals,

    /// Sender domain, or [`UNKNOWN_DOMAIN`]
    pub sender_domain: String,
}

/// One labeled training example after label normalization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabeledRecord {
    /// Normalized email text
    pub text: String,

    /// Numeric signals computed from the raw text
    pub signals: NumericSignals,

    /// Sender domain, or [`UNKNOWN_DOMAIN`]
    pub sender_domain: String,

    /// Binary label: 1 = phishing, 0 = legitimate
    pub label: u8,
}

impl LabeledRecord {
    /// Create a record from normalized text and a binary label, with no
    /// structured columns available
    pub fn new(text: impl Into<String>, signals: NumericSignals, label: u8) -> Self {
        Self {
            text: text.into(),
            signals,
            sender_domain: UNKNOWN_DOMAIN.to_string(),
            label,
        }
    }
}

/// Per-signal breakdown of an ensemble score, for explainability
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalBreakdown {
    /// Urgent keyword risk (0 or 1)
    pub urgent_risk: f64,

    /// Link-count risk (step function, 0.0-0.8)
    pub link_risk: f64,

    /// Sender-domain risk (categorical lookup, 0.1-0.8)
    pub domain_risk: f64,

    /// Trusted-sender discount multiplier actually applied (1.0 = none)
    pub trust_discount: f64,
}

/// The engine's verdict for one email
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Binary classification: 1 = phishing, 0 = legitimate
    pub prediction: u8,

    /// Convenience flag, equal to `prediction == 1`
    pub is_phishing: bool,

    /// Raw probability from the statistical classifier
    pub model_probability: f64,

    /// Blended 0-1 risk value after rule signals and trust discount
    pub ensemble_score: f64,

    /// Decision threshold the verdict was made against
    pub threshold: f64,

    /// Risk tier
    pub tier: Tier,

    /// Per-signal contributions
    pub signals: SignalBreakdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_boundaries_land_in_higher_tier() {
        assert_eq!(Tier::from_score(0.49, 0.5, 0.8), Tier::Safe);
        assert_eq!(Tier::from_score(0.5, 0.5, 0.8), Tier::Suspicious);
        assert_eq!(Tier::from_score(0.79, 0.5, 0.8), Tier::Suspicious);
        assert_eq!(Tier::from_score(0.8, 0.5, 0.8), Tier::Phishing);
    }

    #[test]
    fn test_sparse_vector_dot() {
        let mut v = SparseVector::new();
        v.push(0, 1.0);
        v.push(2, 2.0);
        let weights = [0.5, 10.0, 0.25];
        assert!((v.dot(&weights) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_sparse_vector_dot_ignores_out_of_range() {
        let mut v = SparseVector::new();
        v.push(7, 3.0);
        assert_eq!(v.dot(&[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_numeric_signals_vector_order() {
        let signals = NumericSignals {
            links_count: 3,
            has_attachment: true,
            urgent_keywords: false,
            body_length: 120,
            exclamation_count: 2,
        };
        assert_eq!(signals.as_vector(), [3.0, 1.0, 0.0, 120.0, 2.0]);
    }
}
