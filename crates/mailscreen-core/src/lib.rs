//! Mailscreen Core
//!
//! Core types, text normalization, and error handling shared across the
//! Mailscreen phishing detection engine.
//!
//! This crate provides:
//! - The data model for feature records, labeled examples, and score reports
//! - The error taxonomy and result handling
//! - The pure Text Normalizer and deterministic text statistics

pub mod error;
pub mod text;
pub mod types;

pub use error::{Error, Result};
pub use types::{
    EmailMetadata, FeatureRecord, LabeledRecord, NumericSignals, ScoreReport, SignalBreakdown,
    SparseVector, Tier, UNKNOWN_DOMAIN,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::types::{
        EmailMetadata, FeatureRecord, LabeledRecord, NumericSignals, ScoreReport, SignalBreakdown,
        SparseVector, Tier, UNKNOWN_DOMAIN,
    };
}
