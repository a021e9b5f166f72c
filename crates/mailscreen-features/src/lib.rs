//! Feature extraction and statistical classification for Mailscreen
//!
//! This crate turns raw email text into a deterministic feature encoding
//! (TF-IDF over word unigrams and bigrams, scaled numeric signals, one-hot
//! sender domain) and fits a logistic regression over it. The fitted
//! transform and classifier are bundled into an immutable [`ModelArtifact`]
//! that persists atomically and reloads as a reference-counted snapshot.

pub mod artifact;
pub mod domains;
pub mod extractor;
pub mod model;
pub mod scaler;
pub mod signals;
pub mod vectorizer;

pub use artifact::{HeldOutMetrics, ModelArtifact, ModelHandle, TrainingMetadata};
pub use domains::FittedDomainEncoder;
pub use extractor::{ExtractorConfig, FeatureExtractor, FittedExtractor};
pub use model::{LogisticRegression, TrainConfig};
pub use scaler::FittedScaler;
pub use signals::{compute_signals, UrgentMatcher, DEFAULT_URGENT_KEYWORDS};
pub use vectorizer::{FittedVectorizer, TfidfVectorizer};

/// Commonly used types
pub mod prelude {
    pub use crate::artifact::{ModelArtifact, ModelHandle, TrainingMetadata};
    pub use crate::extractor::{FeatureExtractor, FittedExtractor};
    pub use crate::model::{LogisticRegression, TrainConfig};
    pub use crate::signals::{compute_signals, UrgentMatcher};
}
