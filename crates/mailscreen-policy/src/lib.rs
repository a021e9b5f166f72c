//! Mailscreen risk policy and ensemble scoring
//!
//! Rule data lives in a versioned YAML [`RiskPolicy`]: urgency keywords,
//! suspicious domain patterns and TLDs, trusted domains, the link-risk
//! step table, ensemble weights, and trust discounts. The
//! [`EnsembleScorer`] blends those rule signals with the classifier
//! probability from a model artifact and tiers the result.

pub mod config;
pub mod scorer;
pub mod signals;

pub use config::{
    EnsembleWeights, LinkRiskStep, RiskPolicy, TrustDiscounts, DEFAULT_SUSPICIOUS_PATTERNS,
    DEFAULT_SUSPICIOUS_TLDS, DEFAULT_TRUSTED_DOMAINS,
};
pub use scorer::EnsembleScorer;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::config::RiskPolicy;
    pub use crate::scorer::EnsembleScorer;
}
