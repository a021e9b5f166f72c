//! One-hot encoding of the sender domain

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Frozen domain-to-column mapping, fitted once during training.
///
/// Domains unseen at fit time encode as the all-zero row, so inference
/// never fails on a new domain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedDomainEncoder {
    index: BTreeMap<String, u32>,
}

impl FittedDomainEncoder {
    /// Fit over the training sender domains, indexing distinct values in
    /// sorted order for determinism
    pub fn fit<S: AsRef<str>>(domains: &[S]) -> Self {
        let mut index = BTreeMap::new();
        let mut sorted: Vec<&str> = domains.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();
        sorted.dedup();
        for (position, domain) in sorted.into_iter().enumerate() {
            index.insert(domain.to_string(), position as u32);
        }
        Self { index }
    }

    /// Column for a domain, or `None` for the unknown (all-zero) encoding
    pub fn column(&self, domain: &str) -> Option<u32> {
        self.index.get(domain).copied()
    }

    /// Number of one-hot columns
    pub fn width(&self) -> usize {
        self.index.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoder_indexes_sorted_distinct_domains() {
        let encoder = FittedDomainEncoder::fit(&["zeta.com", "alpha.com", "zeta.com", "unknown"]);
        assert_eq!(encoder.width(), 3);
        assert_eq!(encoder.column("alpha.com"), Some(0));
        assert_eq!(encoder.column("unknown"), Some(1));
        assert_eq!(encoder.column("zeta.com"), Some(2));
    }

    #[test]
    fn test_unseen_domain_maps_to_none() {
        let encoder = FittedDomainEncoder::fit(&["example.com"]);
        assert_eq!(encoder.column("brand-new.io"), None);
    }
}
