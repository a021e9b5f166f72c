//! Risk policy definition
//!
//! Every rule-driven constant of the scorer lives here: keyword lists,
//! domain patterns, the link-risk step table, ensemble weights, and trust
//! discounts. Policies are defined in YAML and versioned so a score can
//! always be traced back to the rules that produced it.

use mailscreen_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Domain substrings commonly seen in phishing sender domains
pub const DEFAULT_SUSPICIOUS_PATTERNS: &[&str] = &[
    "secure-",
    "account-",
    "login-",
    "verify-",
    "update-",
    "alert-",
    "billing-",
    "support-",
    "-security",
    "-alert",
    "-verify",
    "-confirm",
    "paypal",
    "amazon",
    "microsoft",
    "apple",
    "google",
    "facebook",
    "bank",
    "netflix",
];

/// Top-level domains with elevated abuse rates
pub const DEFAULT_SUSPICIOUS_TLDS: &[&str] =
    &[".xyz", ".top", ".click", ".link", ".info", ".biz"];

/// Senders whose legitimate domains earn a score discount
pub const DEFAULT_TRUSTED_DOMAINS: &[&str] = &[
    "google.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "paypal.com",
    "linkedin.com",
    "github.com",
    "facebook.com",
    "netflix.com",
];

/// Weights blending the model probability with the rule-driven risks
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnsembleWeights {
    /// Classifier probability
    pub model: f64,

    /// Urgency keyword flag
    pub urgency: f64,

    /// Link count risk
    pub links: f64,

    /// Sender domain risk
    pub domain: f64,
}

impl Default for EnsembleWeights {
    fn default() -> Self {
        Self {
            model: 0.60,
            urgency: 0.15,
            links: 0.15,
            domain: 0.10,
        }
    }
}

/// Multiplicative discounts applied when the sender is trusted
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TrustDiscounts {
    /// Trusted sender domain
    pub trusted_sender: f64,

    /// Trusted sender and every detected link domain trusted too
    pub trusted_sender_and_links: f64,
}

impl Default for TrustDiscounts {
    fn default() -> Self {
        Self {
            trusted_sender: 0.8,
            trusted_sender_and_links: 0.6,
        }
    }
}

/// One step of the link-risk table: link counts up to `up_to` score `risk`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkRiskStep {
    pub up_to: u32,
    pub risk: f64,
}

fn default_link_risk_steps() -> Vec<LinkRiskStep> {
    vec![
        LinkRiskStep { up_to: 0, risk: 0.0 },
        LinkRiskStep { up_to: 1, risk: 0.2 },
        LinkRiskStep { up_to: 3, risk: 0.4 },
        LinkRiskStep { up_to: 5, risk: 0.6 },
    ]
}

fn default_version() -> String {
    "1".to_string()
}

fn default_urgent_keywords() -> Vec<String> {
    mailscreen_features::DEFAULT_URGENT_KEYWORDS
        .iter()
        .map(|k| (*k).to_string())
        .collect()
}

fn default_suspicious_patterns() -> Vec<String> {
    DEFAULT_SUSPICIOUS_PATTERNS.iter().map(|p| (*p).to_string()).collect()
}

fn default_suspicious_tlds() -> Vec<String> {
    DEFAULT_SUSPICIOUS_TLDS.iter().map(|t| (*t).to_string()).collect()
}

fn default_trusted_domains() -> Vec<String> {
    DEFAULT_TRUSTED_DOMAINS.iter().map(|d| (*d).to_string()).collect()
}

fn default_link_risk_ceiling() -> f64 {
    0.8
}

fn default_suspicious_pattern_risk() -> f64 {
    0.8
}

fn default_suspicious_tld_risk() -> f64 {
    0.6
}

fn default_unknown_domain_risk() -> f64 {
    0.3
}

fn default_normal_domain_risk() -> f64 {
    0.1
}

fn default_threshold() -> f64 {
    0.5
}

fn default_phishing_cutoff() -> f64 {
    0.8
}

/// A complete, versioned risk policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPolicy {
    /// Policy version, recorded in every score report's provenance
    #[serde(default = "default_version")]
    pub version: String,

    /// Keyword list driving the rule-side urgent risk; editable without
    /// retraining
    #[serde(default = "default_urgent_keywords")]
    pub urgent_keywords: Vec<String>,

    /// Substrings marking a sender domain as high risk
    #[serde(default = "default_suspicious_patterns")]
    pub suspicious_patterns: Vec<String>,

    /// TLD suffixes marking a sender domain as elevated risk
    #[serde(default = "default_suspicious_tlds")]
    pub suspicious_tlds: Vec<String>,

    /// Domains trusted for the score discount
    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    /// Link-risk step table; counts past the last step score the ceiling
    #[serde(default = "default_link_risk_steps")]
    pub link_risk_steps: Vec<LinkRiskStep>,

    /// Risk for link counts beyond the last step
    #[serde(default = "default_link_risk_ceiling")]
    pub link_risk_ceiling: f64,

    /// Risk when the sender domain matches a suspicious pattern
    #[serde(default = "default_suspicious_pattern_risk")]
    pub suspicious_pattern_risk: f64,

    /// Risk when the sender domain ends with a suspicious TLD
    #[serde(default = "default_suspicious_tld_risk")]
    pub suspicious_tld_risk: f64,

    /// Risk when the sender domain is absent or unresolvable
    #[serde(default = "default_unknown_domain_risk")]
    pub unknown_domain_risk: f64,

    /// Risk for any other domain
    #[serde(default = "default_normal_domain_risk")]
    pub normal_domain_risk: f64,

    /// Ensemble weights
    #[serde(default)]
    pub weights: EnsembleWeights,

    /// Trusted-sender discounts
    #[serde(default)]
    pub discounts: TrustDiscounts,

    /// Decision threshold used when an artifact carries none
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,

    /// Ensemble score at which an email tiers as phishing outright
    #[serde(default = "default_phishing_cutoff")]
    pub phishing_cutoff: f64,
}

impl Default for RiskPolicy {
    fn default() -> Self {
        Self {
            version: default_version(),
            urgent_keywords: default_urgent_keywords(),
            suspicious_patterns: default_suspicious_patterns(),
            suspicious_tlds: default_suspicious_tlds(),
            trusted_domains: default_trusted_domains(),
            link_risk_steps: default_link_risk_steps(),
            link_risk_ceiling: default_link_risk_ceiling(),
            suspicious_pattern_risk: default_suspicious_pattern_risk(),
            suspicious_tld_risk: default_suspicious_tld_risk(),
            unknown_domain_risk: default_unknown_domain_risk(),
            normal_domain_risk: default_normal_domain_risk(),
            weights: EnsembleWeights::default(),
            discounts: TrustDiscounts::default(),
            default_threshold: default_threshold(),
            phishing_cutoff: default_phishing_cutoff(),
        }
    }
}

impl RiskPolicy {
    /// Load a policy from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let policy: Self = serde_yaml::from_str(yaml)
            .map_err(|e| Error::config(format!("invalid risk policy: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy from a file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            Error::config(format!(
                "cannot read risk policy {}: {e}",
                path.as_ref().display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    fn validate(&self) -> Result<()> {
        let weight_sum =
            self.weights.model + self.weights.urgency + self.weights.links + self.weights.domain;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(Error::config(format!(
                "ensemble weights must sum to 1.0, got {weight_sum}"
            )));
        }
        for (name, value) in [
            ("trusted_sender discount", self.discounts.trusted_sender),
            (
                "trusted_sender_and_links discount",
                self.discounts.trusted_sender_and_links,
            ),
            ("default_threshold", self.default_threshold),
            ("phishing_cutoff", self.phishing_cutoff),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::config(format!("{name} must be within [0, 1], got {value}")));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        let policy = RiskPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.weights.model, 0.60);
        assert_eq!(policy.discounts.trusted_sender, 0.8);
        assert_eq!(policy.phishing_cutoff, 0.8);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = r#"
version: "2"
trusted_domains:
  - internal.example.com
"#;
        let policy = RiskPolicy::from_yaml(yaml).unwrap();
        assert_eq!(policy.version, "2");
        assert_eq!(policy.trusted_domains, vec!["internal.example.com".to_string()]);
        assert_eq!(policy.weights.urgency, 0.15);
        assert!(!policy.urgent_keywords.is_empty());
    }

    #[test]
    fn test_unbalanced_weights_rejected() {
        let yaml = r#"
weights:
  model: 0.9
  urgency: 0.9
  links: 0.1
  domain: 0.1
"#;
        let result = RiskPolicy::from_yaml(yaml);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_policy_round_trips_through_yaml() {
        let policy = RiskPolicy::default();
        let yaml = serde_yaml::to_string(&policy).unwrap();
        let restored = RiskPolicy::from_yaml(&yaml).unwrap();
        assert_eq!(restored.suspicious_patterns, policy.suspicious_patterns);
        assert_eq!(restored.link_risk_steps.len(), policy.link_risk_steps.len());
    }
}
