//! Rule-driven risk lookups over the policy tables

use crate::config::RiskPolicy;
use mailscreen_core::UNKNOWN_DOMAIN;

impl RiskPolicy {
    /// Whether the domain is trusted, either exactly or as a subdomain of a
    /// trusted entry. `mail.linkedin.com` is trusted when `linkedin.com` is;
    /// `linkedin.fake.com` is not.
    pub fn is_trusted(&self, domain: &str) -> bool {
        if domain.is_empty() || domain == UNKNOWN_DOMAIN {
            return false;
        }
        let domain = domain.to_lowercase();
        self.trusted_domains.iter().any(|trusted| {
            domain == *trusted || domain.ends_with(&format!(".{trusted}"))
        })
    }

    /// Categorical risk for the sender domain.
    ///
    /// Precedence: trusted, then suspicious pattern, then suspicious TLD,
    /// then the unknown sentinel, then normal.
    pub fn domain_risk(&self, domain: &str) -> f64 {
        if domain.is_empty() || domain == UNKNOWN_DOMAIN {
            return self.unknown_domain_risk;
        }
        let domain = domain.to_lowercase();

        if self.is_trusted(&domain) {
            return self.normal_domain_risk;
        }
        if self.suspicious_patterns.iter().any(|p| domain.contains(p.as_str())) {
            return self.suspicious_pattern_risk;
        }
        if self.suspicious_tlds.iter().any(|t| domain.ends_with(t.as_str())) {
            return self.suspicious_tld_risk;
        }
        self.normal_domain_risk
    }

    /// Step-table risk for the number of links in the body
    pub fn link_risk(&self, links_count: u32) -> f64 {
        for step in &self.link_risk_steps {
            if links_count <= step.up_to {
                return step.risk;
            }
        }
        self.link_risk_ceiling
    }
}
