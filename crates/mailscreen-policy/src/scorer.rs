//! Multi-signal ensemble scorer
//!
//! Blends the classifier probability with the rule-driven urgency, link,
//! and domain risks, applies the trusted-sender discount, and tiers the
//! result. Scoring is pure over an immutable artifact snapshot, so a
//! scorer can be shared freely across threads.

use crate::config::RiskPolicy;
use mailscreen_core::{text, EmailMetadata, Error, Result, ScoreReport, SignalBreakdown, Tier};
use mailscreen_features::{ModelArtifact, UrgentMatcher};
use std::sync::Arc;
use tracing::debug;

/// Scores emails against one artifact snapshot and one policy
#[derive(Debug, Clone)]
pub struct EnsembleScorer {
    artifact: Arc<ModelArtifact>,
    policy: RiskPolicy,
    urgent: UrgentMatcher,
}

impl EnsembleScorer {
    /// Build a scorer over an artifact snapshot and a policy.
    ///
    /// The rule-side urgent risk matches against the policy's keyword
    /// list, so editing the policy changes scoring without retraining;
    /// the matcher frozen inside the artifact still drives the model's
    /// own urgency feature.
    pub fn new(artifact: Arc<ModelArtifact>, policy: RiskPolicy) -> Self {
        let urgent = UrgentMatcher::new(policy.urgent_keywords.clone());
        Self {
            artifact,
            policy,
            urgent,
        }
    }

    /// The policy this scorer applies
    pub fn policy(&self) -> &RiskPolicy {
        &self.policy
    }

    /// The artifact snapshot this scorer reads from
    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    /// Score one email.
    ///
    /// Returns an error for empty or whitespace-only text; every other
    /// input produces a verdict.
    pub fn score(&self, raw_text: &str, metadata: &EmailMetadata) -> Result<ScoreReport> {
        if raw_text.trim().is_empty() {
            return Err(Error::inference_input("email text is empty"));
        }

        let record = self.artifact.extractor.transform(raw_text, metadata)?;
        let encoded = self.artifact.extractor.encode(&record);
        let model_probability = self.artifact.classifier.predict_proba(&encoded);

        let urgent_matched = self.urgent.is_match(raw_text)?
            || match metadata.subject.as_deref() {
                Some(subject) => self.urgent.is_match(subject)?,
                None => false,
            };
        let urgent_risk = f64::from(u8::from(urgent_matched));
        let link_risk = self.policy.link_risk(record.signals.links_count);
        let domain_risk = self.policy.domain_risk(&record.sender_domain);

        let weights = &self.policy.weights;
        let blended = model_probability * weights.model
            + urgent_risk * weights.urgency
            + link_risk * weights.links
            + domain_risk * weights.domain;

        let trust_discount = self.trust_discount(raw_text, &record.sender_domain);
        let ensemble_score = (blended * trust_discount).clamp(0.0, 1.0);

        let threshold = self.artifact.threshold;
        let tier = Tier::from_score(ensemble_score, threshold, self.policy.phishing_cutoff);
        let is_phishing = ensemble_score >= threshold;

        debug!(
            model_probability,
            ensemble_score,
            %tier,
            domain = %record.sender_domain,
            "email scored"
        );

        Ok(ScoreReport {
            prediction: u8::from(is_phishing),
            is_phishing,
            model_probability,
            ensemble_score,
            threshold,
            tier,
            signals: SignalBreakdown {
                urgent_risk,
                link_risk,
                domain_risk,
                trust_discount,
            },
        })
    }

    /// Score a batch of emails in order
    pub fn score_batch<'a, I>(&self, inputs: I) -> Result<Vec<ScoreReport>>
    where
        I: IntoIterator<Item = (&'a str, &'a EmailMetadata)>,
    {
        inputs
            .into_iter()
            .map(|(text, metadata)| self.score(text, metadata))
            .collect()
    }

    /// The multiplier earned by a trusted sender: the stronger discount
    /// applies only when at least one link was detected and every link
    /// domain is trusted too. The two discounts never stack.
    fn trust_discount(&self, raw_text: &str, sender_domain: &str) -> f64 {
        if !self.policy.is_trusted(sender_domain) {
            return 1.0;
        }

        let link_domains = text::extract_link_domains(raw_text);
        let all_links_trusted =
            !link_domains.is_empty() && link_domains.iter().all(|d| self.policy.is_trusted(d));

        if all_links_trusted {
            self.policy.discounts.trusted_sender_and_links
        } else {
            self.policy.discounts.trusted_sender
        }
    }
}
