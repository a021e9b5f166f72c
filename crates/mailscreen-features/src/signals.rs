//! Rule-driven numeric signal computation
//!
//! The urgent keyword list is configuration data (see the policy crate);
//! the matcher built from it is frozen into the fitted extractor so that
//! training and inference always agree on the flag.

use aho_corasick::AhoCorasick;
use mailscreen_core::{text, NumericSignals, Result};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Urgency keywords matched when no explicit list is configured
pub const DEFAULT_URGENT_KEYWORDS: &[&str] = &[
    "urgent",
    "immediately",
    "verify your account",
    "verify your identity",
    "confirm your account",
    "click here",
    "act now",
    "suspended",
    "password expired",
    "within 24 hours",
    "final notice",
    "limited time",
    "security alert",
    "unusual activity",
];

/// Case-insensitive substring matcher over the urgent keyword list.
///
/// The keyword list is serialized; the automaton is rebuilt lazily after
/// deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UrgentMatcher {
    keywords: Vec<String>,

    #[serde(skip)]
    automaton: OnceCell<AhoCorasick>,
}

impl UrgentMatcher {
    /// Build a matcher over the given keywords
    pub fn new(keywords: Vec<String>) -> Self {
        Self {
            keywords,
            automaton: OnceCell::new(),
        }
    }

    /// Matcher over [`DEFAULT_URGENT_KEYWORDS`]
    pub fn with_defaults() -> Self {
        Self::new(DEFAULT_URGENT_KEYWORDS.iter().map(|k| (*k).to_string()).collect())
    }

    fn automaton(&self) -> Result<&AhoCorasick> {
        self.automaton.get_or_try_init(|| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(&self.keywords)
                .map_err(|e| {
                    mailscreen_core::Error::config(format!("invalid urgent keyword list: {e}"))
                })
        })
    }

    /// Whether any keyword occurs in the text
    pub fn is_match(&self, text: &str) -> Result<bool> {
        Ok(self.automaton()?.is_match(text))
    }

    /// The configured keywords
    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Compute the numeric signals for one email body.
///
/// `has_attachment` combines the structured flag with an attachment
/// mention in the body itself.
pub fn compute_signals(
    raw_text: &str,
    has_attachment: bool,
    urgent: &UrgentMatcher,
) -> Result<NumericSignals> {
    let mentions_attachment = {
        let lower = raw_text.to_lowercase();
        lower.contains("attachment") || lower.contains("attached")
    };

    Ok(NumericSignals {
        links_count: text::count_urls(raw_text),
        has_attachment: has_attachment || mentions_attachment,
        urgent_keywords: urgent.is_match(raw_text)?,
        body_length: text::body_length(raw_text),
        exclamation_count: text::exclamation_count(raw_text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgent_matcher_is_case_insensitive() {
        let matcher = UrgentMatcher::with_defaults();
        assert!(matcher.is_match("URGENT: respond now").unwrap());
        assert!(matcher.is_match("please verify your account today").unwrap());
        assert!(!matcher.is_match("see you at the meeting").unwrap());
    }

    #[test]
    fn test_compute_signals() {
        let matcher = UrgentMatcher::with_defaults();
        let text = "Urgent! Verify your account at https://fake.example and http://x.test now!";
        let signals = compute_signals(text, false, &matcher).unwrap();

        assert_eq!(signals.links_count, 2);
        assert!(signals.urgent_keywords);
        assert_eq!(signals.exclamation_count, 2);
        assert!(!signals.has_attachment);
        assert_eq!(signals.body_length, text.chars().count() as u32);
    }

    #[test]
    fn test_attachment_mention_sets_flag() {
        let matcher = UrgentMatcher::with_defaults();
        let signals = compute_signals("invoice attached below", false, &matcher).unwrap();
        assert!(signals.has_attachment);
    }
}
