//! Corpus assembly: cached datasets to labeled records
//!
//! Labels normalize against a fixed vocabulary; rows whose labels fall
//! outside it are dropped with a warning rather than guessed at.

use crate::store::HistoryStore;
use crate::table::{resolve_columns, row_text, ColumnOverrides};
use mailscreen_core::{text, LabeledRecord, Result, UNKNOWN_DOMAIN};
use mailscreen_features::{compute_signals, UrgentMatcher};
use tracing::{info, warn};

const PHISHING_LABELS: &[&str] = &[
    "phishing", "phising", "spam", "scam", "malicious", "fraud", "attack", "1", "1.0", "true",
    "yes",
];

const LEGITIMATE_LABELS: &[&str] = &[
    "legitimate", "legit", "benign", "ham", "normal", "safe", "clean", "0", "0.0", "false", "no",
];

/// Map a raw label value to binary: 1 = phishing, 0 = legitimate.
/// Values outside the fixed vocabulary return `None`.
pub fn normalize_label(value: &str) -> Option<u8> {
    let v = value.trim().to_lowercase();
    if PHISHING_LABELS.contains(&v.as_str()) {
        Some(1)
    } else if LEGITIMATE_LABELS.contains(&v.as_str()) {
        Some(0)
    } else {
        None
    }
}

/// What the corpus was built from
#[derive(Debug, Clone, Default)]
pub struct CorpusStats {
    /// Cached datasets that contributed rows
    pub dataset_count: usize,

    /// Cached datasets excluded for unresolvable columns
    pub excluded_datasets: usize,

    /// Rows dropped for empty text or unmappable labels
    pub dropped_rows: usize,

    /// Rows labeled phishing
    pub phishing_count: usize,

    /// Rows labeled legitimate
    pub legitimate_count: usize,
}

/// Reload every cached dataset and flatten it into labeled records.
///
/// A dataset whose columns cannot be resolved is excluded with a warning;
/// individual rows drop the same way. Nothing here aborts the build.
pub fn build_corpus(
    store: &HistoryStore,
    overrides: &ColumnOverrides,
    urgent: &UrgentMatcher,
) -> Result<(Vec<LabeledRecord>, CorpusStats)> {
    let mut records = Vec::new();
    let mut stats = CorpusStats::default();

    for entry in store.entries()? {
        let table = match store.load_payload(&entry) {
            Ok(table) => table,
            Err(e) => {
                warn!(hash = %&entry.content_hash[..16], error = %e, "excluding unreadable cached dataset");
                stats.excluded_datasets += 1;
                continue;
            }
        };

        let columns = match resolve_columns(&table, overrides) {
            Ok(columns) => columns,
            Err(e) => {
                warn!(hash = %&entry.content_hash[..16], error = %e, "excluding cached dataset");
                stats.excluded_datasets += 1;
                continue;
            }
        };

        let mut dataset_rows = 0usize;
        for row in &table.rows {
            let raw_text = row_text(row, columns.text);
            if raw_text.trim().is_empty() {
                stats.dropped_rows += 1;
                continue;
            }

            let label = match row.get(columns.label).and_then(|v| normalize_label(v)) {
                Some(label) => label,
                None => {
                    stats.dropped_rows += 1;
                    continue;
                }
            };

            let sender_domain = columns
                .sender
                .and_then(|i| row.get(i))
                .and_then(|s| text::extract_sender_domain(s))
                .unwrap_or_else(|| UNKNOWN_DOMAIN.to_string());

            let signals = compute_signals(&raw_text, false, urgent)?;
            records.push(LabeledRecord {
                text: text::normalize_text(&raw_text),
                signals,
                sender_domain,
                label,
            });

            if label == 1 {
                stats.phishing_count += 1;
            } else {
                stats.legitimate_count += 1;
            }
            dataset_rows += 1;
        }

        if dataset_rows > 0 {
            stats.dataset_count += 1;
        }
    }

    if stats.dropped_rows > 0 {
        warn!(dropped = stats.dropped_rows, "rows dropped during corpus build");
    }
    info!(
        datasets = stats.dataset_count,
        samples = records.len(),
        phishing = stats.phishing_count,
        legitimate = stats.legitimate_count,
        "corpus assembled"
    );

    Ok((records, stats))
}
