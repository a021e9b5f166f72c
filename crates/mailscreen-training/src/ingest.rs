//! Dataset ingestion
//!
//! Scans a directory of incoming tabular files and caches every dataset
//! not already present in the history store. Malformed files are warned
//! about and skipped; one bad file never aborts the batch.

use crate::store::{content_hash, CachedDatasetEntry, HistoryStore};
use crate::table::{read_table, resolve_columns, ColumnOverrides};
use mailscreen_core::Result;
use std::path::Path;
use tracing::{info, warn};

const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv", "txt", "xlsx"];

/// Outcome of one ingestion pass
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    /// Datasets newly cached, in the order they were processed
    pub added: Vec<CachedDatasetEntry>,

    /// Files whose content was already cached
    pub skipped_duplicates: usize,

    /// Files that could not be read or resolved
    pub rejected: usize,
}

/// Scans incoming files into a history store
#[derive(Debug, Clone, Default)]
pub struct Ingestor {
    overrides: ColumnOverrides,
}

impl Ingestor {
    /// Ingestor with explicit column overrides
    pub fn new(overrides: ColumnOverrides) -> Self {
        Self { overrides }
    }

    /// Cache every supported file under `incoming` that the store has not
    /// seen. Files are visited in name order so reports are reproducible.
    pub fn ingest(&self, store: &HistoryStore, incoming: impl AsRef<Path>) -> Result<IngestReport> {
        let incoming = incoming.as_ref();
        let mut paths: Vec<_> = std::fs::read_dir(incoming)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .and_then(|e| e.to_str())
                        .map(str::to_lowercase)
                        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
            })
            .collect();
        paths.sort();

        let mut report = IngestReport::default();
        for path in paths {
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("<unnamed>")
                .to_string();

            let table = match read_table(&path) {
                Ok(table) => table,
                Err(e) => {
                    warn!(file = %name, error = %e, "skipping unreadable dataset");
                    report.rejected += 1;
                    continue;
                }
            };

            // Validate the layout up front so training never meets an
            // unresolvable cached dataset
            if let Err(e) = resolve_columns(&table, &self.overrides) {
                warn!(file = %name, error = %e, "skipping dataset with unresolvable columns");
                report.rejected += 1;
                continue;
            }

            let hash = content_hash(&table);
            if store.contains(&hash) {
                info!(file = %name, hash = %&hash[..16], "dataset already cached");
                report.skipped_duplicates += 1;
                continue;
            }

            report.added.push(store.insert(&table, name)?);
        }

        info!(
            added = report.added.len(),
            skipped = report.skipped_duplicates,
            rejected = report.rejected,
            "ingestion pass complete"
        );
        Ok(report)
    }
}
