//! Content-addressed history store
//!
//! Every dataset ever supplied is cached under its content hash and is
//! never rewritten or deleted; retraining always reloads the full set.
//! The hash covers the normalized row set rather than raw bytes, so the
//! same rows re-exported with a different delimiter or as a spreadsheet
//! deduplicate to one cached dataset.
//!
//! On disk each dataset is a `dataset_<hash16>.csv` payload plus a
//! `dataset_<hash16>.json` entry. The payload is renamed into place before
//! its entry is written, so an entry's presence means its payload is
//! complete.

use crate::table::TableData;
use chrono::{DateTime, Utc};
use mailscreen_core::{Error, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const ENTRY_EXTENSION: &str = "json";
const PAYLOAD_EXTENSION: &str = "csv";

/// Append-only record describing one cached dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedDatasetEntry {
    /// Full hex SHA-256 of the normalized row set
    pub content_hash: String,

    /// File name the dataset first arrived under
    pub source_name: String,

    /// When the dataset was first cached
    pub ingested_at: DateTime<Utc>,

    /// Number of data rows (header excluded)
    pub row_count: usize,
}

impl CachedDatasetEntry {
    fn stem(&self) -> String {
        dataset_stem(&self.content_hash)
    }
}

fn dataset_stem(content_hash: &str) -> String {
    format!("dataset_{}", &content_hash[..16])
}

/// Hash the normalized row set: trimmed cells joined by a unit separator,
/// rows joined by newlines, header row included
pub fn content_hash(table: &TableData) -> String {
    let mut hasher = Sha256::new();

    let mut feed = |cells: &[String]| {
        for (i, cell) in cells.iter().enumerate() {
            if i > 0 {
                hasher.update([0x1f]);
            }
            hasher.update(cell.trim().as_bytes());
        }
        hasher.update([b'\n']);
    };

    feed(&table.headers);
    for row in &table.rows {
        feed(row);
    }

    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Directory-backed dataset cache
#[derive(Debug, Clone)]
pub struct HistoryStore {
    root: PathBuf,
}

impl HistoryStore {
    /// Open (creating if needed) a store at the given directory
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// The store's directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether a dataset with this content hash is already cached
    pub fn contains(&self, content_hash: &str) -> bool {
        self.root
            .join(dataset_stem(content_hash))
            .with_extension(ENTRY_EXTENSION)
            .exists()
    }

    /// Cache a dataset. The payload lands before the entry; a crash in
    /// between leaves an orphaned payload, never a dangling entry.
    pub fn insert(
        &self,
        table: &TableData,
        source_name: impl Into<String>,
    ) -> Result<CachedDatasetEntry> {
        let entry = CachedDatasetEntry {
            content_hash: content_hash(table),
            source_name: source_name.into(),
            ingested_at: Utc::now(),
            row_count: table.rows.len(),
        };

        if self.contains(&entry.content_hash) {
            return Err(Error::data_quality(format!(
                "dataset {} is already cached",
                entry.content_hash
            )));
        }

        self.write_atomic(
            &self.root.join(entry.stem()).with_extension(PAYLOAD_EXTENSION),
            &encode_payload(table)?,
        )?;
        self.write_atomic(
            &self.root.join(entry.stem()).with_extension(ENTRY_EXTENSION),
            &serde_json::to_vec_pretty(&entry)?,
        )?;

        info!(
            hash = %&entry.content_hash[..16],
            source = %entry.source_name,
            rows = entry.row_count,
            "dataset cached"
        );
        Ok(entry)
    }

    /// All cached entries, ordered by content hash for determinism
    pub fn entries(&self) -> Result<Vec<CachedDatasetEntry>> {
        let mut entries = Vec::new();
        for dir_entry in fs::read_dir(&self.root)? {
            let path = dir_entry?.path();
            let is_entry = path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION)
                && path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .is_some_and(|s| s.starts_with("dataset_"));
            if !is_entry {
                continue;
            }
            let bytes = fs::read(&path)?;
            let entry: CachedDatasetEntry = serde_json::from_slice(&bytes).map_err(|e| {
                Error::artifact(format!("corrupt store entry {}: {e}", path.display()))
            })?;
            if entry.content_hash.len() < 16 || !entry.content_hash.is_ascii() {
                return Err(Error::artifact(format!(
                    "corrupt store entry {}: bad content hash {:?}",
                    path.display(),
                    entry.content_hash
                )));
            }
            entries.push(entry);
        }
        entries.sort_by(|a, b| a.content_hash.cmp(&b.content_hash));
        debug!(datasets = entries.len(), "history store scanned");
        Ok(entries)
    }

    /// Load the cached payload for an entry
    pub fn load_payload(&self, entry: &CachedDatasetEntry) -> Result<TableData> {
        let path = self.root.join(entry.stem()).with_extension(PAYLOAD_EXTENSION);
        crate::table::read_table(&path)
    }

    fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, bytes)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn encode_payload(table: &TableData) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(&table.headers)
        .map_err(|e| Error::data_quality(format!("cannot encode payload header: {e}")))?;
    for row in &table.rows {
        writer
            .write_record(row)
            .map_err(|e| Error::data_quality(format!("cannot encode payload row: {e}")))?;
    }
    writer
        .into_inner()
        .map_err(|e| Error::data_quality(format!("cannot flush payload: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn table() -> TableData {
        TableData {
            headers: vec!["text".into(), "label".into()],
            rows: vec![
                vec!["hello there".into(), "0".into()],
                vec!["urgent verify now".into(), "1".into()],
            ],
        }
    }

    #[test]
    fn test_hash_ignores_cell_whitespace() {
        let a = table();
        let mut b = table();
        b.rows[0][0] = "  hello there ".into();
        assert_eq!(content_hash(&a), content_hash(&b));
    }

    #[test]
    fn test_hash_covers_header_and_order() {
        let a = table();
        let mut renamed = table();
        renamed.headers[0] = "body".into();
        assert_ne!(content_hash(&a), content_hash(&renamed));

        let mut reordered = table();
        reordered.rows.swap(0, 1);
        assert_ne!(content_hash(&a), content_hash(&reordered));
    }

    #[test]
    fn test_insert_and_reload_round_trip() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();

        let entry = store.insert(&table(), "sample.csv").unwrap();
        assert_eq!(entry.row_count, 2);
        assert!(store.contains(&entry.content_hash));

        let entries = store.entries().unwrap();
        assert_eq!(entries, vec![entry.clone()]);

        let payload = store.load_payload(&entry).unwrap();
        assert_eq!(payload, table());
    }

    #[test]
    fn test_double_insert_is_rejected() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        store.insert(&table(), "sample.csv").unwrap();
        assert!(store.insert(&table(), "copy.csv").is_err());
    }

    #[test]
    fn test_truncated_hash_in_entry_is_an_error() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        std::fs::write(
            dir.path().join("dataset_abc.json"),
            r#"{"content_hash":"abc","source_name":"x.csv","ingested_at":"2026-01-01T00:00:00Z","row_count":1}"#,
        )
        .unwrap();

        assert!(matches!(store.entries(), Err(Error::Artifact(_))));
    }

    #[test]
    fn test_no_temp_files_remain() {
        let dir = tempdir().unwrap();
        let store = HistoryStore::open(dir.path()).unwrap();
        store.insert(&table(), "sample.csv").unwrap();

        let leftover: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftover.is_empty());
    }
}
