//! Mailscreen dataset memory and training
//!
//! The history store is a content-addressed, append-only cache of every
//! dataset ever supplied. Ingestion deduplicates by a hash over the
//! normalized row set; training always reloads the full cache, normalizes
//! labels against a fixed vocabulary, fits the model from scratch, and
//! calibrates the decision threshold on a held-out split before persisting
//! the artifact atomically.

pub mod corpus;
pub mod ingest;
pub mod metrics;
pub mod split;
pub mod store;
pub mod table;
pub mod trainer;

pub use corpus::{build_corpus, normalize_label, CorpusStats};
pub use ingest::{IngestReport, Ingestor};
pub use metrics::{calibrate_threshold, Confusion};
pub use split::stratified_split;
pub use store::{content_hash, CachedDatasetEntry, HistoryStore};
pub use table::{read_table, resolve_columns, ColumnOverrides, TableData};
pub use trainer::{TrainOptions, Trainer, TrainingReport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ingest::{IngestReport, Ingestor};
    pub use crate::store::{CachedDatasetEntry, HistoryStore};
    pub use crate::table::ColumnOverrides;
    pub use crate::trainer::{TrainOptions, Trainer, TrainingReport};
}
