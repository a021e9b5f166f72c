//! End-to-end pipeline tests: ingest, retrain, score

use mailscreen_core::{EmailMetadata, Tier};
use mailscreen_features::ModelArtifact;
use mailscreen_policy::{EnsembleScorer, RiskPolicy};
use mailscreen_training::{HistoryStore, Ingestor, TrainOptions, Trainer};
use std::path::Path;
use std::sync::Arc;

fn write(dir: &Path, name: &str, content: &str) {
    std::fs::write(dir.join(name), content).unwrap();
}

fn phishing_rows(count: usize, offset: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "urgent security alert verify your account immediately case {},phishing\n",
                i + offset
            )
        })
        .collect()
}

fn legitimate_rows(count: usize, offset: usize) -> String {
    (0..count)
        .map(|i| {
            format!(
                "meeting notes and project schedule for week {},legitimate\n",
                i + offset
            )
        })
        .collect()
}

fn seed_incoming(dir: &Path) {
    let mut csv = String::from("text,label\n");
    csv.push_str(&phishing_rows(12, 0));
    csv.push_str(&legitimate_rows(12, 0));
    write(dir, "batch_one.csv", &csv);
}

#[test]
fn ingest_is_idempotent_across_formats() {
    let incoming = tempfile::tempdir().unwrap();
    let history = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(history.path()).unwrap();
    seed_incoming(incoming.path());

    let first = Ingestor::default().ingest(&store, incoming.path()).unwrap();
    assert_eq!(first.added.len(), 1);

    // Same rows again, byte-identical
    let second = Ingestor::default().ingest(&store, incoming.path()).unwrap();
    assert!(second.added.is_empty());
    assert_eq!(second.skipped_duplicates, 1);

    // Same rows re-exported with a different delimiter
    let mut tsv = String::from("text\tlabel\n");
    tsv.push_str(&phishing_rows(12, 0).replace(",phishing", "\tphishing"));
    tsv.push_str(&legitimate_rows(12, 0).replace(",legitimate", "\tlegitimate"));
    write(incoming.path(), "reexport.tsv", &tsv);

    let third = Ingestor::default().ingest(&store, incoming.path()).unwrap();
    assert!(third.added.is_empty());
    assert_eq!(third.skipped_duplicates, 2);
    assert_eq!(store.entries().unwrap().len(), 1);
}

#[test]
fn memory_is_monotonic_across_batches() {
    let incoming = tempfile::tempdir().unwrap();
    let history = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(history.path()).unwrap();

    seed_incoming(incoming.path());
    Ingestor::default().ingest(&store, incoming.path()).unwrap();
    let first = Trainer
        .train(&store, &TrainOptions::new(output.path()))
        .unwrap();
    assert_eq!(first.dataset_count, 1);
    assert_eq!(first.sample_count, 24);

    // A later batch arrives; the earlier dataset still participates even
    // though its file is gone from incoming
    for file in std::fs::read_dir(incoming.path()).unwrap() {
        std::fs::remove_file(file.unwrap().path()).unwrap();
    }
    let mut csv = String::from("text,label\n");
    csv.push_str(&phishing_rows(6, 100));
    csv.push_str(&legitimate_rows(6, 100));
    write(incoming.path(), "batch_two.csv", &csv);
    Ingestor::default().ingest(&store, incoming.path()).unwrap();

    let second = Trainer
        .train(&store, &TrainOptions::new(output.path()))
        .unwrap();
    assert_eq!(second.dataset_count, 2);
    assert_eq!(second.sample_count, 36);
}

#[test]
fn duplicate_datasets_never_inflate_the_sample_count() {
    let incoming = tempfile::tempdir().unwrap();
    let history = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(history.path()).unwrap();

    seed_incoming(incoming.path());
    Ingestor::default().ingest(&store, incoming.path()).unwrap();

    // The same dataset under a new name
    let mut csv = String::from("text,label\n");
    csv.push_str(&phishing_rows(12, 0));
    csv.push_str(&legitimate_rows(12, 0));
    write(incoming.path(), "renamed_copy.csv", &csv);
    Ingestor::default().ingest(&store, incoming.path()).unwrap();

    let report = Trainer
        .train(&store, &TrainOptions::new(output.path()))
        .unwrap();
    assert_eq!(report.dataset_count, 1);
    assert_eq!(report.sample_count, 24);
}

#[test]
fn retraining_is_deterministic() {
    let incoming = tempfile::tempdir().unwrap();
    let history = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(history.path()).unwrap();
    seed_incoming(incoming.path());
    Ingestor::default().ingest(&store, incoming.path()).unwrap();

    let out_a = tempfile::tempdir().unwrap();
    let out_b = tempfile::tempdir().unwrap();
    let a = Trainer.train(&store, &TrainOptions::new(out_a.path())).unwrap();
    let b = Trainer.train(&store, &TrainOptions::new(out_b.path())).unwrap();

    assert_eq!(a.threshold, b.threshold);
    assert_eq!(a.metrics, b.metrics);

    let artifact_a = ModelArtifact::load(&a.artifact_path).unwrap();
    let artifact_b = ModelArtifact::load(&b.artifact_path).unwrap();
    let metadata = EmailMetadata::default();
    let text = "urgent security alert verify your account immediately";
    assert_eq!(
        artifact_a.predict_proba(text, &metadata).unwrap(),
        artifact_b.predict_proba(text, &metadata).unwrap()
    );
}

#[test]
fn trained_scorer_separates_benign_from_phishing() {
    let incoming = tempfile::tempdir().unwrap();
    let history = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let store = HistoryStore::open(history.path()).unwrap();
    seed_incoming(incoming.path());
    Ingestor::default().ingest(&store, incoming.path()).unwrap();

    let report = Trainer
        .train(&store, &TrainOptions::new(output.path()))
        .unwrap();
    let artifact = ModelArtifact::load(&report.artifact_path).unwrap();
    let scorer = EnsembleScorer::new(Arc::new(artifact), RiskPolicy::default());

    let benign = scorer
        .score(
            "meeting notes and project schedule for next week, see agenda",
            &EmailMetadata::with_sender("colleague@example.org"),
        )
        .unwrap();
    assert_eq!(benign.tier, Tier::Safe);
    assert!(!benign.is_phishing);

    let phishing = scorer
        .score(
            "URGENT security alert! Verify your account immediately: \
             http://secure-login.xyz/a http://account-verify.top/b \
             http://billing-update.click/c",
            &EmailMetadata::with_sender("alerts@secure-bank.xyz"),
        )
        .unwrap();
    assert!(phishing.is_phishing);
    assert_eq!(phishing.tier, Tier::Phishing);
    assert!(phishing.ensemble_score > benign.ensemble_score);
    assert_eq!(phishing.signals.link_risk, 0.4);
    assert_eq!(phishing.signals.domain_risk, 0.8);
}
