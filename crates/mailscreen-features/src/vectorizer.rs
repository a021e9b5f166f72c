//! Sparse TF-IDF vectorizer over unigrams and bigrams
//!
//! `TfidfVectorizer::fit` is called once by the training orchestrator and
//! returns a frozen [`FittedVectorizer`]; only the frozen form can
//! transform text, so the vocabulary and weighting stay stable across
//! requests.

use mailscreen_core::SparseVector;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Vectorizer settings, fixed before fitting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    /// Upper bound on vocabulary size
    pub max_features: usize,

    /// Minimum number of documents a term must appear in
    pub min_df: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self {
            max_features: 5_000,
            min_df: 2,
        }
    }
}

/// Split normalized text into word tokens of two or more characters
pub fn tokenize(text: &str) -> Vec<&str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() >= 2)
        .collect()
}

/// Unigrams plus adjacent-pair bigrams, in document order
fn ngrams(tokens: &[&str]) -> Vec<String> {
    let mut terms: Vec<String> = tokens.iter().map(|t| (*t).to_string()).collect();
    for pair in tokens.windows(2) {
        terms.push(format!("{} {}", pair[0], pair[1]));
    }
    terms
}

impl TfidfVectorizer {
    /// Fit the vocabulary and IDF weights on normalized documents.
    ///
    /// Vocabulary selection is deterministic: terms below `min_df` are
    /// dropped, the remainder ranked by document frequency with
    /// lexicographic ties, and the surviving terms indexed in sorted order.
    pub fn fit<S: AsRef<str>>(&self, documents: &[S]) -> FittedVectorizer {
        let n_documents = documents.len();
        let mut document_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let tokens = tokenize(doc.as_ref());
            let mut unique = ngrams(&tokens);
            unique.sort_unstable();
            unique.dedup();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let mut candidates: Vec<(String, usize)> = document_frequency
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df)
            .collect();

        if candidates.len() > self.max_features {
            candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
            candidates.truncate(self.max_features);
        }

        let mut vocabulary = BTreeMap::new();
        let mut selected: Vec<(String, usize)> = candidates;
        selected.sort_unstable_by(|a, b| a.0.cmp(&b.0));

        let mut idf = Vec::with_capacity(selected.len());
        for (index, (term, df)) in selected.into_iter().enumerate() {
            // Smoothed IDF: ln((N + 1) / (df + 1)) + 1
            idf.push(((n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0);
            vocabulary.insert(term, index as u32);
        }

        FittedVectorizer {
            vocabulary,
            idf,
            n_documents,
        }
    }
}

/// Frozen vocabulary and IDF weights; immutable after fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedVectorizer {
    vocabulary: BTreeMap<String, u32>,
    idf: Vec<f64>,
    n_documents: usize,
}

impl FittedVectorizer {
    /// Transform normalized text into an L2-normalized TF-IDF vector.
    ///
    /// Pure given the frozen state: identical text yields bit-identical
    /// output. Terms outside the vocabulary are ignored.
    pub fn transform(&self, text: &str) -> SparseVector {
        let tokens = tokenize(text);
        let terms = ngrams(&tokens);
        let term_total = terms.len() as f64;

        let mut counts: BTreeMap<u32, f64> = BTreeMap::new();
        for term in &terms {
            if let Some(&index) = self.vocabulary.get(term.as_str()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let mut vector = SparseVector::new();
        if term_total == 0.0 {
            return vector;
        }

        for (index, count) in counts {
            let tf = count / term_total;
            vector.push(index, tf * self.idf[index as usize]);
        }

        let norm = vector.norm();
        if norm > 0.0 {
            for entry in &mut vector.entries {
                entry.1 /= norm;
            }
        }
        vector
    }

    /// Size of the frozen vocabulary
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }

    /// Number of documents the vocabulary was fitted on
    pub fn document_count(&self) -> usize {
        self.n_documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<String> {
        vec![
            "verify your account now".to_string(),
            "verify your password".to_string(),
            "team meeting tomorrow morning".to_string(),
            "meeting notes from your team".to_string(),
        ]
    }

    #[test]
    fn test_fit_respects_min_df() {
        let fitted = TfidfVectorizer::default().fit(&docs());
        // "verify" and "meeting" appear in two documents each
        assert!(fitted.transform("verify meeting").nnz() >= 2);
        // "tomorrow" appears once and is dropped by min_df = 2
        assert_eq!(fitted.transform("tomorrow").nnz(), 0);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let fitted = TfidfVectorizer::default().fit(&docs());
        let a = fitted.transform("verify your account");
        let b = fitted.transform("verify your account");
        assert_eq!(a, b);
    }

    #[test]
    fn test_max_features_bounds_vocabulary() {
        let vectorizer = TfidfVectorizer {
            max_features: 3,
            min_df: 1,
        };
        let fitted = vectorizer.fit(&docs());
        assert_eq!(fitted.vocabulary_size(), 3);
    }

    #[test]
    fn test_unknown_terms_ignored() {
        let fitted = TfidfVectorizer::default().fit(&docs());
        assert_eq!(fitted.transform("completely unrelated words").nnz(), 0);
    }

    #[test]
    fn test_transform_is_l2_normalized() {
        let fitted = TfidfVectorizer::default().fit(&docs());
        let v = fitted.transform("verify your account meeting");
        assert!((v.norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_bigrams_enter_vocabulary() {
        let vectorizer = TfidfVectorizer {
            max_features: 10_000,
            min_df: 2,
        };
        let fitted = vectorizer.fit(&docs());
        // "verify your" occurs in two documents
        assert!(fitted.transform("verify your").nnz() >= 1);
    }
}
