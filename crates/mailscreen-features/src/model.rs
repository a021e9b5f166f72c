//! Sparse logistic regression
//!
//! Trained from scratch on every run with seeded stochastic gradient
//! descent, so the decision boundary is reproducible from the corpus alone.

use mailscreen_core::{Error, Result, SparseVector};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Training hyperparameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainConfig {
    /// Full passes over the training partition
    pub epochs: usize,

    /// SGD step size
    pub learning_rate: f64,

    /// L2 penalty applied to touched weights
    pub l2: f64,

    /// Seed for the per-epoch shuffle
    pub seed: u64,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self {
            epochs: 20,
            learning_rate: 0.5,
            l2: 1e-6,
            seed: 42,
        }
    }
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Fitted logistic regression over the encoded feature space
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f64>,
    bias: f64,
}

impl LogisticRegression {
    /// Fit on encoded feature vectors and binary labels.
    ///
    /// Deterministic: samples are visited in an order drawn from a seeded
    /// RNG and updates run single-threaded.
    pub fn fit(
        features: &[SparseVector],
        labels: &[u8],
        dimension: usize,
        config: &TrainConfig,
    ) -> Result<Self> {
        if features.is_empty() || features.len() != labels.len() {
            return Err(Error::training(format!(
                "feature/label mismatch: {} features, {} labels",
                features.len(),
                labels.len()
            )));
        }

        let mut weights = vec![0.0; dimension];
        let mut bias = 0.0;
        let mut order: Vec<usize> = (0..features.len()).collect();
        let mut rng = StdRng::seed_from_u64(config.seed);

        for epoch in 0..config.epochs {
            order.shuffle(&mut rng);
            let mut loss = 0.0;

            for &i in &order {
                let x = &features[i];
                let y = f64::from(labels[i]);
                let p = sigmoid(x.dot(&weights) + bias);
                let gradient = p - y;

                for (index, value) in &x.entries {
                    let w = &mut weights[*index as usize];
                    *w -= config.learning_rate * (gradient * value + config.l2 * *w);
                }
                bias -= config.learning_rate * gradient;

                let p = p.clamp(1e-12, 1.0 - 1e-12);
                loss -= y * p.ln() + (1.0 - y) * (1.0 - p).ln();
            }

            debug!(epoch, loss = loss / features.len() as f64, "sgd epoch complete");
        }

        Ok(Self { weights, bias })
    }

    /// Probability that the encoded input is phishing
    pub fn predict_proba(&self, features: &SparseVector) -> f64 {
        sigmoid(features.dot(&self.weights) + self.bias)
    }

    /// Width of the feature space this model was fitted on
    pub fn dimension(&self) -> usize {
        self.weights.len()
    }
}
