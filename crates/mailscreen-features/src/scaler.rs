//! Standard scaling for the numeric signal columns

use mailscreen_core::NumericSignals;
use serde::{Deserialize, Serialize};

/// Per-column mean/deviation statistics, frozen at fit time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FittedScaler {
    mean: [f64; NumericSignals::COLUMNS],
    std: [f64; NumericSignals::COLUMNS],
}

impl FittedScaler {
    /// Fit column statistics over the training rows
    pub fn fit(rows: &[[f64; NumericSignals::COLUMNS]]) -> Self {
        let n = rows.len().max(1) as f64;
        let mut mean = [0.0; NumericSignals::COLUMNS];
        let mut std = [0.0; NumericSignals::COLUMNS];

        for row in rows {
            for (col, value) in row.iter().enumerate() {
                mean[col] += value;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        for row in rows {
            for (col, value) in row.iter().enumerate() {
                std[col] += (value - mean[col]).powi(2);
            }
        }
        for s in &mut std {
            *s = (*s / n).sqrt();
        }

        Self { mean, std }
    }

    /// Center and scale one row. Constant columns map to zero.
    pub fn transform(&self, row: &[f64; NumericSignals::COLUMNS]) -> [f64; NumericSignals::COLUMNS] {
        let mut out = [0.0; NumericSignals::COLUMNS];
        for col in 0..NumericSignals::COLUMNS {
            if self.std[col] > 1e-12 {
                out[col] = (row[col] - self.mean[col]) / self.std[col];
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaler_centers_and_scales() {
        let rows = vec![[0.0, 0.0, 0.0, 10.0, 0.0], [2.0, 0.0, 0.0, 30.0, 0.0]];
        let scaler = FittedScaler::fit(&rows);

        let scaled = scaler.transform(&[2.0, 0.0, 0.0, 30.0, 0.0]);
        assert!((scaled[0] - 1.0).abs() < 1e-12);
        assert!((scaled[3] - 1.0).abs() < 1e-12);
        // Constant columns collapse to zero rather than dividing by zero
        assert_eq!(scaled[1], 0.0);
    }

    #[test]
    fn test_scaler_is_deterministic() {
        let rows = vec![[1.0, 1.0, 0.0, 100.0, 3.0], [5.0, 0.0, 1.0, 50.0, 0.0]];
        let scaler = FittedScaler::fit(&rows);
        let row = [3.0, 1.0, 1.0, 80.0, 2.0];
        assert_eq!(scaler.transform(&row), scaler.transform(&row));
    }
}
