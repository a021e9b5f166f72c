//! Evaluation metrics and threshold calibration

use mailscreen_features::HeldOutMetrics;

/// Confusion counts at one threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl Confusion {
    /// Count outcomes of thresholded probabilities against labels
    pub fn from_predictions(labels: &[u8], probabilities: &[f64], threshold: f64) -> Self {
        let mut confusion = Self::default();
        for (label, probability) in labels.iter().zip(probabilities) {
            let predicted = *probability >= threshold;
            match (predicted, *label == 1) {
                (true, true) => confusion.true_positives += 1,
                (true, false) => confusion.false_positives += 1,
                (false, false) => confusion.true_negatives += 1,
                (false, true) => confusion.false_negatives += 1,
            }
        }
        confusion
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.true_positives
            + self.false_positives
            + self.true_negatives
            + self.false_negatives;
        if total == 0 {
            return 0.0;
        }
        (self.true_positives + self.true_negatives) as f64 / total as f64
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    pub fn f1(&self) -> f64 {
        let precision = self.precision();
        let recall = self.recall();
        if precision + recall == 0.0 {
            return 0.0;
        }
        2.0 * precision * recall / (precision + recall)
    }

    /// All four metrics at once
    pub fn metrics(&self) -> HeldOutMetrics {
        HeldOutMetrics {
            accuracy: self.accuracy(),
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1(),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Sweep thresholds 0.30 through 0.70 in 0.05 steps and keep the one with
/// the highest held-out F1. Ties keep the lower threshold.
pub fn calibrate_threshold(labels: &[u8], probabilities: &[f64]) -> (f64, HeldOutMetrics) {
    let mut best_threshold = 0.30;
    let mut best = Confusion::from_predictions(labels, probabilities, best_threshold).metrics();

    // Integer centi-steps keep the grid exact
    for percent in (35..=70).step_by(5) {
        let threshold = f64::from(percent) / 100.0;
        let metrics = Confusion::from_predictions(labels, probabilities, threshold).metrics();
        if metrics.f1 > best.f1 {
            best_threshold = threshold;
            best = metrics;
        }
    }

    (best_threshold, best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confusion_counts() {
        let labels = [1, 1, 0, 0, 1];
        let probabilities = [0.9, 0.4, 0.2, 0.6, 0.8];
        let confusion = Confusion::from_predictions(&labels, &probabilities, 0.5);

        assert_eq!(confusion.true_positives, 2);
        assert_eq!(confusion.false_negatives, 1);
        assert_eq!(confusion.false_positives, 1);
        assert_eq!(confusion.true_negatives, 1);
        assert!((confusion.accuracy() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_metrics_are_zero_not_nan() {
        let confusion = Confusion::from_predictions(&[0, 0], &[0.1, 0.2], 0.5);
        assert_eq!(confusion.precision(), 0.0);
        assert_eq!(confusion.recall(), 0.0);
        assert_eq!(confusion.f1(), 0.0);
    }

    #[test]
    fn test_calibration_picks_max_f1() {
        // Probabilities separate cleanly at 0.55: everything above is
        // phishing. Thresholds of 0.60 and below classify perfectly.
        let labels = [1, 1, 1, 0, 0, 0];
        let probabilities = [0.9, 0.8, 0.62, 0.5, 0.3, 0.1];
        let (threshold, metrics) = calibrate_threshold(&labels, &probabilities);

        assert_eq!(metrics.f1, 1.0);
        // 0.55 misclassifies nothing either; the tie keeps the lowest
        // perfect threshold in the sweep
        assert_eq!(threshold, 0.55);
    }

    #[test]
    fn test_ties_keep_the_lower_threshold() {
        // Every threshold in the sweep scores identically
        let labels = [1, 0];
        let probabilities = [0.9, 0.1];
        let (threshold, metrics) = calibrate_threshold(&labels, &probabilities);
        assert_eq!(threshold, 0.30);
        assert_eq!(metrics.f1, 1.0);
    }
}
