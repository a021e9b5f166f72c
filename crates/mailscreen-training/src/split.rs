//! Seeded stratified train/test split

use mailscreen_core::LabeledRecord;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Split record indices into train and held-out sets, preserving the label
/// ratio per class. Deterministic for a given seed. A class with a single
/// sample goes entirely to the training set.
pub fn stratified_split(
    records: &[LabeledRecord],
    test_fraction: f64,
    seed: u64,
) -> (Vec<usize>, Vec<usize>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut test = Vec::new();

    for class in [0u8, 1u8] {
        let mut indices: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.label == class)
            .map(|(i, _)| i)
            .collect();
        if indices.is_empty() {
            continue;
        }
        indices.shuffle(&mut rng);

        let n = indices.len();
        let held_out = if n < 2 {
            0
        } else {
            (((n as f64) * test_fraction).round() as usize).clamp(1, n - 1)
        };

        test.extend_from_slice(&indices[..held_out]);
        train.extend_from_slice(&indices[held_out..]);
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}
