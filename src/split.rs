//! Seeded, stratified train/test partition

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;

use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::schema::Label;

/// Partition `dataset` into disjoint (train, test) subsets.
///
/// The test side receives the nearest integer to `test_fraction` of each
/// label's records, so class proportions carry over to both subsets. The
/// per-class index lists are shuffled with a `Xoshiro256Plus` generator
/// seeded from `seed`: the same seed on the same dataset always yields the
/// identical partition. Rows of both subsets come out in shuffled order.
pub fn stratified_split(
    dataset: &Dataset,
    test_fraction: f64,
    seed: u64,
) -> Result<(Dataset, Dataset)> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(Error::InvalidTestFraction(test_fraction));
    }

    let mut rng = Xoshiro256Plus::seed_from_u64(seed);
    let mut train_indices = Vec::new();
    let mut test_indices = Vec::new();

    for label in Label::ALL {
        let mut indices: Vec<usize> = dataset
            .labels()
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect();
        indices.shuffle(&mut rng);

        let quota = (test_fraction * indices.len() as f64).round() as usize;
        test_indices.extend_from_slice(&indices[..quota]);
        train_indices.extend_from_slice(&indices[quota..]);
    }

    if train_indices.is_empty() || test_indices.is_empty() {
        return Err(Error::EmptySet);
    }

    Ok((
        dataset.take_rows(&train_indices),
        dataset.take_rows(&test_indices),
    ))
}
