//! Train / validation / test splitting.
//!
//! The split runs in two stages: `split_ratio` of the images is held out of
//! training, then `sub_split_ratio` of the held-out part becomes the test set
//! and the rest the validation set. With stratification each class is split
//! on its own so every split keeps the class proportions of the input.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;

use super::ImageRecord;
use crate::errors::{CoffeeLeafError, Result};
use crate::utils::seeded_rng;

/// Fractions used by the two split stages.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitRatios {
    /// Fraction of each group held out of training
    pub split_ratio: f64,
    /// Fraction of the held-out part assigned to test
    pub sub_split_ratio: f64,
}

impl Default for SplitRatios {
    fn default() -> Self {
        Self {
            split_ratio: 0.2,
            sub_split_ratio: 0.5,
        }
    }
}

impl SplitRatios {
    pub fn new(split_ratio: f64, sub_split_ratio: f64) -> Result<Self> {
        check_ratio("split_ratio", split_ratio)?;
        check_ratio("sub_split_ratio", sub_split_ratio)?;
        Ok(Self {
            split_ratio,
            sub_split_ratio,
        })
    }
}

fn check_ratio(field: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(CoffeeLeafError::validation(
            field,
            format!("must be strictly between 0 and 1, got {value}"),
        ))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitOutcome {
    pub train: Vec<ImageRecord>,
    pub val: Vec<ImageRecord>,
    pub test: Vec<ImageRecord>,
}

impl SplitOutcome {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Number of images held out of a group of `n`. A group never loses its
/// last training image.
fn held_out_count(n: usize, ratio: f64) -> usize {
    let held = (n as f64 * ratio).round() as usize;
    held.min(n.saturating_sub(1))
}

pub fn split_records(
    records: &[ImageRecord],
    ratios: &SplitRatios,
    seed: u64,
    shuffle: bool,
    stratify: bool,
) -> SplitOutcome {
    let mut rng = seeded_rng(seed);

    let groups: Vec<Vec<ImageRecord>> = if stratify {
        let mut by_class: BTreeMap<usize, Vec<ImageRecord>> = BTreeMap::new();
        for record in records {
            by_class
                .entry(record.label)
                .or_default()
                .push(record.clone());
        }
        by_class.into_values().collect()
    } else {
        vec![records.to_vec()]
    };

    let mut outcome = SplitOutcome::default();
    for mut group in groups {
        if shuffle {
            group.shuffle(&mut rng);
        }

        let n = group.len();
        let held = held_out_count(n, ratios.split_ratio);
        let n_test = (held as f64 * ratios.sub_split_ratio).round() as usize;
        let n_val = held - n_test.min(held);

        let mut rest = group.split_off(n - held);
        let test = rest.split_off(n_val);

        outcome.train.extend(group);
        outcome.val.extend(rest);
        outcome.test.extend(test);
    }

    outcome
}
