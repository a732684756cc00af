use std::collections::BTreeMap;

use rand::Rng;

use super::{ImagePair, ImageRecord};

/// Draw an index in `0..len` that is never `skip`. `len` must be at least 2.
fn index_other_than<R: Rng + ?Sized>(rng: &mut R, len: usize, skip: usize) -> usize {
    let drawn = rng.gen_range(0..len - 1);
    if drawn >= skip {
        drawn + 1
    } else {
        drawn
    }
}

/// Build one positive and one negative pair per image.
///
/// The positive partner is another image of the same class, the negative
/// partner an image of a different class. A class with a single image gets
/// no positive pair; a single-class input gets no negative pairs.
pub fn make_siamese_pairs<R: Rng + ?Sized>(records: &[ImageRecord], rng: &mut R) -> Vec<ImagePair> {
    let mut by_label: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, record) in records.iter().enumerate() {
        by_label.entry(record.label).or_default().push(index);
    }
    let labels: Vec<usize> = by_label.keys().copied().collect();

    let mut pairs = Vec::with_capacity(records.len() * 2);
    for (index, record) in records.iter().enumerate() {
        let same = &by_label[&record.label];

        if same.len() > 1 {
            // indices were pushed in ascending order
            if let Ok(position) = same.binary_search(&index) {
                let partner = same[index_other_than(rng, same.len(), position)];
                pairs.push(ImagePair {
                    left: record.path.clone(),
                    right: records[partner].path.clone(),
                    similar: 1,
                });
            }
        }

        if labels.len() > 1 {
            if let Ok(position) = labels.binary_search(&record.label) {
                let other_label = labels[index_other_than(rng, labels.len(), position)];
                let candidates = &by_label[&other_label];
                let partner = candidates[rng.gen_range(0..candidates.len())];
                pairs.push(ImagePair {
                    left: record.path.clone(),
                    right: records[partner].path.clone(),
                    similar: 0,
                });
            }
        }
    }

    pairs
}
