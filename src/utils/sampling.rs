use std::path::{Path, PathBuf};

use rand::Rng;
use serde::Deserialize;
use tracing::{info, warn};

use super::{read_csv, seeded_rng};
use crate::errors::{CoffeeLeafError, Result};
use crate::imageops::build_montage;
use crate::progress_tracker::ProgressTracker;

#[derive(Debug, Deserialize)]
struct SampleRow {
    #[serde(rename = "FileName")]
    file_name: String,
    #[serde(rename = "ClassName")]
    class_name: String,
}

/// Images drawn for one class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSample {
    pub class_name: String,
    pub images: Vec<PathBuf>,
}

/// Draw `size` images per class, with replacement, from a metadata CSV.
/// Relative file names resolve against the CSV's directory. Classes with
/// no rows are skipped.
pub fn sample_class_images(
    csv_file: &Path,
    class_names: &[String],
    size: usize,
    seed: u64,
) -> Result<Vec<ClassSample>> {
    if !csv_file.exists() {
        return Err(CoffeeLeafError::not_found("CSV file", csv_file));
    }

    let rows: Vec<SampleRow> = read_csv(csv_file)?;
    let base_dir = csv_file.parent().unwrap_or(Path::new(""));
    let mut rng = seeded_rng(seed);

    let mut samples = Vec::with_capacity(class_names.len());
    for class_name in class_names {
        let candidates: Vec<&SampleRow> = rows
            .iter()
            .filter(|row| row.class_name == *class_name)
            .collect();
        if candidates.is_empty() {
            warn!("No images of class {} in {}", class_name, csv_file.display());
            continue;
        }

        let images = (0..size)
            .map(|_| {
                let row = candidates[rng.gen_range(0..candidates.len())];
                base_dir.join(&row.file_name)
            })
            .collect();
        samples.push(ClassSample {
            class_name: class_name.clone(),
            images,
        });
    }

    Ok(samples)
}

/// Save a contact sheet with one row of thumbnails per class.
pub fn write_class_montage(samples: &[ClassSample], cell: u32, output: &Path) -> Result<()> {
    let mut rows = Vec::with_capacity(samples.len());
    for sample in samples {
        let tracker = ProgressTracker::new(sample.images.len(), "montage");
        let images = tracker.run(&sample.images, |path| {
            image::open(path).map_err(|e| CoffeeLeafError::image(path, "open image", e))
        })?;
        info!("Montage row {}: {}", rows.len(), sample.class_name);
        rows.push(images);
    }

    let montage = build_montage(&rows, cell)?;
    montage
        .save(output)
        .map_err(|e| CoffeeLeafError::image(output, "save montage", e))?;
    info!("Montage saved to {}", output.display());
    Ok(())
}
