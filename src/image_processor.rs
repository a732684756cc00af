use std::fs;
use std::path::{Path, PathBuf};

use image::imageops::FilterType;
use tracing::{info, warn};

use crate::errors::{CoffeeLeafError, Result};
use crate::imageops::{rotate_bound, QuarterTurn};
use crate::progress_tracker::ProgressTracker;
use crate::utils::{collect_image_files, list_class_dirs};

pub const DEFAULT_WIDTH: u32 = 256;
pub const DEFAULT_HEIGHT: u32 = 256;

/// Per-image augmentation applied by [`ImageProcessor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Augmentation {
    /// Resize to exactly `width`x`height`, keeping the file name.
    Resize { width: u32, height: u32 },
    /// Write every quarter turn as `Aug_rot_<angle>_<name>`.
    Rotate,
}

/// Applies an augmentation to the class folders of `input_dir`, mirroring
/// the class layout under `output_dir`.
pub struct ImageProcessor {
    input_dir: PathBuf,
    output_dir: PathBuf,
    class_names: Option<Vec<String>>,
}

struct Job {
    input: PathBuf,
    output_dir: PathBuf,
}

impl ImageProcessor {
    /// `class_names` of `None` processes every class folder.
    pub fn new(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        class_names: Option<Vec<String>>,
    ) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            class_names,
        }
    }

    fn class_names(&self) -> Result<Vec<String>> {
        match &self.class_names {
            Some(names) => Ok(names.clone()),
            None => Ok(list_class_dirs(&self.input_dir, None)?
                .iter()
                .filter_map(|dir| dir.file_name())
                .map(|name| name.to_string_lossy().into_owned())
                .collect()),
        }
    }

    fn collect_jobs(&self) -> Result<Vec<Job>> {
        if !self.input_dir.exists() {
            return Err(CoffeeLeafError::not_found("Input folder", &self.input_dir));
        }

        let mut jobs = Vec::new();
        for class_name in self.class_names()? {
            let folder_path = self.input_dir.join(&class_name);
            let output_path = self.output_dir.join(&class_name);
            if !folder_path.is_dir() {
                warn!("Class folder {} not found, skipping", folder_path.display());
                continue;
            }

            fs::create_dir_all(&output_path).map_err(|e| {
                CoffeeLeafError::file_system(&output_path, "create output directory", e)
            })?;
            info!("Track {}", class_name);

            jobs.extend(
                collect_image_files(&folder_path, false)?
                    .into_iter()
                    .map(|input| Job {
                        input,
                        output_dir: output_path.clone(),
                    }),
            );
        }
        Ok(jobs)
    }

    /// Apply `augmentation` to every image. Returns the number of files written.
    pub fn process_directory(&self, augmentation: Augmentation) -> Result<usize> {
        let jobs = self.collect_jobs()?;
        if jobs.is_empty() {
            info!("No images found under {}", self.input_dir.display());
            return Ok(0);
        }

        let tracker = ProgressTracker::new(jobs.len(), "augment");
        let written = tracker.run(&jobs, |job| {
            process_single_image(&job.input, &job.output_dir, augmentation)
        })?;

        let total: usize = written.iter().sum();
        info!("Wrote {} images to {}", total, self.output_dir.display());
        Ok(total)
    }
}

fn process_single_image(
    input_file: &Path,
    output_dir: &Path,
    augmentation: Augmentation,
) -> Result<usize> {
    let img =
        image::open(input_file).map_err(|e| CoffeeLeafError::image(input_file, "open image", e))?;
    let file_name = input_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    match augmentation {
        Augmentation::Resize { width, height } => {
            let output_file = output_dir.join(&file_name);
            img.resize_exact(width, height, FilterType::Triangle)
                .save(&output_file)
                .map_err(|e| CoffeeLeafError::image(&output_file, "save image", e))?;
            Ok(1)
        }
        Augmentation::Rotate => {
            for turn in QuarterTurn::ALL {
                let output_file =
                    output_dir.join(format!("Aug_rot_{}_{}", turn.degrees(), file_name));
                rotate_bound(&img, turn)
                    .save(&output_file)
                    .map_err(|e| CoffeeLeafError::image(&output_file, "save image", e))?;
            }
            Ok(QuarterTurn::ALL.len())
        }
    }
}

pub fn resize_images(
    input_dir: &Path,
    output_dir: &Path,
    class_names: Option<Vec<String>>,
    width: u32,
    height: u32,
) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(CoffeeLeafError::validation(
            "size",
            format!("{width}x{height} has a zero dimension"),
        ));
    }
    ImageProcessor::new(input_dir, output_dir, class_names)
        .process_directory(Augmentation::Resize { width, height })
}

pub fn rotate_images(
    input_dir: &Path,
    output_dir: &Path,
    class_names: Option<Vec<String>>,
) -> Result<usize> {
    ImageProcessor::new(input_dir, output_dir, class_names).process_directory(Augmentation::Rotate)
}
