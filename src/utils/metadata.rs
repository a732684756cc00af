use std::fs;
use std::path::{Path, PathBuf};

use image::{ImageDecoder, ImageReader};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{collect_image_files, list_class_dirs, write_csv, CsvRow};
use crate::errors::{CoffeeLeafError, Result};
use crate::progress_tracker::ProgressTracker;

/// One row of the image metadata table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetadata {
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "ClassName")]
    pub class_name: String,
    #[serde(rename = "FrameHeight")]
    pub frame_height: u32,
    #[serde(rename = "FrameWidth")]
    pub frame_width: u32,
    #[serde(rename = "Channels")]
    pub channels: u8,
}

impl CsvRow for ImageMetadata {
    const HEADERS: &'static [&'static str] =
        &["FileName", "ClassName", "FrameHeight", "FrameWidth", "Channels"];
}

/// Images, classes and ids read back from metadata tables, index-aligned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedDataset {
    pub images: Vec<PathBuf>,
    pub classes: Vec<String>,
    pub ids: Vec<String>,
}

impl LoadedDataset {
    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

/// Read `(height, width, channels)` from the image header without decoding
/// pixel data.
pub fn probe_image(path: &Path) -> Result<(u32, u32, u8)> {
    let reader = ImageReader::open(path)
        .map_err(|e| CoffeeLeafError::file_system(path, "open image", e))?
        .with_guessed_format()
        .map_err(|e| CoffeeLeafError::file_system(path, "detect image format", e))?;
    let decoder = reader
        .into_decoder()
        .map_err(|e| CoffeeLeafError::image(path, "read image header", e))?;

    let (width, height) = decoder.dimensions();
    Ok((height, width, decoder.color_type().channel_count()))
}

/// Write a metadata CSV describing every image in the class folders of
/// `data_dir`. Returns the number of rows written.
pub fn generate_and_save_metadata_csv(
    data_dir: &Path,
    output_dir: &Path,
    output_file_name: &str,
    class_names: Option<&[String]>,
) -> Result<usize> {
    if !data_dir.exists() {
        return Err(CoffeeLeafError::not_found("Data folder", data_dir));
    }
    if !output_dir.exists() {
        return Err(CoffeeLeafError::not_found("Output folder", output_dir));
    }

    let mut jobs = Vec::new();
    for class_dir in list_class_dirs(data_dir, class_names)? {
        info!("Tracking {}", class_dir.display());
        let class_name = class_dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let files = collect_image_files(&class_dir, false)?;
        debug!("{} images in {}", files.len(), class_name);
        jobs.extend(files.into_iter().map(|file| (file, class_name.clone())));
    }

    let tracker = ProgressTracker::new(jobs.len(), "metadata");
    let rows = tracker.run(&jobs, |(file, class_name)| {
        let (frame_height, frame_width, channels) = probe_image(file)?;
        Ok(ImageMetadata {
            file_name: file.display().to_string(),
            class_name: class_name.clone(),
            frame_height,
            frame_width,
            channels,
        })
    })?;

    let output_path = output_dir.join(output_file_name);
    write_csv(&output_path, &rows)?;
    info!(
        "File saved to {} with {} entries",
        output_path.display(),
        rows.len()
    );
    Ok(rows.len())
}

/// Concatenate every metadata `*.csv` directly inside `input_dir`, in file
/// name order. CSVs with other columns, such as saved splits, are skipped.
///
/// The id of an image is its full path with the final extension removed.
pub fn load_data(input_dir: &Path) -> Result<LoadedDataset> {
    if !input_dir.exists() {
        return Err(CoffeeLeafError::not_found("Input folder", input_dir));
    }

    let mut csv_files: Vec<PathBuf> = fs::read_dir(input_dir)
        .map_err(|e| CoffeeLeafError::file_system(input_dir, "read directory", e))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .collect();
    csv_files.sort();

    let mut dataset = LoadedDataset::default();
    let mut loaded_files = 0;
    for csv_file in &csv_files {
        let mut reader = csv::Reader::from_path(csv_file)
            .map_err(|e| CoffeeLeafError::csv(csv_file, "open CSV file", e))?;
        let headers = reader
            .headers()
            .map_err(|e| CoffeeLeafError::csv(csv_file, "read CSV header", e))?;
        if !headers.iter().eq(ImageMetadata::HEADERS.iter().copied()) {
            warn!("Skipping {} (not a metadata table)", csv_file.display());
            continue;
        }

        let rows = reader
            .deserialize::<ImageMetadata>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CoffeeLeafError::csv(csv_file, "read CSV row", e))?;
        debug!("{} rows in {}", rows.len(), csv_file.display());
        loaded_files += 1;
        for row in rows {
            let image = PathBuf::from(&row.file_name);
            dataset
                .ids
                .push(image.with_extension("").to_string_lossy().into_owned());
            dataset.images.push(image);
            dataset.classes.push(row.class_name);
        }
    }

    info!(
        "Loaded {} images from {} CSV files",
        dataset.len(),
        loaded_files
    );
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataprocess::{ImagePair, ImageRecord};
    use image::{GrayImage, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_probe_image_reports_channels() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let rgb = temp_dir.path().join("rgb.png");
        let rgba = temp_dir.path().join("rgba.png");
        let gray = temp_dir.path().join("gray.png");
        RgbImage::from_pixel(7, 3, Rgb([10, 200, 10])).save(&rgb)?;
        RgbaImage::from_pixel(2, 5, Rgba([10, 200, 10, 255])).save(&rgba)?;
        GrayImage::from_pixel(4, 4, Luma([90])).save(&gray)?;

        assert_eq!(probe_image(&rgb)?, (3, 7, 3));
        assert_eq!(probe_image(&rgba)?, (5, 2, 4));
        assert_eq!(probe_image(&gray)?, (4, 4, 1));
        Ok(())
    }

    #[test]
    fn test_missing_directories_are_not_found() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("missing");

        let err = generate_and_save_metadata_csv(&missing, temp_dir.path(), "m.csv", None);
        assert!(matches!(err, Err(CoffeeLeafError::NotFound { .. })));

        let err = generate_and_save_metadata_csv(temp_dir.path(), &missing, "m.csv", None);
        assert!(matches!(err, Err(CoffeeLeafError::NotFound { .. })));
        Ok(())
    }

    #[test]
    fn test_empty_class_writes_header_only() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let data = temp_dir.path().join("data");
        fs::create_dir_all(data.join("Rust leaf"))?;

        let rows = generate_and_save_metadata_csv(&data, temp_dir.path(), "m.csv", None)?;
        assert_eq!(rows, 0);
        assert_eq!(
            fs::read_to_string(temp_dir.path().join("m.csv"))?,
            "FileName,ClassName,FrameHeight,FrameWidth,Channels\n"
        );
        Ok(())
    }

    #[test]
    fn test_undecodable_formats_are_skipped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let data = temp_dir.path().join("data");
        let class_dir = data.join("Rust leaf");
        fs::create_dir_all(&class_dir)?;
        RgbImage::from_pixel(3, 2, Rgb([0, 90, 0])).save(class_dir.join("a.png"))?;
        fs::write(class_dir.join("b.tga"), b"not decodable here")?;

        let rows = generate_and_save_metadata_csv(&data, temp_dir.path(), "m.csv", None)?;
        assert_eq!(rows, 1);
        Ok(())
    }

    #[test]
    fn test_load_data_skips_other_tables() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let meta = vec![ImageMetadata {
            file_name: "data/Rust leaf/a.png".to_string(),
            class_name: "Rust leaf".to_string(),
            frame_height: 2,
            frame_width: 3,
            channels: 3,
        }];
        let split = vec![ImageRecord {
            path: PathBuf::from("data/Rust leaf/a.png"),
            class_name: "Rust leaf".to_string(),
            label: 0,
        }];
        let pairs = vec![ImagePair {
            left: PathBuf::from("data/Rust leaf/a.png"),
            right: PathBuf::from("data/Rust leaf/b.png"),
            similar: 1,
        }];
        write_csv(&temp_dir.path().join("coffee.csv"), &meta)?;
        write_csv(&temp_dir.path().join("train.csv"), &split)?;
        write_csv(&temp_dir.path().join("pairs.csv"), &pairs)?;

        let dataset = load_data(temp_dir.path())?;
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.ids, ["data/Rust leaf/a"]);
        Ok(())
    }

    #[test]
    fn test_load_data_derives_ids() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let rows = vec![
            ImageMetadata {
                file_name: "data/Rust leaf/img.001.jpg".to_string(),
                class_name: "Rust leaf".to_string(),
                frame_height: 10,
                frame_width: 12,
                channels: 3,
            },
            ImageMetadata {
                file_name: "data/Healthy leaf/h1.png".to_string(),
                class_name: "Healthy leaf".to_string(),
                frame_height: 10,
                frame_width: 12,
                channels: 3,
            },
        ];
        write_csv(&temp_dir.path().join("meta.csv"), &rows)?;
        fs::write(temp_dir.path().join("ignored.txt"), b"FileName,ClassName\n")?;

        let dataset = load_data(temp_dir.path())?;
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.ids, ["data/Rust leaf/img.001", "data/Healthy leaf/h1"]);
        assert_eq!(dataset.classes, ["Rust leaf", "Healthy leaf"]);
        Ok(())
    }
}
