//! Dataset utilities: folder housekeeping, class counts, metadata tables and
//! the shared helpers they are built from.

mod counts;
mod folders;
mod metadata;
mod sampling;

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::de::DeserializeOwned;
use serde::Serialize;
use walkdir::WalkDir;

use crate::errors::{CoffeeLeafError, Result};

pub use counts::{
    build_crop_disease_count, class_proportions, get_class_counts, parse_crop_disease,
    ClassCount, ClassProportion, DEFAULT_CROP,
};
pub use folders::{check_path_exists, clean_folder};
pub use metadata::{
    generate_and_save_metadata_csv, load_data, probe_image, ImageMetadata, LoadedDataset,
};
pub use sampling::{sample_class_images, write_class_montage, ClassSample};

/// The only place a run's random number generator is created.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Whether `path` names an image this build can decode. Formats whose codec
/// feature is disabled count as unsupported.
pub fn is_supported_image_format(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok_and(|format| format.reading_enabled())
}

/// Column names of a CSV table, written even when the table has no rows.
pub trait CsvRow {
    const HEADERS: &'static [&'static str];
}

/// Subdirectories of `root`, sorted by name, optionally restricted to
/// `class_names`.
pub fn list_class_dirs(root: &Path, class_names: Option<&[String]>) -> Result<Vec<PathBuf>> {
    if !root.exists() {
        return Err(CoffeeLeafError::not_found("Data folder", root));
    }

    let entries =
        fs::read_dir(root).map_err(|e| CoffeeLeafError::file_system(root, "read directory", e))?;

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoffeeLeafError::file_system(root, "read directory", e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let wanted = match class_names {
            Some(names) => names
                .iter()
                .any(|name| entry.file_name().to_str() == Some(name.as_str())),
            None => true,
        };
        if wanted {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Image files below `dir`, sorted by path. Only direct children unless
/// `recursive`.
pub fn collect_image_files(dir: &Path, recursive: bool) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(dir).min_depth(1);
    let walker = if recursive { walker } else { walker.max_depth(1) };

    let mut image_files = Vec::new();
    for entry in walker {
        let entry = entry?;
        if entry.file_type().is_file() && is_supported_image_format(entry.path()) {
            image_files.push(entry.into_path());
        }
    }

    image_files.sort();
    Ok(image_files)
}

pub fn write_csv<T: CsvRow + Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| CoffeeLeafError::csv(path, "create CSV file", e))?;
    // serialize() only emits the header along with the first row
    if rows.is_empty() {
        writer
            .write_record(T::HEADERS)
            .map_err(|e| CoffeeLeafError::csv(path, "write CSV header", e))?;
    }
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| CoffeeLeafError::csv(path, "write CSV row", e))?;
    }
    writer
        .flush()
        .map_err(|e| CoffeeLeafError::file_system(path, "flush CSV file", e))
}

pub fn read_csv<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| CoffeeLeafError::csv(path, "open CSV file", e))?;
    reader
        .deserialize()
        .map(|row| row.map_err(|e| CoffeeLeafError::csv(path, "read CSV row", e)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use tempfile::TempDir;

    #[test]
    fn test_supported_formats() {
        let test_cases = vec![
            ("leaf.jpg", true),
            ("leaf.JPEG", true),
            ("leaf.png", true),
            ("leaf.webp", true),
            ("leaf.bmp", cfg!(feature = "image-extra")),
            ("leaf.tga", false),
            ("notes.txt", false),
            ("leaf", false),
        ];

        for (filename, expected) in test_cases {
            assert_eq!(
                is_supported_image_format(Path::new(filename)),
                expected,
                "{filename}"
            );
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let mut first = seeded_rng(31);
        let mut second = seeded_rng(31);
        let a: Vec<u32> = (0..8).map(|_| first.gen()).collect();
        let b: Vec<u32> = (0..8).map(|_| second.gen()).collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_list_class_dirs_filters_and_sorts() -> Result<()> {
        let temp_dir = TempDir::new()?;
        for name in ["Rust leaf", "Healthy leaf", "Miner leaf"] {
            fs::create_dir_all(temp_dir.path().join(name))?;
        }
        fs::write(temp_dir.path().join("readme.txt"), b"not a class")?;

        let all = list_class_dirs(temp_dir.path(), None)?;
        let names: Vec<_> = all
            .iter()
            .filter_map(|p| p.file_name()?.to_str())
            .collect();
        assert_eq!(names, ["Healthy leaf", "Miner leaf", "Rust leaf"]);

        let wanted = vec!["Rust leaf".to_string()];
        let some = list_class_dirs(temp_dir.path(), Some(&wanted))?;
        assert_eq!(some, vec![temp_dir.path().join("Rust leaf")]);
        Ok(())
    }

    #[test]
    fn test_empty_table_keeps_header() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("empty.csv");
        write_csv::<ImageMetadata>(&path, &[])?;

        assert_eq!(
            fs::read_to_string(&path)?,
            "FileName,ClassName,FrameHeight,FrameWidth,Channels\n"
        );
        assert!(read_csv::<ImageMetadata>(&path)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_collect_image_files_depth() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let nested = temp_dir.path().join("nested");
        fs::create_dir_all(&nested)?;
        fs::write(temp_dir.path().join("b.jpg"), b"")?;
        fs::write(temp_dir.path().join("a.png"), b"")?;
        fs::write(temp_dir.path().join("notes.txt"), b"")?;
        fs::write(temp_dir.path().join("scan.tga"), b"")?;
        fs::write(nested.join("c.jpg"), b"")?;

        let flat = collect_image_files(temp_dir.path(), false)?;
        assert_eq!(
            flat,
            vec![temp_dir.path().join("a.png"), temp_dir.path().join("b.jpg")]
        );
        assert_eq!(collect_image_files(temp_dir.path(), true)?.len(), 3);
        Ok(())
    }
}
