use std::path::Path;

use serde::Serialize;
use walkdir::WalkDir;

use super::list_class_dirs;
use crate::errors::{CoffeeLeafError, Result};

/// Crop assumed when a class directory only names the disease.
pub const DEFAULT_CROP: &str = "Coffee";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassCount {
    #[serde(rename = "Crop")]
    pub crop: String,
    #[serde(rename = "Disease")]
    pub disease: String,
    #[serde(rename = "numberImages")]
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassProportion {
    pub disease: String,
    pub count: usize,
    pub percent: f64,
}

/// Split a class directory name into `(crop, disease)`.
///
/// `"<Crop> <Disease> leaf"` yields the crop and the remaining words;
/// `"<Disease> leaf"` yields the default crop. Only the trailing `" leaf"`
/// is removed.
pub fn parse_crop_disease(dir_name: &str) -> (String, String) {
    let trimmed = dir_name.trim_end();
    let name = trimmed.strip_suffix(" leaf").unwrap_or(trimmed).trim();
    match name.split_once(' ') {
        Some((crop, disease)) => (crop.to_string(), disease.trim().to_string()),
        None => (DEFAULT_CROP.to_string(), name.to_string()),
    }
}

fn count_files(folder: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(folder).min_depth(1) {
        if entry?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}

pub fn build_crop_disease_count(instance_folder: &Path) -> Result<ClassCount> {
    if !instance_folder.exists() {
        return Err(CoffeeLeafError::not_found("Class folder", instance_folder));
    }

    let dir_name = instance_folder
        .file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_default();
    let (crop, disease) = parse_crop_disease(&dir_name);

    Ok(ClassCount {
        crop,
        disease,
        count: count_files(instance_folder)?,
    })
}

/// One row per class directory of `data_folder`, sorted by directory name.
pub fn get_class_counts(
    data_folder: &Path,
    class_names: Option<&[String]>,
) -> Result<Vec<ClassCount>> {
    list_class_dirs(data_folder, class_names)?
        .iter()
        .map(|dir| build_crop_disease_count(dir))
        .collect()
}

pub fn class_proportions(counts: &[ClassCount]) -> Vec<ClassProportion> {
    let total: usize = counts.iter().map(|c| c.count).sum();
    counts
        .iter()
        .map(|c| ClassProportion {
            disease: c.disease.clone(),
            count: c.count,
            percent: if total == 0 {
                0.0
            } else {
                c.count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_parse_crop_disease() {
        let test_cases = vec![
            ("Coffee Rust leaf", ("Coffee", "Rust")),
            ("Arabica Cercospora leaf", ("Arabica", "Cercospora")),
            ("Healthy leaf", ("Coffee", "Healthy")),
            ("Healthy leaf ", ("Coffee", "Healthy")),
            ("Coffee Leaf miner leaf", ("Coffee", "Leaf miner")),
            ("Phoma", ("Coffee", "Phoma")),
            ("Brown leafspot leaf", ("Brown", "leafspot")),
            ("Coffee leaf rust leaf", ("Coffee", "leaf rust")),
        ];

        for (input, (crop, disease)) in test_cases {
            assert_eq!(
                parse_crop_disease(input),
                (crop.to_string(), disease.to_string()),
                "{input}"
            );
        }
    }

    #[test]
    fn test_counts_are_recursive() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let class_dir = temp_dir.path().join("Coffee Rust leaf");
        fs::create_dir_all(class_dir.join("extra"))?;
        fs::write(class_dir.join("1.jpg"), b"")?;
        fs::write(class_dir.join("2.jpg"), b"")?;
        fs::write(class_dir.join("extra").join("3.jpg"), b"")?;

        let count = build_crop_disease_count(&class_dir)?;
        assert_eq!(
            count,
            ClassCount {
                crop: "Coffee".to_string(),
                disease: "Rust".to_string(),
                count: 3,
            }
        );
        Ok(())
    }

    #[test]
    fn test_missing_class_folder() {
        let err = build_crop_disease_count(Path::new("/no/such/Healthy leaf"));
        assert!(matches!(err, Err(CoffeeLeafError::NotFound { .. })));
    }

    #[test]
    fn test_get_class_counts_with_filter() -> Result<()> {
        let temp_dir = TempDir::new()?;
        for (name, files) in [("Healthy leaf", 3), ("Rust leaf", 1), ("Miner leaf", 2)] {
            let dir = temp_dir.path().join(name);
            fs::create_dir_all(&dir)?;
            for i in 0..files {
                fs::write(dir.join(format!("{i}.jpg")), b"")?;
            }
        }

        let all = get_class_counts(temp_dir.path(), None)?;
        let diseases: Vec<_> = all.iter().map(|c| c.disease.as_str()).collect();
        assert_eq!(diseases, ["Healthy", "Miner", "Rust"]);

        let wanted = vec!["Rust leaf".to_string(), "Miner leaf".to_string()];
        let some = get_class_counts(temp_dir.path(), Some(&wanted))?;
        assert_eq!(some.iter().map(|c| c.count).sum::<usize>(), 3);
        Ok(())
    }

    #[test]
    fn test_class_proportions() {
        let counts = vec![
            ClassCount {
                crop: "Coffee".into(),
                disease: "Healthy".into(),
                count: 3,
            },
            ClassCount {
                crop: "Coffee".into(),
                disease: "Rust".into(),
                count: 1,
            },
        ];
        let proportions = class_proportions(&counts);
        assert_eq!(proportions[0].percent, 75.0);
        assert_eq!(proportions[1].percent, 25.0);
        assert!(class_proportions(&[]).is_empty());
    }
}
