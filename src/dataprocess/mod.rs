//! Dataset processors and the factory that selects one by name.

mod pairs;
mod siamese;
mod split;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{CoffeeLeafError, Result};
use crate::traits::DataProcessor;
use crate::utils::CsvRow;

pub use pairs::make_siamese_pairs;
pub use siamese::SiameseDataProcessor;
pub use split::{split_records, SplitOutcome, SplitRatios};

/// One labeled image. `label` indexes the processor's sorted class list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    #[serde(rename = "FileName")]
    pub path: PathBuf,
    #[serde(rename = "ClassName")]
    pub class_name: String,
    #[serde(rename = "Label")]
    pub label: usize,
}

impl CsvRow for ImageRecord {
    const HEADERS: &'static [&'static str] = &["FileName", "ClassName", "Label"];
}

/// Two images and whether they belong to the same class (`1`) or not (`0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePair {
    #[serde(rename = "Left")]
    pub left: PathBuf,
    #[serde(rename = "Right")]
    pub right: PathBuf,
    #[serde(rename = "Similar")]
    pub similar: u8,
}

impl CsvRow for ImagePair {
    const HEADERS: &'static [&'static str] = &["Left", "Right", "Similar"];
}

type Constructor = fn(&Path) -> Box<dyn DataProcessor>;

fn new_siamese(data_path: &Path) -> Box<dyn DataProcessor> {
    Box::new(SiameseDataProcessor::new(data_path))
}

const AVAILABLE_PROCESSORS: &[(&str, Constructor)] =
    &[(SiameseDataProcessor::PROCESS_NAME, new_siamese as Constructor)];

pub fn available_processors() -> Vec<&'static str> {
    AVAILABLE_PROCESSORS.iter().map(|(name, _)| *name).collect()
}

/// Build the processor registered under `name`, rooted at `data_path`.
pub fn data_processor_factory(name: &str, data_path: &Path) -> Result<Box<dyn DataProcessor>> {
    AVAILABLE_PROCESSORS
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, constructor)| constructor(data_path))
        .ok_or_else(|| CoffeeLeafError::UnknownProcessor {
            name: name.to_string(),
            available: available_processors().join(", "),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::ProcessorState;

    #[test]
    fn test_factory_builds_siamese() -> Result<()> {
        let processor = data_processor_factory("Siamese1x1", Path::new("/data/coffee"))?;
        assert_eq!(processor.process_name(), "Siamese1x1");
        assert_eq!(processor.state(), ProcessorState::Empty);
        Ok(())
    }

    #[test]
    fn test_factory_rejects_unknown_name() {
        let err = match data_processor_factory("Triplet", Path::new("/data")) {
            Ok(_) => panic!("unknown processor must be rejected"),
            Err(e) => e,
        };
        match err {
            CoffeeLeafError::UnknownProcessor { name, available } => {
                assert_eq!(name, "Triplet");
                assert_eq!(available, "Siamese1x1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
