use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::dataprocess::{ImagePair, ImageRecord, SplitRatios};
use crate::errors::{CoffeeLeafError, Result};

/// Lifecycle of a dataset processor. Each stage requires the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProcessorState {
    Empty,
    Processed,
    Split,
    Paired,
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Empty => "empty",
            Self::Processed => "processed",
            Self::Split => "split",
            Self::Paired => "paired",
        };
        f.write_str(name)
    }
}

/// Which part of a split dataset to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataSplit {
    Train,
    Val,
    Test,
}

impl DataSplit {
    pub const ALL: [DataSplit; 3] = [DataSplit::Train, DataSplit::Val, DataSplit::Test];

    /// Base name of the CSV file this split is persisted to.
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Train => "train",
            Self::Val => "val",
            Self::Test => "test",
        }
    }
}

impl fmt::Display for DataSplit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

impl FromStr for DataSplit {
    type Err = CoffeeLeafError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "TRAIN" => Ok(Self::Train),
            "VAL" | "VALIDATION" => Ok(Self::Val),
            "TEST" => Ok(Self::Test),
            _ => Err(CoffeeLeafError::validation(
                "split",
                format!("`{s}` is not one of TRAIN, VAL, TEST"),
            )),
        }
    }
}

/// A dataset processor turns a labeled image tree into model-ready splits.
///
/// Operations are ordered: `build_data`, then `split_data`, then
/// `make_pairs`. `load_data` restores a processor from a previous `save`.
pub trait DataProcessor: Send + Sync {
    /// Registry name used by the factory.
    fn process_name(&self) -> &'static str;

    fn state(&self) -> ProcessorState;

    /// Scan the data root and collect labeled images. Returns the image count.
    fn build_data(&mut self) -> Result<usize>;

    fn split_data(
        &mut self,
        ratios: SplitRatios,
        seed: u64,
        shuffle: bool,
        stratify: bool,
    ) -> Result<()>;

    /// Build training pairs. Returns the number of pairs.
    fn make_pairs(&mut self) -> Result<usize>;

    fn get_data(&self, split: DataSplit) -> Result<&[ImageRecord]>;

    fn pairs(&self) -> Result<&[ImagePair]>;

    fn class_names(&self) -> &[String];

    fn save(&self, dump_dir: &Path) -> Result<()>;

    fn load_data(&mut self, dump_dir: &Path) -> Result<()>;
}
