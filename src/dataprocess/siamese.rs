use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::pairs::make_siamese_pairs;
use super::split::{split_records, SplitOutcome, SplitRatios};
use super::{ImagePair, ImageRecord};
use crate::errors::{CoffeeLeafError, Result};
use crate::traits::{DataProcessor, DataSplit, ProcessorState};
use crate::utils::{collect_image_files, list_class_dirs, read_csv, seeded_rng, write_csv};

const PAIRS_FILE: &str = "pairs.csv";

/// Processor for similarity learning with one positive and one negative
/// pair per training image.
#[derive(Debug, Clone)]
pub struct SiameseDataProcessor {
    root_dir: PathBuf,
    train_dir: PathBuf,
    test_dir: PathBuf,
    class_names: Vec<String>,
    records: Vec<ImageRecord>,
    splits: SplitOutcome,
    pairs: Vec<ImagePair>,
    seed: u64,
    state: ProcessorState,
}

impl SiameseDataProcessor {
    pub const PROCESS_NAME: &'static str = "Siamese1x1";

    pub fn new(data_folder: impl AsRef<Path>) -> Self {
        let root_dir = data_folder.as_ref().to_path_buf();
        Self {
            train_dir: root_dir.join("train"),
            test_dir: root_dir.join("test"),
            root_dir,
            class_names: Vec::new(),
            records: Vec::new(),
            splits: SplitOutcome::default(),
            pairs: Vec::new(),
            seed: 0,
            state: ProcessorState::Empty,
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn train_dir(&self) -> &Path {
        &self.train_dir
    }

    pub fn set_train_dir(&mut self, folder: impl Into<PathBuf>) {
        self.train_dir = folder.into();
    }

    pub fn test_dir(&self) -> &Path {
        &self.test_dir
    }

    pub fn set_test_dir(&mut self, folder: impl Into<PathBuf>) {
        self.test_dir = folder.into();
    }

    pub fn records(&self) -> &[ImageRecord] {
        &self.records
    }

    fn require(&self, operation: &str, required: ProcessorState) -> Result<()> {
        if self.state >= required {
            Ok(())
        } else {
            Err(CoffeeLeafError::InvalidState {
                operation: operation.to_string(),
                required,
                current: self.state,
            })
        }
    }
}

impl DataProcessor for SiameseDataProcessor {
    fn process_name(&self) -> &'static str {
        Self::PROCESS_NAME
    }

    fn state(&self) -> ProcessorState {
        self.state
    }

    fn build_data(&mut self) -> Result<usize> {
        let class_dirs: Vec<PathBuf> = list_class_dirs(&self.root_dir, None)?
            .into_iter()
            .filter(|dir| *dir != self.train_dir && *dir != self.test_dir)
            .collect();

        let mut class_names = Vec::with_capacity(class_dirs.len());
        let mut records = Vec::new();
        for class_dir in &class_dirs {
            let files = collect_image_files(class_dir, true)?;
            if files.is_empty() {
                debug!("Skipping {} (no images)", class_dir.display());
                continue;
            }

            let label = class_names.len();
            let class_name = class_dir
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            records.extend(files.into_iter().map(|path| ImageRecord {
                path,
                class_name: class_name.clone(),
                label,
            }));
            class_names.push(class_name);
        }

        if records.is_empty() {
            return Err(CoffeeLeafError::validation(
                "data_path",
                format!("no images found under {}", self.root_dir.display()),
            ));
        }

        info!(
            "Found {} images in {} classes under {}",
            records.len(),
            class_names.len(),
            self.root_dir.display()
        );

        self.class_names = class_names;
        self.records = records;
        self.splits = SplitOutcome::default();
        self.pairs.clear();
        self.state = ProcessorState::Processed;
        Ok(self.records.len())
    }

    fn split_data(
        &mut self,
        ratios: SplitRatios,
        seed: u64,
        shuffle: bool,
        stratify: bool,
    ) -> Result<()> {
        self.require("split_data", ProcessorState::Processed)?;

        self.splits = split_records(&self.records, &ratios, seed, shuffle, stratify);
        self.seed = seed;
        self.pairs.clear();
        self.state = ProcessorState::Split;

        info!(
            "Split {} images: train={} val={} test={}",
            self.records.len(),
            self.splits.train.len(),
            self.splits.val.len(),
            self.splits.test.len()
        );
        Ok(())
    }

    fn make_pairs(&mut self) -> Result<usize> {
        self.require("make_pairs", ProcessorState::Split)?;

        // pairing draws from its own stream so it does not replay the split shuffle
        let mut rng = seeded_rng(self.seed.wrapping_add(1));
        self.pairs = make_siamese_pairs(&self.splits.train, &mut rng);
        self.state = ProcessorState::Paired;

        let positives = self.pairs.iter().filter(|p| p.similar == 1).count();
        info!(
            "Built {} pairs ({} positive, {} negative)",
            self.pairs.len(),
            positives,
            self.pairs.len() - positives
        );
        Ok(self.pairs.len())
    }

    fn get_data(&self, split: DataSplit) -> Result<&[ImageRecord]> {
        self.require("get_data", ProcessorState::Split)?;
        Ok(match split {
            DataSplit::Train => &self.splits.train,
            DataSplit::Val => &self.splits.val,
            DataSplit::Test => &self.splits.test,
        })
    }

    fn pairs(&self) -> Result<&[ImagePair]> {
        self.require("pairs", ProcessorState::Paired)?;
        Ok(&self.pairs)
    }

    fn class_names(&self) -> &[String] {
        &self.class_names
    }

    fn save(&self, dump_dir: &Path) -> Result<()> {
        self.require("save", ProcessorState::Split)?;

        fs::create_dir_all(dump_dir)
            .map_err(|e| CoffeeLeafError::file_system(dump_dir, "create dump directory", e))?;

        for split in DataSplit::ALL {
            let path = dump_dir.join(format!("{}.csv", split.file_stem()));
            write_csv(&path, self.get_data(split)?)?;
        }
        let pairs_path = dump_dir.join(PAIRS_FILE);
        if self.state == ProcessorState::Paired {
            write_csv(&pairs_path, &self.pairs)?;
        } else if pairs_path.exists() {
            // a dump without pairs must not carry pairs.csv
            fs::remove_file(&pairs_path)
                .map_err(|e| CoffeeLeafError::file_system(&pairs_path, "remove stale pairs", e))?;
        }

        info!("Saved {} dataset to {}", Self::PROCESS_NAME, dump_dir.display());
        Ok(())
    }

    fn load_data(&mut self, dump_dir: &Path) -> Result<()> {
        if !dump_dir.exists() {
            return Err(CoffeeLeafError::not_found("Dump folder", dump_dir));
        }

        let mut splits = SplitOutcome::default();
        for split in DataSplit::ALL {
            let path = dump_dir.join(format!("{}.csv", split.file_stem()));
            let rows: Vec<ImageRecord> = read_csv(&path)?;
            match split {
                DataSplit::Train => splits.train = rows,
                DataSplit::Val => splits.val = rows,
                DataSplit::Test => splits.test = rows,
            }
        }

        let mut names: BTreeMap<usize, String> = BTreeMap::new();
        for record in splits.train.iter().chain(&splits.val).chain(&splits.test) {
            names
                .entry(record.label)
                .or_insert_with(|| record.class_name.clone());
        }

        let pairs_path = dump_dir.join(PAIRS_FILE);
        let (pairs, state): (Vec<ImagePair>, ProcessorState) = if pairs_path.exists() {
            (read_csv(&pairs_path)?, ProcessorState::Paired)
        } else {
            (Vec::new(), ProcessorState::Split)
        };

        self.class_names = names.into_values().collect();
        self.records = splits
            .train
            .iter()
            .chain(&splits.val)
            .chain(&splits.test)
            .cloned()
            .collect();
        self.splits = splits;
        self.pairs = pairs;
        self.state = state;

        info!(
            "Loaded {} images ({} pairs) from {}",
            self.records.len(),
            self.pairs.len(),
            dump_dir.display()
        );
        Ok(())
    }
}
