use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

use crate::dataprocess::{available_processors, SplitRatios};
use crate::errors::Result;
use crate::image_processor::{DEFAULT_HEIGHT, DEFAULT_WIDTH};

#[derive(Parser, Debug, Clone)]
#[command(
    version,
    about = "Dataset preparation for a coffee leaf disease classifier",
    long_about = None
)]
pub struct Config {
    /// Path to the dataset repository
    #[arg(long = "data_path", default_value = "/path/to/coffeedata")]
    pub data_path: PathBuf,

    /// Build the dataset with the named processor
    #[arg(
        long = "build_data",
        value_name = "PROCESSOR",
        conflicts_with = "load_data",
        value_parser = check_processor
    )]
    pub build_data: Option<String>,

    /// Load a previously built dataset from the dump path
    #[arg(long = "load_data", value_name = "PROCESSOR", value_parser = check_processor)]
    pub load_data: Option<String>,

    /// Number of total epochs to run
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    pub epochs: u32,

    /// Batch size for training
    #[arg(long = "batch_size", default_value_t = 64, value_parser = clap::value_parser!(u32).range(1..))]
    pub batch_size: u32,

    /// Experiment dump path for generated splits and pairs
    #[arg(long = "dump_path", default_value = ".")]
    pub dump_path: PathBuf,

    #[arg(long, default_value_t = 31)]
    pub seed: u64,

    /// Fraction of each class held out of training
    #[arg(long = "split_ratio", default_value_t = 0.2, value_parser = check_ratio)]
    pub split_ratio: f64,

    /// Fraction of the held-out images that go to test
    #[arg(long = "sub_split_ratio", default_value_t = 0.5, value_parser = check_ratio)]
    pub sub_split_ratio: f64,

    #[arg(long = "no_shuffle")]
    pub no_shuffle: bool,

    #[arg(long = "no_stratify")]
    pub no_stratify: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Report whether a path is accessible
    Check { path: PathBuf },

    /// Remove the contents of a folder, keeping the folder itself
    Clean {
        folder: PathBuf,

        /// Also remove subdirectories
        #[arg(short, long)]
        recurse: bool,
    },

    /// Count images per class folder
    Counts {
        data_dir: PathBuf,

        #[arg(long = "class", value_name = "NAME")]
        classes: Vec<String>,
    },

    /// Write an image metadata CSV
    Metadata {
        data_dir: PathBuf,

        output_dir: PathBuf,

        #[arg(default_value = "metadata.csv")]
        file_name: String,

        #[arg(long = "class", value_name = "NAME")]
        classes: Vec<String>,
    },

    /// Read every metadata CSV in a folder
    Load { input_dir: PathBuf },

    /// Resize every image of the given classes
    Resize {
        input_dir: PathBuf,

        output_dir: PathBuf,

        #[arg(long = "class", value_name = "NAME")]
        classes: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_WIDTH, value_parser = clap::value_parser!(u32).range(1..))]
        width: u32,

        #[arg(long, default_value_t = DEFAULT_HEIGHT, value_parser = clap::value_parser!(u32).range(1..))]
        height: u32,
    },

    /// Write 0, 90, 180 and 270 degree rotations of every image
    Rotate {
        input_dir: PathBuf,

        output_dir: PathBuf,

        #[arg(long = "class", value_name = "NAME")]
        classes: Vec<String>,
    },

    /// Save a contact sheet of random images per class from a metadata CSV
    Montage {
        csv_file: PathBuf,

        #[arg(default_value = "montage.png")]
        output: PathBuf,

        #[arg(long = "class", value_name = "NAME", required = true)]
        classes: Vec<String>,

        /// Images per class
        #[arg(long, default_value_t = 5)]
        size: usize,

        /// Tile edge in pixels
        #[arg(long, default_value_t = 150, value_parser = clap::value_parser!(u32).range(1..))]
        tile: u32,
    },
}

impl Config {
    pub fn split_ratios(&self) -> Result<SplitRatios> {
        SplitRatios::new(self.split_ratio, self.sub_split_ratio)
    }

    /// Default log filter for the chosen verbosity; `RUST_LOG` wins when set.
    pub const fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// `Some` only when a class filter was given on the command line.
pub fn class_filter(classes: &[String]) -> Option<&[String]> {
    (!classes.is_empty()).then_some(classes)
}

fn check_processor(s: &str) -> std::result::Result<String, String> {
    let available = available_processors();
    if available.iter().any(|name| *name == s) {
        Ok(s.to_string())
    } else {
        Err(format!(
            "{} is not a known processor. Available: {}",
            s,
            available.join(", ")
        ))
    }
}

fn check_ratio(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{s} is not a number: {e}"))?;
    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("{value} must be strictly between 0 and 1"))
    }
}
