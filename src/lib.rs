pub mod config;
pub mod dataprocess;
pub mod errors;
pub mod image_processor;
pub mod imageops;
pub mod traits;
pub mod utils;

mod progress_tracker;

pub use config::{Command, Config};
pub use dataprocess::{
    data_processor_factory, ImagePair, ImageRecord, SiameseDataProcessor, SplitRatios,
};
pub use errors::{CoffeeLeafError, Result};
pub use image_processor::{resize_images, rotate_images, Augmentation, ImageProcessor};
pub use traits::*;
