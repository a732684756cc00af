use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coffee_leaf_prep::config::class_filter;
use coffee_leaf_prep::utils::{
    check_path_exists, class_proportions, clean_folder, generate_and_save_metadata_csv,
    get_class_counts, load_data, sample_class_images, write_class_montage,
};
use coffee_leaf_prep::{
    data_processor_factory, resize_images, rotate_images, Command, Config, DataProcessor,
    DataSplit,
};

fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(config.log_filter());

    match &config.command {
        Some(command) => run_command(command, config.seed),
        None => run_pipeline(&config),
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run_pipeline(config: &Config) -> Result<()> {
    info!(
        epochs = config.epochs,
        batch_size = config.batch_size,
        seed = config.seed,
        "Run parameters"
    );

    if let Some(name) = &config.build_data {
        ensure!(
            config.data_path.exists(),
            "Data path does not exist: {}",
            config.data_path.display()
        );

        let mut processor = data_processor_factory(name, &config.data_path)?;
        processor.build_data()?;
        processor.split_data(
            config.split_ratios()?,
            config.seed,
            !config.no_shuffle,
            !config.no_stratify,
        )?;
        processor.make_pairs()?;
        processor
            .save(&config.dump_path)
            .with_context(|| format!("Failed to save dataset to {}", config.dump_path.display()))?;
        report_splits(processor.as_ref(), config.batch_size)
    } else if let Some(name) = &config.load_data {
        let mut processor = data_processor_factory(name, &config.data_path)?;
        processor
            .load_data(&config.dump_path)
            .with_context(|| format!("Failed to load dataset from {}", config.dump_path.display()))?;
        report_splits(processor.as_ref(), config.batch_size)
    } else {
        info!("Nothing to do: pass --build_data, --load_data or a subcommand");
        Ok(())
    }
}

fn report_splits(processor: &dyn DataProcessor, batch_size: u32) -> Result<()> {
    info!(
        "{} classes: {}",
        processor.class_names().len(),
        processor.class_names().join(", ")
    );
    for split in DataSplit::ALL {
        let images = processor.get_data(split)?.len();
        let batches = images.div_ceil(batch_size as usize);
        info!("{split}: {images} images, {batches} batches of {batch_size}");
    }
    if let Ok(pairs) = processor.pairs() {
        info!("pairs: {}", pairs.len());
    }
    Ok(())
}

fn run_command(command: &Command, seed: u64) -> Result<()> {
    match command {
        Command::Check { path } => {
            ensure!(check_path_exists(path), "Cannot access path: {}", path.display());
        }
        Command::Clean { folder, recurse } => {
            let removed = clean_folder(folder, *recurse);
            info!("Removed {} entries from {}", removed, folder.display());
        }
        Command::Counts { data_dir, classes } => {
            let counts = get_class_counts(data_dir, class_filter(classes))?;
            for (count, proportion) in counts.iter().zip(class_proportions(&counts)) {
                println!(
                    "{:<12} {:<24} {:>8} {:>7.2}%",
                    count.crop, count.disease, count.count, proportion.percent
                );
            }
        }
        Command::Metadata {
            data_dir,
            output_dir,
            file_name,
            classes,
        } => {
            generate_and_save_metadata_csv(data_dir, output_dir, file_name, class_filter(classes))?;
        }
        Command::Load { input_dir } => {
            let dataset = load_data(input_dir)?;
            println!("{}", dataset.len());
        }
        Command::Resize {
            input_dir,
            output_dir,
            classes,
            width,
            height,
        } => {
            resize_images(input_dir, output_dir, owned_filter(classes), *width, *height)?;
        }
        Command::Rotate {
            input_dir,
            output_dir,
            classes,
        } => {
            rotate_images(input_dir, output_dir, owned_filter(classes))?;
        }
        Command::Montage {
            csv_file,
            output,
            classes,
            size,
            tile,
        } => {
            let samples = sample_class_images(csv_file, classes, *size, seed)?;
            ensure!(!samples.is_empty(), "No images of the requested classes");
            write_class_montage(&samples, *tile, output)
                .with_context(|| format!("Failed to write montage to {}", output.display()))?;
        }
    }
    Ok(())
}

fn owned_filter(classes: &[String]) -> Option<Vec<String>> {
    class_filter(classes).map(<[String]>::to_vec)
}
