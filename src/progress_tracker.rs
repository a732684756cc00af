use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::errors::Result;

const TEMPLATE: &str =
    "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})";

/// Runs per-image work on the rayon pool behind a progress bar.
pub(crate) struct ProgressTracker {
    progress_bar: ProgressBar,
}

impl ProgressTracker {
    pub(crate) fn new(len: usize, message: &'static str) -> Self {
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::with_template(TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        progress_bar.set_message(message);

        Self { progress_bar }
    }

    /// Apply `job` to every item in parallel. Output order matches input
    /// order; the first error aborts the run.
    pub(crate) fn run<T, R, F>(&self, items: &[T], job: F) -> Result<Vec<R>>
    where
        T: Sync,
        R: Send,
        F: Fn(&T) -> Result<R> + Sync + Send,
    {
        let results = items
            .par_iter()
            .map(|item| {
                let result = job(item);
                self.progress_bar.inc(1);
                result
            })
            .collect::<Result<Vec<R>>>();

        match &results {
            Ok(_) => self.progress_bar.finish(),
            Err(_) => self.progress_bar.abandon(),
        }
        results
    }
}
