//! CLI argument parsing for benchwatch

use crate::ingest::RecordSelection;
use crate::regression::AnalysisConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Format of the summary printed to stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "benchwatch")]
#[command(version)]
#[command(
    about = "Detect performance regressions in Google Benchmark result history",
    long_about = None
)]
pub struct Cli {
    /// Directory containing benchmark result JSON files
    #[arg(short = 'd', long = "directory", value_name = "DIR", default_value = ".")]
    pub directory: PathBuf,

    /// Number of most recent builds tested against the history
    #[arg(short = 'w', long = "sliding-window", value_name = "N", default_value = "6")]
    pub sliding_window: usize,

    /// Only use the N most recent result files (0 = all)
    #[arg(short = 's', long = "max-samples", value_name = "N", default_value = "0")]
    pub max_samples: usize,

    /// Smoothing window length (values below 3 disable smoothing)
    #[arg(short = 'f', long = "median-filter", value_name = "N", default_value = "9")]
    pub median_filter: usize,

    /// Significance level for both statistical tests
    #[arg(short = 'a', long = "alpha", value_name = "ALPHA", default_value = "0.05")]
    pub alpha: f64,

    /// Ignore the N most recent result files
    #[arg(short = 'x', long = "discard", value_name = "N")]
    pub discard: Option<usize>,

    /// First result file to use, by position in time order (with --end-index)
    #[arg(long = "start-index", value_name = "INDEX", requires = "end_index")]
    pub start_index: Option<usize>,

    /// One past the last result file to use (with --start-index)
    #[arg(long = "end-index", value_name = "INDEX", requires = "start_index")]
    pub end_index: Option<usize>,

    /// Benchmark metric to track
    #[arg(short = 'm', long = "metric", value_name = "FIELD", default_value = "real_time")]
    pub metric: String,

    /// Directory for plots and index.html
    #[arg(short = 'o', long = "output-directory", value_name = "DIR", default_value = ".")]
    pub output_directory: PathBuf,

    /// Summary format on stdout (text or json)
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Enable trace-level logging on stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Detector settings from the flags
    pub fn to_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            window_size: self.sliding_window,
            filter_length: self.median_filter,
            significance_level: self.alpha,
            metric: self.metric.clone(),
        }
    }

    /// Result-file selection from the flags
    pub fn to_selection(&self) -> RecordSelection {
        RecordSelection {
            start_index: self.start_index,
            end_index: self.end_index,
            discard: self.discard,
            max_samples: self.max_samples,
        }
    }
}
