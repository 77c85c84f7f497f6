// Configuration for sliding-window regression detection
//
// One immutable value per run, built from the command line.

use serde::{Deserialize, Serialize};

/// Benchmarks need this many samples beyond the window before they are analyzed
pub const MIN_HISTORY_SAMPLES: usize = 10;

/// Configuration for a batch analysis
///
/// # Example
/// ```
/// use benchwatch::regression::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// assert_eq!(config.window_size, 6);
/// assert_eq!(config.significance_level, 0.05);
/// assert_eq!(config.min_samples(), 16);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Number of most recent samples treated as the "new" regime
    ///
    /// Default: 6
    pub window_size: usize,

    /// Smoothing window length applied before testing
    ///
    /// 0, 1 and 2 disable smoothing. Odd values keep the kernel centred.
    ///
    /// Default: 9
    pub filter_length: usize,

    /// Statistical significance level (alpha) for both test stages
    ///
    /// - 0.05 (default): typical for quiet CI hosts
    /// - 0.01: noisier environments should go lower
    pub significance_level: f64,

    /// Benchmark metric being tracked (e.g. `real_time`, `cpu_time`)
    ///
    /// Used for labelling only.
    pub metric: String,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window_size: 6,
            filter_length: 9,
            significance_level: 0.05,
            metric: "real_time".to_string(),
        }
    }
}

impl AnalysisConfig {
    /// Minimum sample count for a benchmark to be analyzed
    pub fn min_samples(&self) -> usize {
        MIN_HISTORY_SAMPLES + self.window_size
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            ));
        }

        if self.window_size == 0 {
            return Err("window_size must be >= 1, got 0".to_string());
        }

        if self.metric.trim().is_empty() {
            return Err("metric name must not be empty".to_string());
        }

        Ok(())
    }
}
