// Per-benchmark analysis and batch orchestration
//
// Pending -> Skipped (too few samples)
//         -> Smoothed -> NotRegressed
//                     -> Regressed -> LocatedSlowdown | LocatedSpeedup | LocatedInconclusive
//
// Each benchmark is analyzed independently; a benchmark either yields a full
// AnalyzedBenchmark or nothing. Skipped is the `Ok(None)` from `analyze`, so
// it never appears as a BenchmarkState.

use crate::regression::change_point::estimate_step_index;
use crate::regression::config::AnalysisConfig;
use crate::regression::detector::{detect, split_window};
use crate::regression::error::AnalysisError;
use crate::regression::smoothing::{Kernel, SmoothingConfig};
use crate::regression::statistics::{summarize, SegmentSummary, TestOutcome};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Benchmark name -> samples in chronological order.
///
/// Iteration follows first insertion, which is the order benchmarks were
/// first seen across the input files.
pub type BenchmarkSet = IndexMap<String, Vec<f64>>;

/// Direction of a located step change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepDirection {
    /// Metric went up after the step (worse for latency-like metrics)
    Slowdown,
    /// Metric went down after the step
    Speedup,
    /// No usable step location
    Inconclusive,
}

/// Located step change in the smoothed series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepEstimate {
    /// Position within the smoothed sequence
    pub index: usize,
    pub direction: StepDirection,
}

/// Detector verdict plus step location when regressed
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionResult {
    pub regressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<StepEstimate>,
    pub rank_test: TestOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_test: Option<TestOutcome>,
}

/// Terminal state of an analyzed benchmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkState {
    NotRegressed,
    LocatedSlowdown,
    LocatedSpeedup,
    LocatedInconclusive,
}

impl BenchmarkState {
    /// Short label for reports
    pub fn label(self) -> &'static str {
        match self {
            BenchmarkState::NotRegressed => "no regression",
            BenchmarkState::LocatedSlowdown => "slowdown",
            BenchmarkState::LocatedSpeedup => "speedup",
            BenchmarkState::LocatedInconclusive => "inconclusive",
        }
    }
}

impl fmt::Display for BenchmarkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One benchmark's history
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSeries {
    pub name: String,
    pub samples: Vec<f64>,
}

impl BenchmarkSeries {
    pub fn new(name: impl Into<String>, samples: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }
}

/// Result of analyzing one benchmark; handed to plot and report rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyzedBenchmark {
    pub name: String,
    pub raw: Vec<f64>,
    pub smoothed: Vec<f64>,
    pub detection: DetectionResult,
    /// Raw samples before the window
    pub history: SegmentSummary,
    /// Raw samples in the window
    pub window: SegmentSummary,
}

impl AnalyzedBenchmark {
    /// A regressed result without a step location counts as inconclusive
    pub fn state(&self) -> BenchmarkState {
        if !self.detection.regressed {
            return BenchmarkState::NotRegressed;
        }

        match self.detection.step.map(|s| s.direction) {
            Some(StepDirection::Slowdown) => BenchmarkState::LocatedSlowdown,
            Some(StepDirection::Speedup) => BenchmarkState::LocatedSpeedup,
            Some(StepDirection::Inconclusive) | None => BenchmarkState::LocatedInconclusive,
        }
    }

    pub fn is_slowdown(&self) -> bool {
        self.state() == BenchmarkState::LocatedSlowdown
    }

    /// Step index for located slowdowns and speedups
    pub fn step_index(&self) -> Option<usize> {
        self.detection
            .step
            .filter(|s| s.direction != StepDirection::Inconclusive)
            .map(|s| s.index)
    }

    /// How many builds back from the newest the step happened
    pub fn builds_since_step(&self) -> Option<usize> {
        self.step_index()
            .map(|index| self.raw.len().saturating_sub(index))
    }
}

/// Classify the step at `index` of `smoothed`.
///
/// `sample_count` is the raw series length. Index 0, an index at or past
/// the raw length, or one without a right neighbour in the smoothed series
/// is inconclusive. Otherwise the values either side of the step decide.
pub fn classify_step(smoothed: &[f64], index: usize, sample_count: usize) -> StepDirection {
    if index == 0 || index >= sample_count || index + 1 >= smoothed.len() {
        return StepDirection::Inconclusive;
    }

    if smoothed[index + 1] > smoothed[index - 1] {
        StepDirection::Slowdown
    } else {
        StepDirection::Speedup
    }
}

/// Runs the per-benchmark state machine for one configuration
#[derive(Debug, Clone)]
pub struct BenchmarkAnalyzer {
    config: AnalysisConfig,
    smoothing: SmoothingConfig,
}

impl BenchmarkAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        let smoothing = SmoothingConfig::new(config.filter_length, Kernel::Hanning);
        Self { config, smoothing }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze one benchmark.
    ///
    /// Returns `Ok(None)` when the benchmark has fewer than
    /// [`AnalysisConfig::min_samples`] samples.
    ///
    /// # Errors
    /// `InvalidInput` when smoothing rejects the series (e.g. a filter
    /// length longer than the series), `InsufficientData` when a test segment
    /// is too small (a window of one sample).
    pub fn analyze(&self, series: &BenchmarkSeries) -> Result<Option<AnalyzedBenchmark>, AnalysisError> {
        let sample_count = series.samples.len();
        tracing::debug!(
            benchmark = %series.name,
            samples = sample_count,
            "Found benchmark records"
        );

        if sample_count < self.config.min_samples() {
            tracing::info!(
                benchmark = %series.name,
                samples = sample_count,
                required = self.config.min_samples(),
                "Benchmark needs more data, skipping"
            );
            return Ok(None);
        }

        let smoothed = self.smoothing.apply(&series.samples)?;
        let detection = detect(
            &smoothed,
            self.config.window_size,
            self.config.significance_level,
        )?;

        let step = if detection.regressed {
            let index = estimate_step_index(&smoothed);
            let direction = classify_step(&smoothed, index, sample_count);
            self.log_step(&series.name, index, direction, sample_count);
            Some(StepEstimate { index, direction })
        } else {
            None
        };

        let (history, window) = split_window(&series.samples, self.config.window_size)?;

        Ok(Some(AnalyzedBenchmark {
            name: series.name.clone(),
            raw: series.samples.clone(),
            smoothed,
            detection: DetectionResult {
                regressed: detection.regressed,
                step,
                rank_test: detection.rank_test,
                t_test: detection.t_test,
            },
            history: summarize(history)?,
            window: summarize(window)?,
        }))
    }

    fn log_step(&self, name: &str, index: usize, direction: StepDirection, sample_count: usize) {
        match direction {
            StepDirection::Slowdown => tracing::warn!(
                benchmark = %name,
                step_index = index,
                "Step change in performance (slowdown), likely within the last {} builds",
                sample_count - index
            ),
            StepDirection::Speedup => tracing::info!(
                benchmark = %name,
                step_index = index,
                "Step change in performance (speedup), ignoring"
            ),
            StepDirection::Inconclusive => tracing::info!(
                benchmark = %name,
                step_index = index,
                "Step location inconclusive, likely speedup, ignoring"
            ),
        }
    }

    /// Analyze every benchmark in `set`, one at a time, in set order.
    ///
    /// Skipped benchmarks and benchmarks with too-small test segments are
    /// left out of the result.
    ///
    /// # Errors
    /// Stops at the first `InvalidInput`.
    pub fn analyze_all(&self, set: &BenchmarkSet) -> Result<Vec<AnalyzedBenchmark>, AnalysisError> {
        let mut analyzed = Vec::new();

        for (name, samples) in set {
            let series = BenchmarkSeries::new(name.clone(), samples.clone());
            match self.analyze(&series) {
                Ok(Some(result)) => analyzed.push(result),
                Ok(None) => {}
                Err(e @ AnalysisError::InsufficientData { .. }) => {
                    tracing::warn!(benchmark = %name, "Skipping benchmark: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        Ok(analyzed)
    }
}

/// Analyze every benchmark in `set` with `config`.
///
/// # Example
/// ```
/// use benchwatch::regression::{analyze_all, AnalysisConfig, BenchmarkSet, BenchmarkState};
///
/// let mut samples = vec![1.0; 30];
/// samples.extend(vec![5.0; 6]);
///
/// let mut set = BenchmarkSet::new();
/// set.insert("bench_a".to_string(), samples);
/// set.insert("too_short".to_string(), vec![1.0; 5]);
///
/// let config = AnalysisConfig {
///     filter_length: 5,
///     ..AnalysisConfig::default()
/// };
/// let results = analyze_all(&set, &config).unwrap();
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[0].state(), BenchmarkState::LocatedSlowdown);
/// ```
pub fn analyze_all(set: &BenchmarkSet, config: &AnalysisConfig) -> Result<Vec<AnalyzedBenchmark>, AnalysisError> {
    BenchmarkAnalyzer::new(config.clone()).analyze_all(set)
}
