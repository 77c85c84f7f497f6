// Sliding-window regression detection over benchmark history
//
// Pipeline, per benchmark:
//   raw samples -> smoothing (windowed convolution)
//               -> two-stage test: Mann-Whitney U, then Welch's t-test,
//                  history vs trailing window
//               -> step localization (step-kernel convolution, last peak)
//               -> slowdown / speedup / inconclusive
//
// Nothing in this module touches the filesystem or renders output; the
// result is plain data for the plot and report layers.
//
// Implementation:
// - Uses aprender (crates.io) for the segment median
// - Uses statrs for the Student's t tail of Welch's t-test
// - Uses trueno (crates.io) for segment mean/variance
// - Uses libm for the normal tail of the rank-sum test

mod analyzer;
mod change_point;
mod config;
mod detector;
mod error;
mod smoothing;
mod statistics;

pub use analyzer::{
    analyze_all, classify_step, AnalyzedBenchmark, BenchmarkAnalyzer, BenchmarkSeries,
    BenchmarkSet, BenchmarkState, DetectionResult, StepDirection, StepEstimate,
};
pub use change_point::{estimate_step_index, step_response, turning_points};
pub use config::{AnalysisConfig, MIN_HISTORY_SAMPLES};
pub use detector::{detect, is_regression, split_window, Detection};
pub use error::AnalysisError;
pub use smoothing::{convolve_valid, smooth, Kernel, SmoothingConfig};
pub use statistics::{mann_whitney_u, median, summarize, welch_t_test, SegmentSummary, TestOutcome};

#[cfg(test)]
mod tests;
