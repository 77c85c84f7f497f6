// Error taxonomy for the regression-detection pipeline

use thiserror::Error;

/// Errors raised by the smoothing, detection and analysis stages
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed sequence or parameter handed to a pipeline stage.
    ///
    /// The analyzer filters series by its minimum-data floor before smoothing,
    /// so reaching this variant from `analyze_all` means a caller contract was
    /// broken (e.g. a filter length longer than the series).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A history or window segment is too small for a statistical test
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },
}
