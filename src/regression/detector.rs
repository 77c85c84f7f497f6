// Two-stage sliding-window regression detector
//
// The smoothed series is split into history (everything before the trailing
// window) and the window itself. A rank-sum test screens for a shift; only a
// hit there is confirmed with Welch's t-test. Both must fall below alpha.

use crate::regression::error::AnalysisError;
use crate::regression::statistics::{mann_whitney_u, welch_t_test, TestOutcome};
use serde::Serialize;

/// Verdict of the two-stage test with the evidence behind it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Detection {
    /// True only when both stages are significant
    pub regressed: bool,

    /// Stage 1: Mann-Whitney U between history and window
    pub rank_test: TestOutcome,

    /// Stage 2: Welch's t-test, run only when stage 1 is significant
    pub t_test: Option<TestOutcome>,
}

/// Split `series` into (history, window) with the window holding the last
/// `window_size` values.
///
/// # Errors
/// `InsufficientData` when the history would be empty.
pub fn split_window(series: &[f64], window_size: usize) -> Result<(&[f64], &[f64]), AnalysisError> {
    if series.len() <= window_size {
        return Err(AnalysisError::InsufficientData {
            required: window_size + 1,
            actual: series.len(),
        });
    }
    Ok(series.split_at(series.len() - window_size))
}

/// Run the two-stage test on `smoothed` with a trailing window of
/// `window_size` samples at significance level `alpha`.
///
/// # Errors
/// `InsufficientData` when `smoothed.len() <= window_size` or when either
/// segment has fewer than 2 samples.
///
/// # Example
/// ```
/// use benchwatch::regression::detect;
///
/// let mut series = vec![100.0; 40];
/// series.extend(vec![200.0; 10]);
///
/// let detection = detect(&series, 10, 0.05).unwrap();
/// assert!(detection.regressed);
/// assert!(detection.t_test.is_some());
/// ```
pub fn detect(smoothed: &[f64], window_size: usize, alpha: f64) -> Result<Detection, AnalysisError> {
    let (history, window) = split_window(smoothed, window_size)?;

    let rank_test = mann_whitney_u(history, window)?;
    tracing::debug!(
        history = history.len(),
        window = window.len(),
        u = rank_test.statistic,
        p = rank_test.pvalue,
        "Mann-Whitney U stage"
    );

    if !rank_test.is_significant(alpha) {
        return Ok(Detection {
            regressed: false,
            rank_test,
            t_test: None,
        });
    }

    tracing::debug!("Step change possibly found, confirming with Welch's t-test");
    let t_test = welch_t_test(history, window)?;
    tracing::debug!(t = t_test.statistic, p = t_test.pvalue, "Welch t-test stage");

    let regressed = t_test.is_significant(alpha);
    if !regressed {
        tracing::debug!("Rank-test hit not confirmed, treating as noise");
    }

    Ok(Detection {
        regressed,
        rank_test,
        t_test: Some(t_test),
    })
}

/// Boolean form of [`detect`]
pub fn is_regression(smoothed: &[f64], window_size: usize, alpha: f64) -> Result<bool, AnalysisError> {
    detect(smoothed, window_size, alpha).map(|d| d.regressed)
}
