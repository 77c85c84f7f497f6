// Step-change localization
//
// The mean-centered series is convolved with a step kernel (+1 over one
// series length, -1 over the next). The response peaks where the level
// shifts, and the most recent peak is reported: callers want to know where
// the *current* regression started, not every historical shift.

use crate::regression::smoothing::convolve_valid;

/// Local extrema of `values`: (peaks, troughs).
///
/// A peak has both neighbours strictly lower, a trough both strictly higher.
/// The first and last positions are never extrema.
pub fn turning_points(values: &[f64]) -> (Vec<usize>, Vec<usize>) {
    let mut peaks = Vec::new();
    let mut troughs = Vec::new();

    for (i, w) in values.windows(3).enumerate() {
        let (prev, cur, next) = (w[0], w[1], w[2]);
        if prev < cur && next < cur {
            peaks.push(i + 1);
        } else if prev > cur && next > cur {
            troughs.push(i + 1);
        }
    }

    (peaks, troughs)
}

/// Response of the mean-centered series to the step kernel.
///
/// Length is `values.len() + 1`.
pub fn step_response(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let centered: Vec<f64> = values.iter().map(|v| v - mean).collect();

    let n = centered.len();
    let step: Vec<f64> = std::iter::repeat(1.0)
        .take(n)
        .chain(std::iter::repeat(-1.0).take(n))
        .collect();

    convolve_valid(&centered, &step)
}

/// Estimate the index of the most recent step change in `values`.
///
/// Returns 0 when the step response has no peak. The index is in the
/// coordinate space of `values` (the smoothed series when called by the
/// analyzer).
///
/// # Example
/// ```
/// use benchwatch::regression::estimate_step_index;
///
/// let mut series = vec![0.0; 50];
/// series.extend(vec![10.0; 50]);
/// let index = estimate_step_index(&series);
/// assert!((47..=53).contains(&index));
/// ```
pub fn estimate_step_index(values: &[f64]) -> usize {
    let response = step_response(values);
    let (peaks, _troughs) = turning_points(&response);

    match peaks.last() {
        Some(&index) => {
            tracing::trace!(
                peaks = peaks.len(),
                index,
                "Step response peaks located"
            );
            index
        }
        None => 0,
    }
}
