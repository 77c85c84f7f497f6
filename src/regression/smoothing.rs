// Windowed convolution smoothing
//
// Benchmark histories carry one-off spikes (a noisy CI host, a cold cache)
// that would otherwise read as step changes. The series is reflected at both
// ends, convolved with a normalized window and returned in "valid" mode.

use crate::regression::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

/// Window shape used by [`smooth`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kernel {
    /// Uniform weights (moving average)
    Flat,
    /// Raised cosine touching zero at both ends
    Hanning,
    /// Raised cosine with a 0.08 pedestal
    Hamming,
    /// Triangular window
    Bartlett,
    /// Three-term cosine window
    Blackman,
}

impl Kernel {
    /// All supported kernels
    pub const ALL: [Kernel; 5] = [
        Kernel::Flat,
        Kernel::Hanning,
        Kernel::Hamming,
        Kernel::Bartlett,
        Kernel::Blackman,
    ];

    /// Lowercase name as accepted by `FromStr`
    pub fn name(self) -> &'static str {
        match self {
            Kernel::Flat => "flat",
            Kernel::Hanning => "hanning",
            Kernel::Hamming => "hamming",
            Kernel::Bartlett => "bartlett",
            Kernel::Blackman => "blackman",
        }
    }

    /// Un-normalized window weights of length `len`
    pub fn weights(self, len: usize) -> Vec<f64> {
        if len == 0 {
            return Vec::new();
        }
        if len == 1 {
            return vec![1.0];
        }

        let m = (len - 1) as f64;
        (0..len)
            .map(|k| {
                let k = k as f64;
                match self {
                    Kernel::Flat => 1.0,
                    Kernel::Hanning => 0.5 - 0.5 * (2.0 * PI * k / m).cos(),
                    Kernel::Hamming => 0.54 - 0.46 * (2.0 * PI * k / m).cos(),
                    Kernel::Bartlett => 1.0 - (2.0 * k / m - 1.0).abs(),
                    Kernel::Blackman => {
                        0.42 - 0.5 * (2.0 * PI * k / m).cos() + 0.08 * (4.0 * PI * k / m).cos()
                    }
                }
            })
            .collect()
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Kernel::ALL
            .into_iter()
            .find(|k| k.name() == s)
            .ok_or_else(|| {
                AnalysisError::InvalidInput(format!(
                    "unknown kernel '{}', expected one of flat, hanning, hamming, bartlett, blackman",
                    s
                ))
            })
    }
}

/// Smoothing parameters for one analysis run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Window length; values below 3 disable smoothing
    pub window_len: usize,
    pub kernel: Kernel,
}

impl SmoothingConfig {
    pub fn new(window_len: usize, kernel: Kernel) -> Self {
        Self { window_len, kernel }
    }

    /// Apply this configuration to `samples`
    pub fn apply(&self, samples: &[f64]) -> Result<Vec<f64>, AnalysisError> {
        smooth(samples, self.window_len, self.kernel)
    }
}

/// Smooth `samples` with a normalized window of `window_len` points.
///
/// The result is `samples.len() + window_len - 1` long because of the
/// reflected padding; index into it by position, not by raw sample index.
///
/// # Errors
/// `InvalidInput` for an empty series, or when the series is shorter than
/// the window.
///
/// # Example
/// ```
/// use benchwatch::regression::{smooth, Kernel};
///
/// let raw = vec![1.0, 1.0, 9.0, 1.0, 1.0];
/// let smoothed = smooth(&raw, 3, Kernel::Flat).unwrap();
/// assert_eq!(smoothed.len(), raw.len() + 2);
/// assert!(smoothed.iter().all(|v| *v < 9.0));
///
/// // Windows below 3 leave the series untouched
/// assert_eq!(smooth(&raw, 2, Kernel::Hanning).unwrap(), raw);
/// ```
pub fn smooth(samples: &[f64], window_len: usize, kernel: Kernel) -> Result<Vec<f64>, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot smooth an empty series".to_string(),
        ));
    }

    if window_len < 3 {
        return Ok(samples.to_vec());
    }

    if samples.len() < window_len {
        return Err(AnalysisError::InvalidInput(format!(
            "series of {} samples is shorter than the smoothing window ({})",
            samples.len(),
            window_len
        )));
    }

    let padded = reflect(samples, window_len - 1);

    let mut weights = kernel.weights(window_len);
    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }

    Ok(convolve_valid(&weights, &padded))
}

// x[pad], ..., x[1] ++ x ++ x[n-2], ..., x[n-1-pad]
fn reflect(samples: &[f64], pad: usize) -> Vec<f64> {
    let n = samples.len();
    let mut padded = Vec::with_capacity(n + 2 * pad);
    padded.extend(samples[1..=pad].iter().rev());
    padded.extend_from_slice(samples);
    padded.extend(samples[n - 1 - pad..n - 1].iter().rev());
    padded
}

/// Discrete linear convolution in "valid" mode.
///
/// Only positions where the shorter operand fully overlaps the longer one are
/// produced, giving `max(a, b) - min(a, b) + 1` values. The operands are
/// interchangeable, so a kernel longer than the signal is fine.
pub fn convolve_valid(a: &[f64], b: &[f64]) -> Vec<f64> {
    let (long, short) = if a.len() >= b.len() { (a, b) } else { (b, a) };
    if short.is_empty() {
        return Vec::new();
    }

    let s = short.len();
    (0..=long.len() - s)
        .map(|k| {
            short
                .iter()
                .enumerate()
                .map(|(j, w)| w * long[k + s - 1 - j])
                .sum::<f64>()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_window_is_identity() {
        let raw = vec![3.0, 1.0, 4.0, 1.0, 5.0];
        for len in 0..3 {
            assert_eq!(smooth(&raw, len, Kernel::Hanning).unwrap(), raw);
        }
    }

    #[test]
    fn test_empty_series_rejected() {
        assert!(matches!(
            smooth(&[], 5, Kernel::Hanning),
            Err(AnalysisError::InvalidInput(_))
        ));
        assert!(smooth(&[], 1, Kernel::Flat).is_err());
    }

    #[test]
    fn test_series_shorter_than_window_rejected() {
        let raw = vec![1.0, 2.0, 3.0];
        assert!(matches!(
            smooth(&raw, 5, Kernel::Flat),
            Err(AnalysisError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_output_length_includes_padding() {
        let raw: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let smoothed = smooth(&raw, 9, Kernel::Hanning).unwrap();
        assert_eq!(smoothed.len(), raw.len() + 8);
    }

    #[test]
    fn test_constant_series_unchanged_in_value() {
        let raw = vec![7.0; 12];
        for kernel in Kernel::ALL {
            let smoothed = smooth(&raw, 5, kernel).unwrap();
            assert!(
                smoothed.iter().all(|v| (v - 7.0).abs() < 1e-9),
                "{} changed a constant series: {:?}",
                kernel,
                smoothed
            );
        }
    }

    #[test]
    fn test_flat_kernel_is_moving_average() {
        // Reflected: [3, 2, 1, 2, 3, 4, 3, 2] -> 3-point means
        let raw = vec![1.0, 2.0, 3.0, 4.0];
        let smoothed = smooth(&raw, 3, Kernel::Flat).unwrap();
        let expected = [5.0 / 3.0, 2.0, 3.0, 10.0 / 3.0];
        assert_eq!(smoothed.len(), 6);
        for (got, want) in smoothed[1..5].iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn test_spike_is_damped() {
        let mut raw = vec![10.0; 15];
        raw[7] = 100.0;
        let smoothed = smooth(&raw, 5, Kernel::Hanning).unwrap();
        let peak = smoothed.iter().cloned().fold(f64::MIN, f64::max);
        assert!(peak < 60.0, "spike should be halved, got {}", peak);
    }

    #[test]
    fn test_kernel_weights_shapes() {
        let hanning = Kernel::Hanning.weights(5);
        assert!(hanning[0].abs() < 1e-12);
        assert!((hanning[2] - 1.0).abs() < 1e-12);

        let hamming = Kernel::Hamming.weights(5);
        assert!((hamming[0] - 0.08).abs() < 1e-12);

        let bartlett = Kernel::Bartlett.weights(5);
        assert_eq!(bartlett, vec![0.0, 0.5, 1.0, 0.5, 0.0]);

        let blackman = Kernel::Blackman.weights(5);
        assert!(blackman[0].abs() < 1e-12);
        assert!((blackman[2] - 1.0).abs() < 1e-12);

        assert_eq!(Kernel::Flat.weights(3), vec![1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_kernel_from_str() {
        assert_eq!("hanning".parse::<Kernel>().unwrap(), Kernel::Hanning);
        assert_eq!("flat".parse::<Kernel>().unwrap(), Kernel::Flat);
        assert!("gaussian".parse::<Kernel>().is_err());
    }

    #[test]
    fn test_convolve_valid_lengths() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![1.0, 1.0, 1.0, 1.0, 1.0];
        assert_eq!(convolve_valid(&a, &b).len(), 3);
        assert_eq!(convolve_valid(&b, &a), convolve_valid(&a, &b));
        assert!(convolve_valid(&a, &[]).is_empty());
    }

    #[test]
    fn test_convolve_valid_flips_kernel() {
        // numpy.convolve([1, 2, 3], [0, 1], 'valid') == [1, 2]
        assert_eq!(convolve_valid(&[1.0, 2.0, 3.0], &[0.0, 1.0]), vec![1.0, 2.0]);
    }

    #[test]
    fn test_smoothing_config_apply() {
        let config = SmoothingConfig::new(3, Kernel::Bartlett);
        let raw = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(
            config.apply(&raw).unwrap(),
            smooth(&raw, 3, Kernel::Bartlett).unwrap()
        );
    }
}
