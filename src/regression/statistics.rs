// Two-sample hypothesis tests for history-vs-window comparison
//
// - Mann-Whitney U (rank-sum): no normality assumption, used as the cheap
//   first stage. Normal approximation with tie and continuity correction,
//   two-sided.
// - Welch's t-test (unequal variances), used to confirm a rank-test hit.
//   Computed in f64; the tail probability comes from statrs' Student's t.
//   The rank test alone fires when the spread differs sharply between
//   segments even if the level did not move.
// - Segment summaries use trueno::Vector (mean, variance) and aprender's
//   DescriptiveStats (median).

use crate::regression::error::AnalysisError;
use aprender::stats::DescriptiveStats;
use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};
use trueno::Vector;

// Rank ties are detected with an absolute tolerance
const TIE_EPSILON: f64 = 1e-12;

/// Outcome of a two-sample test
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TestOutcome {
    /// U statistic of the first sample, or Welch's t
    pub statistic: f64,

    /// Two-sided p-value in [0, 1]
    pub pvalue: f64,
}

impl TestOutcome {
    /// Whether this outcome rejects "same distribution" at `alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.pvalue < alpha
    }
}

fn require_samples(segment: &[f64], label: &str) -> Result<(), AnalysisError> {
    if segment.len() < 2 {
        tracing::debug!(
            segment = label,
            len = segment.len(),
            "Segment too small for a two-sample test"
        );
        return Err(AnalysisError::InsufficientData {
            required: 2,
            actual: segment.len(),
        });
    }
    Ok(())
}

/// Mann-Whitney U test between `a` and `b`.
///
/// # Errors
/// `InsufficientData` if either sample has fewer than 2 values.
///
/// # Example
/// ```
/// use benchwatch::regression::mann_whitney_u;
///
/// let history = [10.0, 11.0, 10.5, 9.8, 10.2, 10.1, 9.9, 10.4];
/// let window = [20.0, 21.0, 20.5, 19.8, 20.2, 20.1];
/// let outcome = mann_whitney_u(&history, &window).unwrap();
/// assert_eq!(outcome.statistic, 0.0);
/// assert!(outcome.pvalue < 0.01);
/// ```
pub fn mann_whitney_u(a: &[f64], b: &[f64]) -> Result<TestOutcome, AnalysisError> {
    require_samples(a, "history")?;
    require_samples(b, "window")?;

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let n = n1 + n2;

    // (value, from_first_sample)
    let mut pooled: Vec<(f64, bool)> = a
        .iter()
        .map(|&v| (v, true))
        .chain(b.iter().map(|&v| (v, false)))
        .collect();
    pooled.sort_by(|x, y| x.0.total_cmp(&y.0));

    let mut rank_sum_a = 0.0;
    let mut tie_term = 0.0;
    let mut i = 0;
    while i < pooled.len() {
        let mut j = i + 1;
        while j < pooled.len() && (pooled[j].0 - pooled[i].0).abs() < TIE_EPSILON {
            j += 1;
        }

        // Tied block i..j shares the average of ranks i+1..=j
        let avg_rank = (i + 1 + j) as f64 / 2.0;
        let in_a = pooled[i..j].iter().filter(|(_, first)| *first).count();
        rank_sum_a += avg_rank * in_a as f64;

        let t = (j - i) as f64;
        tie_term += t * t * t - t;
        i = j;
    }

    let u1 = rank_sum_a - n1 * (n1 + 1.0) / 2.0;
    let mu = n1 * n2 / 2.0;
    let variance = n1 * n2 / 12.0 * ((n + 1.0) - tie_term / (n * (n - 1.0)));

    // Every value tied: no ordering evidence at all
    if variance <= 0.0 {
        return Ok(TestOutcome {
            statistic: u1,
            pvalue: 1.0,
        });
    }

    let z = ((u1 - mu).abs() - 0.5).max(0.0) / variance.sqrt();
    let pvalue = libm::erfc(z / std::f64::consts::SQRT_2).min(1.0);

    Ok(TestOutcome {
        statistic: u1,
        pvalue,
    })
}

fn is_constant(values: &[f64]) -> bool {
    values.iter().all(|v| *v == values[0])
}

/// Welch's two-sample t-test (unequal variances) between `a` and `b`.
///
/// The statistic is `(mean(a) - mean(b)) / se` with Welch-Satterthwaite
/// degrees of freedom; the two-sided p-value comes from the Student's t
/// survival function. When both samples are constant the standard error is
/// zero: the p-value is 0 if the means differ and 1 if they match.
///
/// # Errors
/// `InsufficientData` if either sample has fewer than 2 values,
/// `InvalidInput` if the degrees of freedom are not a valid t parameter.
///
/// # Example
/// ```
/// use benchwatch::regression::welch_t_test;
///
/// let history: Vec<f64> = (1..=10).map(f64::from).collect();
/// let window = [6.0, 8.0, 9.0, 12.0, 13.0, 11.0];
/// let outcome = welch_t_test(&history, &window).unwrap();
/// assert!((outcome.statistic + 3.006).abs() < 1e-3);
/// assert!((outcome.pvalue - 0.0110).abs() < 1e-3);
/// ```
pub fn welch_t_test(a: &[f64], b: &[f64]) -> Result<TestOutcome, AnalysisError> {
    require_samples(a, "history")?;
    require_samples(b, "window")?;

    if is_constant(a) && is_constant(b) {
        let pvalue = if a[0] == b[0] { 1.0 } else { 0.0 };
        let statistic = if a[0] == b[0] {
            0.0
        } else {
            (a[0] - b[0]).signum() * f64::INFINITY
        };
        return Ok(TestOutcome { statistic, pvalue });
    }

    let n1 = a.len() as f64;
    let n2 = b.len() as f64;
    let (mean1, var1) = mean_and_sample_variance(a);
    let (mean2, var2) = mean_and_sample_variance(b);

    let se1 = var1 / n1;
    let se2 = var2 / n2;
    let se_sq = se1 + se2;

    let statistic = (mean1 - mean2) / se_sq.sqrt();
    let df = se_sq * se_sq / (se1 * se1 / (n1 - 1.0) + se2 * se2 / (n2 - 1.0));

    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to compute t-test: {}", e)))?;
    let pvalue = (2.0 * dist.sf(statistic.abs())).clamp(0.0, 1.0);

    tracing::trace!(t = statistic, df, p = pvalue, "Welch t-test");
    Ok(TestOutcome { statistic, pvalue })
}

// Mean and unbiased (n - 1) variance in f64
fn mean_and_sample_variance(values: &[f64]) -> (f64, f64) {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    (mean, ss / (n - 1.0))
}

/// Descriptive statistics of one segment (history or window)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub len: usize,
    pub mean: f64,
    pub median: f64,
    /// Population variance
    pub variance: f64,
}

/// Summarize a segment with trueno/aprender statistics.
pub fn summarize(samples: &[f64]) -> Result<SegmentSummary, AnalysisError> {
    if samples.is_empty() {
        return Err(AnalysisError::InvalidInput(
            "cannot summarize an empty segment".to_string(),
        ));
    }

    let values: Vec<f32> = samples.iter().map(|&v| v as f32).collect();
    let vector = Vector::from_slice(&values);

    let mean = vector
        .mean()
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to compute mean: {}", e)))?;
    let variance = vector
        .variance()
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to compute variance: {}", e)))?;

    Ok(SegmentSummary {
        len: samples.len(),
        mean: f64::from(mean),
        median: f64::from(median(&vector)?),
        variance: f64::from(variance),
    })
}

/// Calculate median using aprender's DescriptiveStats
///
/// Uses aprender's quantile(0.5) (R-7 method, QuickSelect).
pub fn median(vector: &Vector<f32>) -> Result<f32, AnalysisError> {
    let stats = DescriptiveStats::new(vector);
    stats
        .quantile(0.5)
        .map_err(|e| AnalysisError::InvalidInput(format!("Failed to compute median: {}", e)))
}
