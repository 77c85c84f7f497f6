//! JSON summary of an analysis run
//!
//! `--format json` writes this to stdout; the HTML report is built from the
//! same per-benchmark rows.

use crate::regression::{AnalysisConfig, AnalyzedBenchmark, BenchmarkState};
use serde::Serialize;
use std::path::{Component, Path};

/// One analyzed benchmark
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonBenchmark {
    /// Benchmark name as it appears in the result files
    pub name: String,
    /// Number of raw samples analyzed
    pub samples: usize,
    pub state: BenchmarkState,
    pub regressed: bool,
    /// Step position in the smoothed series (located slowdowns/speedups only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builds_since_step: Option<usize>,
    /// Mann-Whitney U p-value
    pub rank_test_pvalue: f64,
    /// Welch t-test p-value, only when the rank test was significant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub t_test_pvalue: Option<f64>,
    pub history_mean: f64,
    pub window_mean: f64,
    /// Plot location relative to the output directory, `/`-separated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plot: Option<String>,
}

impl JsonBenchmark {
    pub fn from_analyzed(bench: &AnalyzedBenchmark, plot: Option<&Path>) -> Self {
        Self {
            name: bench.name.clone(),
            samples: bench.raw.len(),
            state: bench.state(),
            regressed: bench.detection.regressed,
            step_index: bench.step_index(),
            builds_since_step: bench.builds_since_step(),
            rank_test_pvalue: bench.detection.rank_test.pvalue,
            t_test_pvalue: bench.detection.t_test.map(|t| t.pvalue),
            history_mean: bench.history.mean,
            window_mean: bench.window.mean,
            plot: plot.map(relative_href),
        }
    }

    pub fn is_slowdown(&self) -> bool {
        self.state == BenchmarkState::LocatedSlowdown
    }
}

/// Join the normal components of a relative path with `/`
pub fn relative_href(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Verdict counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JsonSummary {
    pub analyzed: usize,
    pub slowdowns: usize,
    pub speedups: usize,
    pub inconclusive: usize,
    pub not_regressed: usize,
}

/// Root JSON output structure
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport {
    /// Format version identifier
    pub version: String,
    /// Format name
    pub format: String,
    /// Settings the run used
    pub config: AnalysisConfig,
    /// Result files read
    pub files: usize,
    pub summary: JsonSummary,
    pub benchmarks: Vec<JsonBenchmark>,
}

impl JsonReport {
    pub fn new(config: AnalysisConfig, files: usize) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "benchwatch-json-v1".to_string(),
            config,
            files,
            summary: JsonSummary::default(),
            benchmarks: Vec::new(),
        }
    }

    pub fn add_benchmark(&mut self, bench: JsonBenchmark) {
        self.summary.analyzed += 1;
        match bench.state {
            BenchmarkState::LocatedSlowdown => self.summary.slowdowns += 1,
            BenchmarkState::LocatedSpeedup => self.summary.speedups += 1,
            BenchmarkState::LocatedInconclusive => self.summary.inconclusive += 1,
            BenchmarkState::NotRegressed => self.summary.not_regressed += 1,
        }
        self.benchmarks.push(bench);
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regression::{analyze_all, BenchmarkSet};
    use std::path::PathBuf;

    fn analyzed() -> Vec<AnalyzedBenchmark> {
        let mut slow = vec![1.0; 30];
        slow.extend(vec![5.0; 6]);

        let mut set = BenchmarkSet::new();
        set.insert("BM_slow".to_string(), slow);
        set.insert("BM_flat".to_string(), vec![2.0; 36]);

        let config = AnalysisConfig {
            filter_length: 5,
            ..AnalysisConfig::default()
        };
        analyze_all(&set, &config).unwrap()
    }

    #[test]
    fn test_relative_href() {
        let path = PathBuf::from("BM_copy").join("1024.svg");
        assert_eq!(relative_href(&path), "BM_copy/1024.svg");
        assert_eq!(relative_href(Path::new("./a.svg")), "a.svg");
    }

    #[test]
    fn test_from_analyzed_slowdown() {
        let results = analyzed();
        let row = JsonBenchmark::from_analyzed(&results[0], Some(Path::new("BM_slow.svg")));

        assert_eq!(row.name, "BM_slow");
        assert_eq!(row.samples, 36);
        assert!(row.is_slowdown());
        assert!(row.regressed);
        assert!(row.step_index.is_some());
        assert!(row.t_test_pvalue.is_some());
        assert_eq!(row.plot.as_deref(), Some("BM_slow.svg"));
        assert!(row.window_mean > row.history_mean);
    }

    #[test]
    fn test_report_summary_counts() {
        let mut report = JsonReport::new(AnalysisConfig::default(), 36);
        for bench in &analyzed() {
            report.add_benchmark(JsonBenchmark::from_analyzed(bench, None));
        }

        assert_eq!(report.summary.analyzed, 2);
        assert_eq!(report.summary.slowdowns, 1);
        assert_eq!(report.summary.not_regressed, 1);
        assert_eq!(report.format, "benchwatch-json-v1");
    }

    #[test]
    fn test_regressed_without_step_counted_inconclusive() {
        let mut bench = analyzed().remove(0);
        bench.detection.step = None;

        let mut report = JsonReport::new(AnalysisConfig::default(), 36);
        report.add_benchmark(JsonBenchmark::from_analyzed(&bench, None));

        assert_eq!(report.summary.inconclusive, 1);
        assert_eq!(report.summary.not_regressed, 0);
        assert_eq!(report.benchmarks[0].state, BenchmarkState::LocatedInconclusive);
    }

    #[test]
    fn test_json_serialization() {
        let mut report = JsonReport::new(AnalysisConfig::default(), 36);
        for bench in &analyzed() {
            report.add_benchmark(JsonBenchmark::from_analyzed(bench, None));
        }

        let json = report.to_json().unwrap();
        assert!(json.contains("\"format\": \"benchwatch-json-v1\""));
        assert!(json.contains("\"state\": \"located_slowdown\""));
        assert!(json.contains("\"state\": \"not_regressed\""));
        assert!(json.contains("\"metric\": \"real_time\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["benchmarks"][0]["name"], "BM_slow");
        assert_eq!(value["files"], 36);
    }

    #[test]
    fn test_optional_fields_omitted() {
        let results = analyzed();
        let row = JsonBenchmark::from_analyzed(&results[1], None);

        let json = serde_json::to_string(&row).unwrap();
        assert!(!json.contains("step_index"));
        assert!(!json.contains("t_test_pvalue"));
        assert!(!json.contains("plot"));
    }
}
