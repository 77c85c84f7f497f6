//! Benchmark result ingestion
//!
//! Scans a directory of Google Benchmark JSON result files (one file per
//! build), orders them oldest first, applies the record selection flags and
//! accumulates one sample per benchmark per file for the chosen metric.

use crate::regression::BenchmarkSet;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;

/// Errors raised while reading benchmark result files
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Benchmark '{benchmark}' in {} has no numeric '{metric}' field", path.display())]
    MissingMetric {
        path: PathBuf,
        benchmark: String,
        metric: String,
    },
}

/// Top level of a Google Benchmark `--benchmark_format=json` file
#[derive(Debug, Deserialize)]
struct ResultFile {
    benchmarks: Vec<BenchmarkEntry>,
}

#[derive(Debug, Deserialize)]
struct BenchmarkEntry {
    name: String,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

/// Extract `(name, metric value)` pairs from one result file's contents.
///
/// The whole file is rejected if any benchmark lacks a numeric `metric`.
pub fn parse_benchmark_json(
    text: &str,
    metric: &str,
    path: &Path,
) -> Result<Vec<(String, f64)>, IngestError> {
    let file: ResultFile = serde_json::from_str(text).map_err(|source| IngestError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    file.benchmarks
        .into_iter()
        .map(|entry| {
            match entry.fields.get(metric).and_then(serde_json::Value::as_f64) {
                Some(value) => Ok((entry.name, value)),
                None => Err(IngestError::MissingMetric {
                    path: path.to_path_buf(),
                    benchmark: entry.name,
                    metric: metric.to_string(),
                }),
            }
        })
        .collect()
}

/// Append one file's samples to `set`, keeping first-seen order
pub fn merge_samples(set: &mut BenchmarkSet, samples: Vec<(String, f64)>) {
    for (name, value) in samples {
        set.entry(name).or_default().push(value);
    }
}

/// Read and parse one result file
pub fn read_result_file(path: &Path, metric: &str) -> Result<Vec<(String, f64)>, IngestError> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_benchmark_json(&text, metric, path)
}

/// Load every file in `files` (oldest first) into a [`BenchmarkSet`].
///
/// Unreadable or corrupt files are logged and skipped.
pub fn load_benchmark_set(files: &[PathBuf], metric: &str) -> BenchmarkSet {
    let mut set = BenchmarkSet::new();

    for path in files {
        tracing::debug!(path = %path.display(), "Parsing benchmark file");
        match read_result_file(path, metric) {
            Ok(samples) => {
                for (name, value) in &samples {
                    tracing::trace!(benchmark = %name, metric, value, "Sample");
                }
                merge_samples(&mut set, samples);
            }
            Err(e) => {
                tracing::warn!("Corrupt benchmark file encountered, skipping: {}", e);
            }
        }
    }

    set
}

/// List `.json` files in `dir`, oldest modification time first.
///
/// Files with equal timestamps are ordered by path.
pub fn collect_result_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let io_err = |source| IngestError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut files: Vec<(SystemTime, PathBuf)> = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if !is_json {
            continue;
        }
        // Follows symlinks, unlike DirEntry::metadata
        let metadata = fs::metadata(&path).map_err(io_err)?;
        if !metadata.is_file() {
            continue;
        }
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        files.push((modified, path));
    }

    files.sort();
    Ok(files.into_iter().map(|(_, path)| path).collect())
}

/// Which of the (oldest-first) result files take part in the analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RecordSelection {
    /// Range addressing: first file index (inclusive)
    pub start_index: Option<usize>,
    /// Range addressing: last file index (exclusive)
    pub end_index: Option<usize>,
    /// Ignore this many of the most recent files
    pub discard: Option<usize>,
    /// Keep at most this many of the most recent files (0 = all)
    pub max_samples: usize,
}

impl RecordSelection {
    /// Apply the selection to an oldest-first list.
    ///
    /// When both range indices are set they win and the other fields are
    /// ignored. Indices are clamped to the list.
    ///
    /// # Example
    /// ```
    /// use benchwatch::ingest::RecordSelection;
    ///
    /// let files: Vec<u32> = (0..10).collect();
    /// let selection = RecordSelection {
    ///     discard: Some(2),
    ///     max_samples: 3,
    ///     ..RecordSelection::default()
    /// };
    /// assert_eq!(selection.apply(files), vec![5, 6, 7]);
    /// ```
    pub fn apply<T>(&self, mut files: Vec<T>) -> Vec<T> {
        if let (Some(start), Some(end)) = (self.start_index, self.end_index) {
            let end = end.min(files.len());
            let start = start.min(end);
            files.truncate(end);
            files.drain(..start);
            return files;
        }

        if let Some(discard) = self.discard {
            let keep = files.len().saturating_sub(discard);
            files.truncate(keep);
        }

        if self.max_samples != 0 && files.len() > self.max_samples {
            let excess = files.len() - self.max_samples;
            files.drain(..excess);
        }

        files
    }
}
