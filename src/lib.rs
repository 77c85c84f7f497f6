//! benchwatch - performance regression detection for benchmark history
//!
//! Reads a directory of Google Benchmark JSON result files (one per build),
//! tracks one metric per benchmark over time, and flags benchmarks whose
//! recent builds are significantly slower than their history. Each analyzed
//! benchmark gets an SVG plot, and an `index.html` ties them together.
//!
//! The statistical core lives in [`regression`] and works on plain data;
//! [`ingest`], [`plot`], [`html_output`] and [`json_output`] are the I/O
//! around it.

pub mod cli;
pub mod html_output;
pub mod ingest;
pub mod json_output;
pub mod plot;
pub mod regression;
