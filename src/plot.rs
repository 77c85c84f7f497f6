//! Per-benchmark SVG plots
//!
//! Raw samples in green, smoothed samples in blue, and a red marker at the
//! located slowdown. Each call builds a fresh document; there is no shared
//! canvas between benchmarks.

use crate::html_output::escape_html;
use crate::regression::{AnalyzedBenchmark, StepDirection};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Component, Path, PathBuf};

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 480.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 20.0;
const MARGIN_BOTTOM: f64 = 50.0;
const TITLE_LINE_HEIGHT: f64 = 18.0;
const TITLE_WRAP: usize = 50;
const Y_TICKS: usize = 5;

const RAW_COLOR: &str = "#2ca02c";
const SMOOTHED_COLOR: &str = "#1f77b4";
const STEP_COLOR: &str = "#d62728";

/// Wrap `text` into lines of at most `width` characters.
///
/// Breaks at whitespace; words longer than `width` are split.
pub fn wrap_title(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let chars: Vec<char> = word.chars().collect();
        for chunk in chars.chunks(width) {
            let chunk: String = chunk.iter().collect();
            let needed = if current.is_empty() {
                chunk.chars().count()
            } else {
                current.chars().count() + 1 + chunk.chars().count()
            };
            if needed > width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(&chunk);
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Relative path of the plot for benchmark `name`.
///
/// `/` in benchmark names (`BM_copy/1024`) becomes a directory level; other
/// unsafe characters and `.`/`..` segments are replaced with `_`.
pub fn plot_file_name(name: &str) -> PathBuf {
    let mut path = PathBuf::new();
    let segments: Vec<String> = name
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|segment| {
            let cleaned: String = segment
                .chars()
                .map(|c| {
                    if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') {
                        c
                    } else {
                        '_'
                    }
                })
                .collect();
            if cleaned.chars().all(|c| c == '.') {
                "_".repeat(cleaned.len())
            } else {
                cleaned
            }
        })
        .collect();

    if segments.is_empty() {
        path.push("_");
    } else {
        for segment in &segments {
            path.push(segment);
        }
    }

    let mut file_name = path
        .file_name()
        .map(|f| f.to_os_string())
        .unwrap_or_default();
    file_name.push(".svg");
    path.set_file_name(file_name);

    debug_assert!(path
        .components()
        .all(|c| matches!(c, Component::Normal(_))));
    path
}

struct Frame {
    x_max: f64,
    y_min: f64,
    y_max: f64,
    top: f64,
}

impl Frame {
    fn x(&self, index: usize) -> f64 {
        let span = (WIDTH - MARGIN_LEFT - MARGIN_RIGHT) / self.x_max.max(1.0);
        MARGIN_LEFT + index as f64 * span
    }

    fn y(&self, value: f64) -> f64 {
        let bottom = HEIGHT - MARGIN_BOTTOM;
        let frac = (value - self.y_min) / (self.y_max - self.y_min);
        bottom - frac * (bottom - self.top)
    }
}

fn polyline(frame: &Frame, values: &[f64], color: &str) -> String {
    let points: Vec<String> = values
        .iter()
        .enumerate()
        .map(|(i, v)| format!("{:.2},{:.2}", frame.x(i), frame.y(*v)))
        .collect();
    format!(
        r#"  <polyline fill="none" stroke="{}" stroke-width="1.5" points="{}"/>"#,
        color,
        points.join(" ")
    )
}

/// Render the plot for one analyzed benchmark as an SVG document.
pub fn render_svg(bench: &AnalyzedBenchmark, metric: &str) -> String {
    let title = wrap_title(&bench.name, TITLE_WRAP);
    let top = 20.0 + TITLE_LINE_HEIGHT * title.len() as f64;

    let (mut y_min, mut y_max) = bench
        .raw
        .iter()
        .chain(bench.smoothed.iter())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(*v), hi.max(*v))
        });
    if !y_min.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }
    if y_max - y_min < f64::EPSILON {
        let pad = (y_min.abs() * 0.05).max(1.0);
        y_min -= pad;
        y_max += pad;
    }

    let frame = Frame {
        x_max: bench.raw.len().max(bench.smoothed.len()).saturating_sub(1) as f64,
        y_min,
        y_max,
        top,
    };
    let bottom = HEIGHT - MARGIN_BOTTOM;
    let right = WIDTH - MARGIN_RIGHT;

    let mut svg = String::new();
    let _ = writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}" font-family="sans-serif" font-size="12">"#,
        w = WIDTH,
        h = HEIGHT
    );
    let _ = writeln!(svg, r#"  <rect width="100%" height="100%" fill="white"/>"#);

    for (i, line) in title.iter().enumerate() {
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
            WIDTH / 2.0,
            20.0 + TITLE_LINE_HEIGHT * i as f64,
            escape_html(line)
        );
    }

    // Axes
    let _ = writeln!(
        svg,
        r#"  <line x1="{l}" y1="{t:.1}" x2="{l}" y2="{b}" stroke="black"/>"#,
        l = MARGIN_LEFT,
        t = top,
        b = bottom
    );
    let _ = writeln!(
        svg,
        r#"  <line x1="{l}" y1="{b}" x2="{r}" y2="{b}" stroke="black"/>"#,
        l = MARGIN_LEFT,
        b = bottom,
        r = right
    );

    for tick in 0..=Y_TICKS {
        let value = y_min + (y_max - y_min) * tick as f64 / Y_TICKS as f64;
        let y = frame.y(value);
        let _ = writeln!(
            svg,
            r#"  <text x="{:.1}" y="{:.1}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            y + 4.0,
            format_tick(value)
        );
    }

    let _ = writeln!(
        svg,
        r#"  <text x="{:.1}" y="{:.1}" text-anchor="middle">sample #</text>"#,
        (MARGIN_LEFT + right) / 2.0,
        HEIGHT - 12.0
    );
    let _ = writeln!(
        svg,
        r#"  <text x="16" y="{y:.1}" text-anchor="middle" transform="rotate(-90 16 {y:.1})">{m}</text>"#,
        y = (top + bottom) / 2.0,
        m = escape_html(metric)
    );

    let _ = writeln!(svg, "{}", polyline(&frame, &bench.raw, RAW_COLOR));
    let _ = writeln!(svg, "{}", polyline(&frame, &bench.smoothed, SMOOTHED_COLOR));

    if let Some(step) = bench.detection.step {
        if step.direction == StepDirection::Slowdown {
            let x = frame.x(step.index);
            let _ = writeln!(
                svg,
                r#"  <line class="step" x1="{x:.2}" y1="{t:.1}" x2="{x:.2}" y2="{b}" stroke="{c}" stroke-width="2"/>"#,
                x = x,
                t = top,
                b = bottom,
                c = STEP_COLOR
            );
        }
    }

    svg.push_str("</svg>\n");
    svg
}

fn format_tick(value: f64) -> String {
    if value.abs() >= 1000.0 || value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.3}", value)
    }
}

/// Hands out plot paths for one output directory, never the same one twice.
///
/// [`plot_file_name`] is lossy (`BM a` and `BM_a` both map to `BM_a.svg`);
/// later claimants of a taken path get a `-2`, `-3`, ... suffix. Paths are
/// compared case-insensitively so case-folding filesystems cannot merge two
/// plots either.
#[derive(Debug, Default)]
pub struct PlotPaths {
    taken: HashSet<String>,
}

impl PlotPaths {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim a relative plot path for benchmark `name`
    pub fn assign(&mut self, name: &str) -> PathBuf {
        let base = plot_file_name(name);
        let stem = base
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut candidate = base.clone();
        let mut suffix = 2;
        while !self.taken.insert(candidate.to_string_lossy().to_lowercase()) {
            candidate = base.with_file_name(format!("{}-{}.svg", stem, suffix));
            suffix += 1;
        }

        if candidate != base {
            tracing::debug!(
                benchmark = %name,
                path = %candidate.display(),
                "Plot path already used, renamed"
            );
        }
        candidate
    }
}

/// Render and write the plot for `bench` below `output_dir`.
///
/// The relative path is claimed from `paths` and returned.
pub fn write_plot(
    output_dir: &Path,
    paths: &mut PlotPaths,
    bench: &AnalyzedBenchmark,
    metric: &str,
) -> Result<PathBuf> {
    let relative = paths.assign(&bench.name);
    let path = output_dir.join(&relative);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create plot directory {}", parent.display()))?;
    }
    fs::write(&path, render_svg(bench, metric))
        .with_context(|| format!("Failed to write plot {}", path.display()))?;

    tracing::debug!(benchmark = %bench.name, path = %path.display(), "Plot written");
    Ok(relative)
}
