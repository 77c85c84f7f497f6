use anyhow::{Context, Result};
use benchwatch::cli::{Cli, OutputFormat};
use benchwatch::html_output::HtmlReport;
use benchwatch::ingest::{collect_result_files, load_benchmark_set};
use benchwatch::json_output::{JsonBenchmark, JsonReport};
use benchwatch::plot::{write_plot, PlotPaths};
use benchwatch::regression::analyze_all;
use clap::Parser;
use std::fs;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber; logs go to stderr
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("benchwatch=info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_text_summary(report: &JsonReport) {
    for bench in &report.benchmarks {
        match bench.builds_since_step {
            Some(builds) if bench.is_slowdown() => println!(
                "{}: {} (step at sample {}, within the last {} builds)",
                bench.name,
                bench.state.label(),
                bench.step_index.unwrap_or_default(),
                builds
            ),
            _ => println!("{}: {}", bench.name, bench.state.label()),
        }
    }
    println!(
        "{} benchmarks analyzed from {} result files: {} slowdowns, {} speedups, {} inconclusive",
        report.summary.analyzed,
        report.files,
        report.summary.slowdowns,
        report.summary.speedups,
        report.summary.inconclusive
    );
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = args.to_config();
    if let Err(msg) = config.validate() {
        anyhow::bail!("Invalid configuration: {}", msg);
    }

    let all_files = collect_result_files(&args.directory).with_context(|| {
        format!(
            "Failed to list result files in {}",
            args.directory.display()
        )
    })?;
    if all_files.is_empty() {
        match args.format {
            OutputFormat::Text => println!("no benchmark data"),
            OutputFormat::Json => println!("{}", JsonReport::new(config, 0).to_json()?),
        }
        return Ok(());
    }

    // An empty selection still produces a (benchmark-less) report
    let found = all_files.len();
    let files = args.to_selection().apply(all_files);
    tracing::info!(found, selected = files.len(), "Collected result files");

    let set = load_benchmark_set(&files, &config.metric);
    let results = analyze_all(&set, &config).context("Benchmark analysis failed")?;

    fs::create_dir_all(&args.output_directory).with_context(|| {
        format!(
            "Failed to create output directory {}",
            args.output_directory.display()
        )
    })?;

    let mut report = JsonReport::new(config.clone(), files.len());
    let mut html = HtmlReport::new(config.metric.clone());
    let mut plot_paths = PlotPaths::new();
    for bench in &results {
        let plot = write_plot(&args.output_directory, &mut plot_paths, bench, &config.metric)?;
        let row = JsonBenchmark::from_analyzed(bench, Some(&plot));
        html.add_benchmark(row.clone());
        report.add_benchmark(row);
    }

    let index = args.output_directory.join("index.html");
    fs::write(&index, html.to_html())
        .with_context(|| format!("Failed to write {}", index.display()))?;
    tracing::info!(path = %index.display(), "Report written");

    match args.format {
        OutputFormat::Text => print_text_summary(&report),
        OutputFormat::Json => println!("{}", report.to_json()?),
    }

    Ok(())
}
