//! HTML index page for an analysis run
//!
//! A styled summary table followed by every benchmark's plot, in analysis
//! order. Slowdowns are highlighted.

use crate::json_output::JsonBenchmark;

/// Escape HTML special characters to prevent XSS
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// HTML report formatter
#[derive(Debug)]
pub struct HtmlReport {
    metric: String,
    benchmarks: Vec<JsonBenchmark>,
}

impl HtmlReport {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metric: metric.into(),
            benchmarks: Vec::new(),
        }
    }

    pub fn add_benchmark(&mut self, benchmark: JsonBenchmark) {
        self.benchmarks.push(benchmark);
    }

    /// Generate embedded CSS styles
    fn generate_styles() -> &'static str {
        r#"
        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            margin: 20px;
            background-color: #f5f5f5;
        }
        h1, h2 {
            color: #333;
        }
        table {
            border-collapse: collapse;
            width: 100%;
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
        }
        th, td {
            border: 1px solid #ddd;
            padding: 8px;
            text-align: left;
        }
        th {
            background-color: #4a90d9;
            color: white;
            font-weight: bold;
        }
        tr:nth-child(even) {
            background-color: #f9f9f9;
        }
        tr.slowdown, tr.slowdown:nth-child(even) {
            background-color: #fbe3e3;
        }
        .benchmark {
            font-family: monospace;
            font-weight: bold;
        }
        .number {
            font-family: monospace;
            text-align: right;
        }
        .plot {
            background-color: white;
            box-shadow: 0 1px 3px rgba(0,0,0,0.1);
            margin-bottom: 20px;
            padding: 10px;
        }
        .plot img {
            max-width: 100%;
        }
        .footer {
            margin-top: 20px;
            font-size: 0.8em;
            color: #888;
            text-align: center;
        }
        "#
    }

    fn generate_header() -> String {
        let headers = [
            "Benchmark",
            "Samples",
            "Verdict",
            "Step index",
            "Builds since step",
        ];
        let cells: Vec<String> = headers.iter().map(|h| format!("<th>{}</th>", h)).collect();
        format!("<tr>{}</tr>", cells.join(""))
    }

    fn format_row(benchmark: &JsonBenchmark) -> String {
        let class = if benchmark.is_slowdown() {
            r#" class="slowdown""#
        } else {
            ""
        };
        let optional = |value: Option<usize>| value.map(|v| v.to_string()).unwrap_or_default();

        format!(
            r#"<tr{}><td class="benchmark">{}</td><td class="number">{}</td><td>{}</td><td class="number">{}</td><td class="number">{}</td></tr>"#,
            class,
            escape_html(&benchmark.name),
            benchmark.samples,
            escape_html(benchmark.state.label()),
            optional(benchmark.step_index),
            optional(benchmark.builds_since_step),
        )
    }

    /// Generate complete HTML document
    pub fn to_html(&self) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n");
        html.push_str("<html lang=\"en\">\n");

        html.push_str("<head>\n");
        html.push_str("    <meta charset=\"UTF-8\">\n");
        html.push_str(
            "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
        );
        html.push_str("    <title>Benchmark Regression Report</title>\n");
        html.push_str("    <style>");
        html.push_str(Self::generate_styles());
        html.push_str("</style>\n");
        html.push_str("</head>\n");

        html.push_str("<body>\n");
        html.push_str(&format!(
            "    <h1>Benchmark Regression Report ({})</h1>\n",
            escape_html(&self.metric)
        ));

        if self.benchmarks.is_empty() {
            html.push_str("    <p>No benchmark had enough samples to analyze.</p>\n");
        } else {
            html.push_str("    <table>\n");
            html.push_str("        ");
            html.push_str(&Self::generate_header());
            html.push('\n');
            for benchmark in &self.benchmarks {
                html.push_str("        ");
                html.push_str(&Self::format_row(benchmark));
                html.push('\n');
            }
            html.push_str("    </table>\n");

            html.push_str("    <h2>Plots</h2>\n");
            for benchmark in &self.benchmarks {
                html.push_str(&Self::render_plot(benchmark));
            }
        }

        html.push_str("    <div class=\"footer\">\n");
        html.push_str(&format!(
            "        Generated by benchwatch {}\n",
            env!("CARGO_PKG_VERSION")
        ));
        html.push_str("    </div>\n");

        html.push_str("</body>\n");
        html.push_str("</html>\n");

        html
    }

    fn render_plot(benchmark: &JsonBenchmark) -> String {
        let Some(plot) = &benchmark.plot else {
            return String::new();
        };
        let name = escape_html(&benchmark.name);
        format!(
            "    <div class=\"plot\">\n        <h3>{}</h3>\n        <img src=\"{}\" alt=\"{}\">\n    </div>\n",
            name,
            escape_html(plot),
            name
        )
    }
}
