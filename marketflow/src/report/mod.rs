//! Markdown report rendering.
//!
//! Reports are plain strings built column by column; there is no template
//! engine. The reporting stages write them under the configured output
//! directory.

use std::fmt::Write as _;
use std::path::Path;

use crate::config::Config;
use crate::data::Frame;
use crate::errors::MarketflowError;
use crate::stats::summarize_frame;

/// Renders the research overview section: campaign, time range, instruments.
#[must_use]
pub fn render_config_overview(config: &Config) -> String {
    let research = &config.research;
    let mut out = String::new();

    let _ = writeln!(out, "# {}", research.name);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", research.description);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Research time range: {} to {}",
        research.machine_learning.time_range.begin_time.date_naive(),
        research.machine_learning.time_range.end_time.date_naive(),
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "## Instruments");
    let _ = writeln!(out);
    for instrument in config.instruments() {
        let marker = if instrument.ticker == research.target_quoted_instrument.ticker {
            " (target)"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "- **{}**{marker} ({}): {}",
            instrument.ticker, instrument.name, instrument.description
        );
    }
    out
}

/// Renders one instrument's frame section: shape plus a summary table.
#[must_use]
pub fn render_frame_report(title: &str, frame: &Frame) -> String {
    let mut out = String::new();
    let (rows, columns) = frame.shape();

    let _ = writeln!(out, "## {title}");
    let _ = writeln!(out);
    let _ = writeln!(out, "{rows} rows × {columns} columns");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "| column | count | missing | mean | std | min | q25 | median | q75 | max |"
    );
    let _ = writeln!(
        out,
        "|--------|-------|---------|------|-----|-----|-----|--------|-----|-----|"
    );
    for (name, summary) in summarize_frame(frame) {
        let _ = writeln!(
            out,
            "| {name} | {} | {} | {} | {} | {} | {} | {} | {} | {} |",
            summary.count,
            summary.missing,
            cell(summary.mean),
            cell(summary.std),
            cell(summary.min),
            cell(summary.q25),
            cell(summary.median),
            cell(summary.q75),
            cell(summary.max),
        );
    }
    out
}

/// Writes a rendered report to disk.
pub fn write_report(path: impl AsRef<Path>, content: &str) -> Result<(), MarketflowError> {
    std::fs::write(path, content)?;
    Ok(())
}

fn cell(value: f64) -> String {
    if value.is_nan() {
        "n/a".to_string()
    } else {
        format!("{value:.4}")
    }
}
