//! Line charts over frame columns, rendered as standalone SVG documents.

use std::fmt::Write as _;
use std::path::Path;

use crate::data::Frame;
use crate::errors::MarketflowError;

/// A 2D line chart of one frame column over the timestamp index.
#[derive(Debug, Clone)]
pub struct LinePlot {
    title: String,
    label_abscissa: String,
    label_ordinate: String,
    width: u32,
    height: u32,
}

/// Plot margin around the drawing area, in pixels.
const MARGIN: f64 = 48.0;

impl LinePlot {
    /// Creates a plot with default axis labels and size.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            label_abscissa: "time".to_string(),
            label_ordinate: "value".to_string(),
            width: 960,
            height: 480,
        }
    }

    /// Sets the axis labels.
    #[must_use]
    pub fn with_labels(
        mut self,
        label_abscissa: impl Into<String>,
        label_ordinate: impl Into<String>,
    ) -> Self {
        self.label_abscissa = label_abscissa.into();
        self.label_ordinate = label_ordinate.into();
        self
    }

    /// Sets the canvas size in pixels.
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Renders one column of the frame as an SVG document.
    ///
    /// NaN cells break the polyline into separate segments.
    pub fn render_svg(&self, frame: &Frame, column: &str) -> Result<String, MarketflowError> {
        let values = frame
            .column(column)
            .ok_or_else(|| MarketflowError::Data(format!("column '{column}' not found")))?;
        if frame.is_empty() {
            return Err(MarketflowError::Data(format!(
                "nothing to plot for column '{column}'"
            )));
        }

        let first = frame.index()[0].timestamp() as f64;
        let last = frame.index()[frame.index().len() - 1].timestamp() as f64;
        let span_x = if (last - first).abs() < f64::EPSILON {
            1.0
        } else {
            last - first
        };

        let finite: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let low = finite.iter().copied().fold(f64::INFINITY, f64::min);
        let high = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if finite.is_empty() {
            return Err(MarketflowError::Data(format!(
                "column '{column}' has no finite values to plot"
            )));
        }
        let span_y = if (high - low).abs() < f64::EPSILON {
            1.0
        } else {
            high - low
        };

        let plot_width = f64::from(self.width) - 2.0 * MARGIN;
        let plot_height = f64::from(self.height) - 2.0 * MARGIN;

        let mut segments: Vec<Vec<(f64, f64)>> = vec![Vec::new()];
        for (ts, value) in frame.index().iter().zip(values) {
            if value.is_nan() {
                if segments.last().is_some_and(|segment| !segment.is_empty()) {
                    segments.push(Vec::new());
                }
                continue;
            }
            let x = MARGIN + (ts.timestamp() as f64 - first) / span_x * plot_width;
            let y = MARGIN + (high - value) / span_y * plot_height;
            if let Some(segment) = segments.last_mut() {
                segment.push((x, y));
            }
        }

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            self.width, self.height, self.width, self.height
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="24" text-anchor="middle" font-size="16">{}</text>"#,
            f64::from(self.width) / 2.0,
            xml_escape(&self.title)
        );
        // Axes
        let _ = writeln!(
            svg,
            r#"  <line x1="{m}" y1="{bottom}" x2="{right}" y2="{bottom}" stroke="black"/>"#,
            m = MARGIN,
            bottom = f64::from(self.height) - MARGIN,
            right = f64::from(self.width) - MARGIN,
        );
        let _ = writeln!(
            svg,
            r#"  <line x1="{m}" y1="{m}" x2="{m}" y2="{bottom}" stroke="black"/>"#,
            m = MARGIN,
            bottom = f64::from(self.height) - MARGIN,
        );
        let _ = writeln!(
            svg,
            r#"  <text x="{}" y="{}" text-anchor="middle" font-size="12">{}</text>"#,
            f64::from(self.width) / 2.0,
            f64::from(self.height) - 12.0,
            xml_escape(&self.label_abscissa)
        );
        let _ = writeln!(
            svg,
            r#"  <text x="16" y="{}" text-anchor="middle" font-size="12" transform="rotate(-90 16 {})">{}</text>"#,
            f64::from(self.height) / 2.0,
            f64::from(self.height) / 2.0,
            xml_escape(&self.label_ordinate)
        );

        for segment in segments.iter().filter(|segment| segment.len() > 1) {
            let points: Vec<String> = segment
                .iter()
                .map(|(x, y)| format!("{x:.2},{y:.2}"))
                .collect();
            let _ = writeln!(
                svg,
                r#"  <polyline fill="none" stroke="steelblue" stroke-width="2" points="{}"/>"#,
                points.join(" ")
            );
        }

        let _ = writeln!(svg, "</svg>");
        Ok(svg)
    }

    /// Renders one column and writes the SVG to disk.
    pub fn write_svg(
        &self,
        path: impl AsRef<Path>,
        frame: &Frame,
        column: &str,
    ) -> Result<(), MarketflowError> {
        let svg = self.render_svg(frame, column)?;
        std::fs::write(path, svg)?;
        Ok(())
    }
}

fn xml_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures::{day, sample_frame};
    use indexmap::IndexMap;

    #[test]
    fn test_render_svg_draws_one_polyline() {
        let plot = LinePlot::new("NVDA close").with_labels("time", "price, USD");
        let svg = plot.render_svg(&sample_frame(), "close").unwrap();

        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("NVDA close"));
        assert!(svg.contains("price, USD"));
        assert_eq!(svg.matches("<polyline").count(), 1);
    }

    #[test]
    fn test_render_svg_breaks_line_at_nan() {
        let mut columns = IndexMap::new();
        columns.insert(
            "a".to_string(),
            vec![1.0, 2.0, f64::NAN, 4.0, 5.0],
        );
        let frame = Frame::from_columns(
            vec![day(1), day(2), day(3), day(4), day(5)],
            columns,
        )
        .unwrap();

        let svg = LinePlot::new("gap").render_svg(&frame, "a").unwrap();
        assert_eq!(svg.matches("<polyline").count(), 2);
    }

    #[test]
    fn test_render_svg_unknown_column() {
        let error = LinePlot::new("x")
            .render_svg(&sample_frame(), "volume")
            .unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }

    #[test]
    fn test_write_svg() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("close.svg");

        LinePlot::new("NVDA close")
            .write_svg(&path, &sample_frame(), "close")
            .unwrap();
        assert!(path.is_file());
    }
}
