//! Descriptive statistics over frame columns.

use indexmap::IndexMap;
use serde::Serialize;

use crate::data::Frame;

/// Descriptive statistics of one column.
///
/// NaN cells count as missing and are excluded from every statistic. When a
/// column has no finite observation the numeric fields are all NaN.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSummary {
    /// Number of finite observations.
    pub count: usize,
    /// Number of missing (NaN) cells.
    pub missing: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (n − 1 denominator).
    pub std: f64,
    /// Smallest observation.
    pub min: f64,
    /// First quartile.
    pub q25: f64,
    /// Median.
    pub median: f64,
    /// Third quartile.
    pub q75: f64,
    /// Largest observation.
    pub max: f64,
}

/// Summarizes a slice of observations.
#[must_use]
pub fn summarize(values: &[f64]) -> ColumnSummary {
    let mut observed: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    let missing = values.len() - observed.len();
    observed.sort_by(f64::total_cmp);

    if observed.is_empty() {
        return ColumnSummary {
            count: 0,
            missing,
            mean: f64::NAN,
            std: f64::NAN,
            min: f64::NAN,
            q25: f64::NAN,
            median: f64::NAN,
            q75: f64::NAN,
            max: f64::NAN,
        };
    }

    let count = observed.len();
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    let mean = observed.iter().sum::<f64>() / n;
    let std = if count > 1 {
        (observed.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
    } else {
        f64::NAN
    };

    ColumnSummary {
        count,
        missing,
        mean,
        std,
        min: observed[0],
        q25: quantile(&observed, 0.25),
        median: quantile(&observed, 0.5),
        q75: quantile(&observed, 0.75),
        max: observed[count - 1],
    }
}

/// Summarizes every column of a frame, in column order.
#[must_use]
pub fn summarize_frame(frame: &Frame) -> IndexMap<String, ColumnSummary> {
    frame
        .column_names()
        .filter_map(|name| {
            frame
                .column(name)
                .map(|values| (name.to_string(), summarize(values)))
        })
        .collect()
}

/// Linear-interpolated quantile over sorted observations.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let position = q * (sorted.len() - 1) as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let below = position.floor() as usize;
    let above = below.min(sorted.len() - 1).saturating_add(1).min(sorted.len() - 1);
    let weight = position - position.floor();
    sorted[below] * (1.0 - weight) + sorted[above] * weight
}
