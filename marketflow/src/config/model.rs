//! The typed configuration model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A closed interval of timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the interval, inclusive.
    pub begin_time: DateTime<Utc>,
    /// End of the interval, inclusive.
    pub end_time: DateTime<Utc>,
}

/// Where the local CSV snapshot of an instrument lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalDataLoading {
    /// Path of the local CSV file.
    pub file_name: String,
}

/// How the remote history of an instrument is fetched and snapshotted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDataLoading {
    /// Name of the remote source; validated against the supported set when
    /// data is loaded, not when the configuration is parsed.
    pub source_name: String,
    /// Path the fetched history is written to.
    pub file_name: String,
    /// The history interval to request.
    pub time_range: TimeRange,
}

/// Data acquisition settings for one instrument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataLoading {
    /// Name of the loading strategy; validated when data is loaded.
    pub data_loading_strategy: String,
    /// Remote acquisition settings.
    pub remote_data_loading: RemoteDataLoading,
    /// Local snapshot settings.
    pub local_data_loading: LocalDataLoading,
    /// Name of the timestamp column in CSV snapshots.
    pub date_column: String,
}

/// Column-name normalization rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnNameTending {
    /// Rewrite column names to snake_case.
    #[serde(default)]
    pub to_snake_case: bool,
}

/// Column-level tending rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ColumnTending {
    /// Columns to drop outright.
    #[serde(default)]
    pub remove: Vec<String>,
    /// Column-name normalization, if any.
    #[serde(default)]
    pub names: Option<ColumnNameTending>,
}

/// Cosmetic cleanup applied right after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TendingRules {
    /// Column rules, if any.
    #[serde(default)]
    pub columns: Option<ColumnTending>,
}

/// The transformation plan for one instrument's data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DataTransformation {
    /// Post-load cosmetic cleanup.
    #[serde(default)]
    pub tending: TendingRules,
    /// Row-clearing rule names, applied in order.
    #[serde(default)]
    pub clearing: Vec<String>,
    /// Missing-value treatment rule names, applied in order.
    #[serde(default)]
    pub treatment: Vec<String>,
    /// Scaling rule names, applied in order.
    #[serde(default)]
    pub scaling: Vec<String>,
}

/// One quoted instrument under research.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotedInstrument {
    /// Exchange ticker, also the instrument's key in the run context.
    pub ticker: String,
    /// Short display name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Acquisition settings.
    pub data_loading: DataLoading,
    /// Transformation plan.
    #[serde(default)]
    pub data_transformation: DataTransformation,
}

/// Model-building settings that shape data preparation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineLearning {
    /// The research time range the prepared data must cover.
    pub time_range: TimeRange,
    /// Train/test split point.
    pub split_time: DateTime<Utc>,
    /// Cross-validation strategy name.
    pub cross_validation_strategy: String,
}

/// Where rendered reports, charts, and datasets are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reporting {
    /// Root directory for rendered artifacts.
    #[serde(default = "default_output_directory")]
    pub output_directory: PathBuf,
}

impl Default for Reporting {
    fn default() -> Self {
        Self {
            output_directory: default_output_directory(),
        }
    }
}

fn default_output_directory() -> PathBuf {
    PathBuf::from("output")
}

/// One research campaign: a target instrument plus its peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Research {
    /// Campaign name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Model-building settings.
    pub machine_learning: MachineLearning,
    /// The instrument the research is about.
    pub target_quoted_instrument: QuotedInstrument,
    /// Supporting instruments, loaded and prepared alongside the target.
    #[serde(default)]
    pub quoted_instruments: Vec<QuotedInstrument>,
    /// Artifact output settings.
    #[serde(default)]
    pub reporting: Reporting,
}

/// The root configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// The research campaign this process runs.
    pub research: Research,
}

impl Config {
    /// The target instrument followed by every supporting instrument, in
    /// declared order.
    pub fn instruments(&self) -> impl Iterator<Item = &QuotedInstrument> {
        std::iter::once(&self.research.target_quoted_instrument)
            .chain(self.research.quoted_instruments.iter())
    }
}
