//! Research configuration: the typed model and the YAML loader.
//!
//! The configuration is loaded once, before the pipeline starts, and seeded
//! into the run context under [`crate::context::keys::CONFIG`]; stages treat
//! it as immutable.

mod loader;
mod model;

pub use loader::ConfigLoader;
pub use model::{
    ColumnNameTending, ColumnTending, Config, DataLoading, DataTransformation, LocalDataLoading,
    MachineLearning, QuotedInstrument, RemoteDataLoading, Reporting, Research, TendingRules,
    TimeRange,
};
