//! # Marketflow
//!
//! A sequential research pipeline for quoted financial instruments.
//!
//! Marketflow loads daily quote data for a configured set of instruments
//! (from a remote source or from local CSV snapshots), prepares it for
//! analysis, and renders descriptive statistics, reports, and line charts.
//! The whole run is driven by a small orchestration core:
//!
//! - **Stage-based execution**: named units of work behind a uniform
//!   [`stages::Stage`] contract, executed strictly in declared order
//! - **Shared context**: a typed key-value [`context::WorkflowContext`]
//!   threaded through all stages of one run
//! - **Run state machine**: a closed [`core::WorkflowState`] enumeration
//!   tracking the outcome of the most recent stage and of the run
//! - **Stepped execution**: advance or rewind the pipeline one stage at a
//!   time, with crash-safe recovery at the [`processor::Processor`] boundary
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use marketflow::prelude::*;
//!
//! let workflow = Workflow::builder("research")
//!     .stage("01-data_loading", Arc::new(DataLoadStage::new(source)))?
//!     .stage("02-data_tending", Arc::new(DataTendingStage::new()))?
//!     .build();
//!
//! let mut processor = Processor::new(&config_loader, workflow, &seed)?;
//! let state = processor.process().await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod context;
pub mod core;
pub mod data;
pub mod errors;
pub mod events;
pub mod plot;
pub mod processor;
pub mod report;
pub mod stages;
pub mod stats;
pub mod testing;
pub mod util;
pub mod workflow;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ConfigLoader, QuotedInstrument, TimeRange};
    pub use crate::context::{keys, ContextKey, WorkflowContext};
    pub use crate::core::WorkflowState;
    pub use crate::data::{
        ComplexData, DataLoadingStrategy, Frame, HttpQuoteSource, InstrumentDataSet,
        LocalDataLoader, QuoteSource, RemoteDataLoader, RemoteSourceName, SelectedData,
        StrategyBasedDataLoader,
    };
    pub use crate::errors::MarketflowError;
    pub use crate::events::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::processor::Processor;
    pub use crate::stages::{
        AbortStage, AutoEdaStage, CheckDatesStage, DataClearingStage, DataLoadStage,
        DataTendingStage, DataTreatingStage, EdaInput, FnStage, JoinedDatasetStage,
        PreparedDataReportStage, SelectByTimeRangeStage, Stage,
    };
    pub use crate::workflow::{Workflow, WorkflowBuilder};
}
