//! Stage trait and the built-in pipeline stages.
//!
//! Stages are the units of work in a marketflow pipeline. A stage receives
//! the live run context, may read and write any of its keys, and reports a
//! definite outcome. Any parameterization a stage needs is supplied at
//! construction time; `execute` takes no other input channel.

mod data_load;
mod dataset;
mod preparing;
mod reporting;
mod tending;
mod timeframe;

pub use data_load::DataLoadStage;
pub use dataset::JoinedDatasetStage;
pub use preparing::{DataClearingStage, DataTreatingStage};
pub use reporting::{AutoEdaStage, EdaInput, PreparedDataReportStage};
pub use tending::DataTendingStage;
pub use timeframe::{CheckDatesStage, SelectByTimeRangeStage};

use crate::context::WorkflowContext;
use crate::core::WorkflowState;
use crate::errors::MarketflowError;
use async_trait::async_trait;

/// Trait for pipeline stages.
///
/// A stage may only return [`WorkflowState::Failed`],
/// [`WorkflowState::Success`], or [`WorkflowState::Aborted`]; the sentinels
/// are reserved for the orchestrator, which records any sentinel returned by
/// a stage as `Failed`. A stage-local fault (malformed input, unsupported
/// configuration value, missing prerequisite context key) surfaces as `Err`;
/// the orchestrator propagates it unhandled, and only the processor façade
/// decides whether it is recovered or fatal.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Executes the stage against the run context.
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError>;
}

/// A closure-backed stage, for tests and ad hoc wiring.
pub struct FnStage<F>
where
    F: Fn(&mut WorkflowContext) -> Result<WorkflowState, MarketflowError> + Send + Sync,
{
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut WorkflowContext) -> Result<WorkflowState, MarketflowError> + Send + Sync,
{
    /// Creates a new closure-backed stage.
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Stage for FnStage<F>
where
    F: Fn(&mut WorkflowContext) -> Result<WorkflowState, MarketflowError> + Send + Sync,
{
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        (self.func)(ctx)
    }
}

/// A degenerate stage that always declines to proceed.
///
/// Performs no I/O and never errors; useful as a placeholder in default
/// wiring and as a sentinel in tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbortStage;

impl AbortStage {
    /// Creates a new abort stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Stage for AbortStage {
    async fn execute(&self, _ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        Ok(WorkflowState::Aborted)
    }
}
