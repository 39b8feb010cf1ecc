//! Hand-rolled mocks for the stage and quote-source seams.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::TimeRange;
use crate::context::WorkflowContext;
use crate::core::WorkflowState;
use crate::data::{Frame, QuoteSource};
use crate::errors::MarketflowError;
use crate::stages::Stage;

/// A stage that records calls and returns a configurable result.
#[derive(Debug)]
pub struct MockStage {
    result: Mutex<Result<WorkflowState, String>>,
    call_count: Mutex<usize>,
}

impl MockStage {
    /// Creates a mock stage returning `Success`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            result: Mutex::new(Ok(WorkflowState::Success)),
            call_count: Mutex::new(0),
        }
    }

    /// Creates a mock stage returning the given outcome.
    #[must_use]
    pub fn returning(state: WorkflowState) -> Self {
        Self {
            result: Mutex::new(Ok(state)),
            call_count: Mutex::new(0),
        }
    }

    /// Creates a mock stage that fails with a stage-local fault.
    #[must_use]
    pub fn erroring(message: impl Into<String>) -> Self {
        Self {
            result: Mutex::new(Err(message.into())),
            call_count: Mutex::new(0),
        }
    }

    /// Replaces the configured result.
    pub fn set_outcome(&self, state: WorkflowState) {
        *self.result.lock() = Ok(state);
    }

    /// Returns how many times the stage has executed.
    #[must_use]
    pub fn call_count(&self) -> usize {
        *self.call_count.lock()
    }
}

impl Default for MockStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for MockStage {
    async fn execute(&self, _ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        *self.call_count.lock() += 1;
        match &*self.result.lock() {
            Ok(state) => Ok(*state),
            Err(message) => Err(MarketflowError::StageExecution(message.clone())),
        }
    }
}

/// A quote source serving one canned frame for every symbol.
#[derive(Debug)]
pub struct StaticQuoteSource {
    frame: Frame,
    requests: Mutex<Vec<String>>,
}

impl StaticQuoteSource {
    /// Creates a source serving the given frame.
    #[must_use]
    pub fn new(frame: Frame) -> Self {
        Self {
            frame,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// The symbols requested so far, in order.
    #[must_use]
    pub fn requested_symbols(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// How many fetches have been served.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl QuoteSource for StaticQuoteSource {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn daily_history(
        &self,
        symbol: &str,
        _range: &TimeRange,
    ) -> Result<Frame, MarketflowError> {
        self.requests.lock().push(symbol.to_string());
        Ok(self.frame.clone())
    }
}
