//! The sequential workflow orchestrator.
//!
//! A [`Workflow`] holds an ordered registry of named stages, a stage
//! pointer, and the recorded run state. It can execute the whole pipeline
//! in declared order, or step a single stage forward or backward. The
//! orchestrator's responsibility is sequencing and outcome interpretation
//! only: a stage fault (`Err`) propagates to the caller unhandled, and the
//! [`crate::processor::Processor`] is the recovery boundary.
//!
//! One `Workflow` instance must be driven by a single logical caller at a
//! time; the stage pointer is unsynchronized mutable state by design.

#[cfg(test)]
mod integration_tests;

use indexmap::IndexMap;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::context::WorkflowContext;
use crate::core::WorkflowState;
use crate::errors::MarketflowError;
use crate::events::{EventSink, NoOpEventSink};
use crate::stages::Stage;

/// Position of the stage pointer before the first stage has executed.
const BEFORE_FIRST: isize = -1;

/// Builder for a [`Workflow`].
pub struct WorkflowBuilder {
    name: String,
    stages: IndexMap<String, Arc<dyn Stage>>,
    events: Arc<dyn EventSink>,
}

impl WorkflowBuilder {
    /// Creates a builder for a workflow with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: IndexMap::new(),
            events: Arc::new(NoOpEventSink),
        }
    }

    /// Appends a named stage.
    ///
    /// Stage names must be unique within one workflow; registering a
    /// duplicate is rejected.
    pub fn stage(
        mut self,
        name: impl Into<String>,
        stage: Arc<dyn Stage>,
    ) -> Result<Self, MarketflowError> {
        let name = name.into();
        if self.stages.contains_key(&name) {
            return Err(MarketflowError::DuplicateStage(name));
        }
        self.stages.insert(name, stage);
        Ok(self)
    }

    /// Injects the observability handle used for run and stage events.
    #[must_use]
    pub fn event_sink(mut self, events: Arc<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    /// Builds the workflow.
    #[must_use]
    pub fn build(self) -> Workflow {
        Workflow {
            name: self.name,
            stages: self.stages,
            position: BEFORE_FIRST,
            state: WorkflowState::Initialized,
            events: self.events,
        }
    }
}

/// An ordered sequence of named stages plus the run state machine.
pub struct Workflow {
    name: String,
    stages: IndexMap<String, Arc<dyn Stage>>,
    position: isize,
    state: WorkflowState,
    events: Arc<dyn EventSink>,
}

impl Workflow {
    /// Starts building a workflow.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    /// The workflow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The number of registered stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// The registered stage names, in declared order.
    pub fn stage_names(&self) -> impl Iterator<Item = &str> {
        self.stages.keys().map(String::as_str)
    }

    /// The name of the stage the pointer rests on, if any.
    ///
    /// `None` while the pointer is at the before-first sentinel.
    #[must_use]
    pub fn current_stage(&self) -> Option<&str> {
        usize::try_from(self.position)
            .ok()
            .and_then(|index| self.stages.get_index(index))
            .map(|(name, _)| name.as_str())
    }

    /// The recorded state of the most recently executed stage, or of the
    /// run as a whole after a clean full pass.
    #[must_use]
    pub fn current_state(&self) -> WorkflowState {
        self.state
    }

    /// The raw stage pointer (`-1` before the first stage).
    #[must_use]
    pub fn position(&self) -> isize {
        self.position
    }

    /// The injected observability handle.
    #[must_use]
    pub fn event_sink(&self) -> Arc<dyn EventSink> {
        Arc::clone(&self.events)
    }

    /// Executes every stage from the first to the last, in declared order.
    ///
    /// After each stage its outcome is inspected: `Failed` or `Aborted`
    /// halts the run immediately and becomes the run's final state; the
    /// remaining stages never execute. A clean pass over all stages is
    /// recorded as [`WorkflowState::Finished`].
    ///
    /// A stage fault (`Err`) propagates; the recorded state and the pointer
    /// are left parked on the faulting stage.
    pub async fn execute(
        &mut self,
        ctx: &mut WorkflowContext,
    ) -> Result<WorkflowState, MarketflowError> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();
        self.events.try_emit(
            "workflow.started",
            Some(json!({
                "workflow": self.name,
                "run_id": run_id.to_string(),
                "stages": self.stages.len(),
            })),
        );

        for index in 0..self.stages.len() {
            let state = self.run_stage(index, ctx).await?;
            if state.is_interruption() {
                self.events.try_emit(
                    "workflow.interrupted",
                    Some(json!({
                        "workflow": self.name,
                        "run_id": run_id.to_string(),
                        "stage": self.current_stage(),
                        "state": state.to_string(),
                    })),
                );
                return Ok(state);
            }
        }

        self.state = WorkflowState::Finished;
        self.events.try_emit(
            "workflow.completed",
            Some(json!({
                "workflow": self.name,
                "run_id": run_id.to_string(),
                "state": self.state.to_string(),
                "duration_ms": started.elapsed().as_secs_f64() * 1000.0,
            })),
        );
        Ok(self.state)
    }

    /// Advances the stage pointer by one and executes the stage landed on.
    ///
    /// A step refused by the boundary rule is a no-op returning the recorded
    /// state unchanged.
    pub async fn execute_next_stage(
        &mut self,
        ctx: &mut WorkflowContext,
    ) -> Result<WorkflowState, MarketflowError> {
        self.execute_sibling_stage(ctx, 1).await
    }

    /// Rewinds the stage pointer by one and executes the stage landed on.
    ///
    /// Stepping replays the stage's side effects; it does not undo them.
    pub async fn execute_previous_stage(
        &mut self,
        ctx: &mut WorkflowContext,
    ) -> Result<WorkflowState, MarketflowError> {
        self.execute_sibling_stage(ctx, -1).await
    }

    async fn execute_sibling_stage(
        &mut self,
        ctx: &mut WorkflowContext,
        shift: isize,
    ) -> Result<WorkflowState, MarketflowError> {
        let candidate = self.position + shift;
        if !Self::step_boundary_admits(candidate, self.stages.len()) {
            return Ok(self.state);
        }
        let Ok(index) = usize::try_from(candidate) else {
            return Ok(self.state);
        };
        self.run_stage(index, ctx).await
    }

    /// The step navigation boundary rule: a step is admitted only onto an
    /// interior index, `0 < candidate < stage_count`.
    ///
    /// Index 0 is deliberately out of reach of the stepping API: the first
    /// stage runs only within a full [`Workflow::execute`] pass, and a step
    /// that would land on it (or outside the list) is a no-op.
    fn step_boundary_admits(candidate: isize, stage_count: usize) -> bool {
        usize::try_from(candidate).is_ok_and(|index| index > 0 && index < stage_count)
    }

    async fn run_stage(
        &mut self,
        index: usize,
        ctx: &mut WorkflowContext,
    ) -> Result<WorkflowState, MarketflowError> {
        let (name, stage) = self
            .stages
            .get_index(index)
            .map(|(name, stage)| (name.clone(), Arc::clone(stage)))
            .ok_or_else(|| {
                MarketflowError::StageExecution(format!("stage index {index} out of range"))
            })?;

        self.position = isize::try_from(index).unwrap_or(isize::MAX);

        self.events
            .try_emit("stage.started", Some(json!({ "stage": name })));
        let started = Instant::now();

        match stage.execute(ctx).await {
            Ok(outcome) => {
                let outcome = if outcome.is_stage_outcome() {
                    outcome
                } else {
                    // Sentinels are reserved for the orchestrator; a stage
                    // returning one has not produced a definite outcome.
                    self.events.try_emit(
                        "stage.invalid_outcome",
                        Some(json!({
                            "stage": name,
                            "returned": outcome.to_string(),
                        })),
                    );
                    WorkflowState::Failed
                };
                self.state = outcome;
                self.events.try_emit(
                    "stage.completed",
                    Some(json!({
                        "stage": name,
                        "state": outcome.to_string(),
                        "duration_ms": started.elapsed().as_secs_f64() * 1000.0,
                    })),
                );
                Ok(outcome)
            }
            Err(error) => {
                self.events.try_emit(
                    "stage.failed",
                    Some(json!({
                        "stage": name,
                        "error": error.to_string(),
                        "duration_ms": started.elapsed().as_secs_f64() * 1000.0,
                    })),
                );
                Err(error)
            }
        }
    }
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("name", &self.name)
            .field("stages", &self.stage_names().collect::<Vec<_>>())
            .field("position", &self.position)
            .field("state", &self.state)
            .finish()
    }
}
