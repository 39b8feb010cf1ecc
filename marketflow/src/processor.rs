//! The processing façade: one configuration, one workflow, one context.
//!
//! The processor seeds the run context with the loaded configuration and
//! exposes two execution styles with deliberately different failure
//! semantics:
//!
//! - [`Processor::process`] runs the whole pipeline and fails loud: a
//!   stage-local fault propagates to the caller untouched.
//! - [`Processor::process_next_stage`] / [`Processor::process_previous_stage`]
//!   step one stage at a time and never raise: a fault is logged with the
//!   failing stage's name and swallowed here, leaving the run parked on the
//!   faulting stage. Callers detect the fault by polling
//!   [`Processor::current_workflow_state`].
//!
//! This asymmetry is load-bearing: batch drivers want hard failure,
//! interactive drivers want an inspectable, resumable pipeline.

use serde_json::json;
use tracing::{error, info};

use crate::config::{Config, ConfigLoader};
use crate::context::{keys, WorkflowContext};
use crate::core::WorkflowState;
use crate::errors::MarketflowError;
use crate::workflow::Workflow;

/// Owns one configuration snapshot, one workflow, and the run context.
pub struct Processor {
    config: Config,
    workflow: Workflow,
    context: WorkflowContext,
}

impl Processor {
    /// Loads the configuration and seeds a copy of the given context with it.
    ///
    /// The seed context is copied, never borrowed, so repeated processors
    /// built from the same seed share no mutable state.
    pub fn new(
        config_loader: &ConfigLoader,
        workflow: Workflow,
        seed_context: &WorkflowContext,
    ) -> Result<Self, MarketflowError> {
        let config = config_loader.load_config()?;
        Ok(Self::from_config(config, workflow, seed_context))
    }

    /// Builds a processor around an already-loaded configuration.
    #[must_use]
    pub fn from_config(
        config: Config,
        workflow: Workflow,
        seed_context: &WorkflowContext,
    ) -> Self {
        let mut context = seed_context.clone();
        context.set(&keys::CONFIG, config.clone());
        Self {
            config,
            workflow,
            context,
        }
    }

    /// Runs the whole pipeline. Fail loud: stage faults propagate.
    pub async fn process(&mut self) -> Result<WorkflowState, MarketflowError> {
        info!("start of processing");
        let state = self.workflow.execute(&mut self.context).await?;
        info!(state = %state, "finished processing");
        Ok(state)
    }

    /// Executes the next stage; recovers and logs any stage fault.
    pub async fn process_next_stage(&mut self) {
        info!("start of processing next stage");
        if let Err(fault) = self.workflow.execute_next_stage(&mut self.context).await {
            self.recover(&fault);
        }
        info!("finished processing next stage");
    }

    /// Executes the previous stage; recovers and logs any stage fault.
    pub async fn process_previous_stage(&mut self) {
        info!("start of processing previous stage");
        if let Err(fault) = self.workflow.execute_previous_stage(&mut self.context).await {
            self.recover(&fault);
        }
        info!("finished processing previous stage");
    }

    /// The single point where stage faults turn into recorded, swallowed
    /// failures. No rollback: the context keeps whatever the stage wrote
    /// before faulting.
    fn recover(&self, fault: &MarketflowError) {
        let stage = self.workflow.current_stage().unwrap_or("<before first>");
        error!(stage = %stage, error = %fault, "error on stage, recovered");
        self.workflow.event_sink().try_emit(
            "stage.recovered",
            Some(json!({
                "stage": stage,
                "error": fault.to_string(),
            })),
        );
    }

    /// The held configuration snapshot.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The name of the stage the pipeline is parked on, if any.
    #[must_use]
    pub fn current_workflow_stage(&self) -> Option<&str> {
        self.workflow.current_stage()
    }

    /// The recorded state of the run.
    #[must_use]
    pub fn current_workflow_state(&self) -> WorkflowState {
        self.workflow.current_state()
    }

    /// The live run context.
    #[must_use]
    pub fn context(&self) -> &WorkflowContext {
        &self.context
    }
}
