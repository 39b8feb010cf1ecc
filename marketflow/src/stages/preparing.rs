//! Row clearing and missing-value treatment stages.

use async_trait::async_trait;
use tracing::info;

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::SelectedData;
use crate::errors::MarketflowError;
use crate::stages::Stage;

const SUPPORTED_CLEARING_RULES: &[&str] = &["drop_incomplete_rows"];
const SUPPORTED_TREATMENT_RULES: &[&str] = &["forward_fill"];

/// Applies each instrument's clearing rules to its selected frame.
///
/// Context keys: requires `config` and the selected-data key; mutates the
/// selected frames in place. An unknown rule name is a stage-local fault.
pub struct DataClearingStage {
    selected_data_key: ContextKey<SelectedData>,
}

impl DataClearingStage {
    /// Creates the stage with the default `selected-data` key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected_data_key: keys::SELECTED_DATA,
        }
    }

    /// Overrides the selected-data key.
    #[must_use]
    pub fn with_selected_data_key(mut self, key: ContextKey<SelectedData>) -> Self {
        self.selected_data_key = key;
        self
    }
}

impl Default for DataClearingStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for DataClearingStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let selected = ctx.require_mut(&self.selected_data_key)?;

        for instrument in config.instruments() {
            let frame = selected.get_mut(&instrument.ticker).ok_or_else(|| {
                MarketflowError::Data(format!(
                    "no selected data for ticker '{}'",
                    instrument.ticker
                ))
            })?;

            for rule in &instrument.data_transformation.clearing {
                match rule.as_str() {
                    "drop_incomplete_rows" => frame.drop_incomplete_rows(),
                    other => {
                        return Err(MarketflowError::Unsupported {
                            option: "data clearing rule",
                            value: other.to_string(),
                            supported: SUPPORTED_CLEARING_RULES.to_vec(),
                        })
                    }
                }
            }
            info!(
                ticker = %instrument.ticker,
                rows = frame.shape().0,
                "cleared selected data"
            );
        }

        Ok(WorkflowState::Success)
    }
}

/// Applies each instrument's treatment rules to its selected frame.
///
/// Context keys: requires `config` and the selected-data key; mutates the
/// selected frames in place. An unknown rule name is a stage-local fault.
pub struct DataTreatingStage {
    selected_data_key: ContextKey<SelectedData>,
}

impl DataTreatingStage {
    /// Creates the stage with the default `selected-data` key.
    #[must_use]
    pub fn new() -> Self {
        Self {
            selected_data_key: keys::SELECTED_DATA,
        }
    }

    /// Overrides the selected-data key.
    #[must_use]
    pub fn with_selected_data_key(mut self, key: ContextKey<SelectedData>) -> Self {
        self.selected_data_key = key;
        self
    }
}

impl Default for DataTreatingStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for DataTreatingStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let selected = ctx.require_mut(&self.selected_data_key)?;

        for instrument in config.instruments() {
            let frame = selected.get_mut(&instrument.ticker).ok_or_else(|| {
                MarketflowError::Data(format!(
                    "no selected data for ticker '{}'",
                    instrument.ticker
                ))
            })?;

            for rule in &instrument.data_transformation.treatment {
                match rule.as_str() {
                    "forward_fill" => frame.forward_fill(),
                    other => {
                        return Err(MarketflowError::Unsupported {
                            option: "data treatment rule",
                            value: other.to_string(),
                            supported: SUPPORTED_TREATMENT_RULES.to_vec(),
                        })
                    }
                }
            }
            info!(ticker = %instrument.ticker, "treated selected data");
        }

        Ok(WorkflowState::Success)
    }
}
