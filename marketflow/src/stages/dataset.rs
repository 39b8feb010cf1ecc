//! The dataset join stage.

use async_trait::async_trait;
use tracing::info;

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::{Frame, SelectedData};
use crate::errors::MarketflowError;
use crate::stages::Stage;
use crate::util::fs::make_directory;

/// Inner-joins the selected frames into one ticker-prefixed dataset.
///
/// Columns are renamed `{ticker}_{column}`; only timestamps present for
/// every instrument survive the join. An empty result is a `Failed`
/// outcome: a dataset with no common timestamps is unusable downstream.
///
/// Context keys: requires `config` and the selected-data key; produces the
/// dataset key (default `dataset`), optionally writing `dataset.csv` under
/// the reporting output directory.
pub struct JoinedDatasetStage {
    selected_data_key: ContextKey<SelectedData>,
    dataset_key: ContextKey<Frame>,
    save_datasets: bool,
}

impl JoinedDatasetStage {
    /// Creates the stage with the default keys.
    #[must_use]
    pub fn new(save_datasets: bool) -> Self {
        Self {
            selected_data_key: keys::SELECTED_DATA,
            dataset_key: keys::DATASET,
            save_datasets,
        }
    }

    /// Overrides the selected-data key.
    #[must_use]
    pub fn with_selected_data_key(mut self, key: ContextKey<SelectedData>) -> Self {
        self.selected_data_key = key;
        self
    }

    /// Overrides the dataset output key.
    #[must_use]
    pub fn with_dataset_key(mut self, key: ContextKey<Frame>) -> Self {
        self.dataset_key = key;
        self
    }
}

#[async_trait]
impl Stage for JoinedDatasetStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let selected = ctx.require(&self.selected_data_key)?;

        let mut dataset: Option<Frame> = None;
        for (ticker, frame) in selected {
            let prefixed = frame.prefixed(ticker);
            dataset = Some(match dataset {
                None => prefixed,
                Some(joined) => joined.inner_join(&prefixed)?,
            });
        }
        let dataset = dataset.ok_or_else(|| {
            MarketflowError::Data("no selected data to join into a dataset".to_string())
        })?;

        if dataset.is_empty() {
            info!("joined dataset has no common timestamps");
            return Ok(WorkflowState::Failed);
        }

        if self.save_datasets {
            let directory = make_directory(&config.research.reporting.output_directory)?;
            let path = directory.join("dataset.csv");
            let date_column = &config
                .research
                .target_quoted_instrument
                .data_loading
                .date_column;
            dataset.write_csv(&path, date_column)?;
            info!(path = %path.display(), shape = ?dataset.shape(), "saved joined dataset");
        }

        ctx.set(&self.dataset_key, dataset);
        Ok(WorkflowState::Success)
    }
}
