//! The data loading stage.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::{InstrumentDataSet, QuoteSource, StrategyBasedDataLoader};
use crate::errors::MarketflowError;
use crate::stages::Stage;

/// Loads remote and local history for every configured instrument.
///
/// Context keys: requires `config`; produces `data` (or the configured
/// output key).
pub struct DataLoadStage {
    source: Arc<dyn QuoteSource>,
    data_key: ContextKey<InstrumentDataSet>,
}

impl DataLoadStage {
    /// Creates the stage with the default `data` output key.
    #[must_use]
    pub fn new(source: Arc<dyn QuoteSource>) -> Self {
        Self {
            source,
            data_key: keys::DATA,
        }
    }

    /// Overrides the output key.
    #[must_use]
    pub fn with_data_key(mut self, data_key: ContextKey<InstrumentDataSet>) -> Self {
        self.data_key = data_key;
        self
    }
}

#[async_trait]
impl Stage for DataLoadStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let mut data = InstrumentDataSet::new();

        for instrument in config.instruments() {
            let loader =
                StrategyBasedDataLoader::new(instrument.clone(), Arc::clone(&self.source));
            let loaded = loader.load_data().await?;
            info!(
                ticker = %instrument.ticker,
                remote_shape = ?loaded.remote.frame.shape(),
                local_shape = ?loaded.local.frame.shape(),
                "loaded data for quoted instrument"
            );
            data.insert(instrument.ticker.clone(), loaded);
        }

        ctx.set(&self.data_key, data);
        Ok(WorkflowState::Success)
    }
}
