//! The data tending stage.

use async_trait::async_trait;
use tracing::info;

use crate::config::QuotedInstrument;
use crate::context::{keys, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::ComplexData;
use crate::errors::MarketflowError;
use crate::stages::Stage;
use crate::util::strings::to_snake_case;

/// Applies each instrument's tending rules to its loaded frames: column
/// removal and snake_case renaming, on both the remote and the local half.
///
/// Context keys: requires `config` and `data`; mutates `data` in place.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataTendingStage;

impl DataTendingStage {
    /// Creates the stage.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn tend(instrument: &QuotedInstrument, data: &mut ComplexData) {
        let Some(columns) = &instrument.data_transformation.tending.columns else {
            return;
        };

        if !columns.remove.is_empty() {
            data.remote.frame.drop_columns(&columns.remove);
            data.local.frame.drop_columns(&columns.remove);
        }
        if columns.names.as_ref().is_some_and(|names| names.to_snake_case) {
            data.remote.frame.rename_columns(to_snake_case);
            data.local.frame.rename_columns(to_snake_case);
        }

        info!(
            ticker = %instrument.ticker,
            columns = ?data.remote.frame.column_names().collect::<Vec<_>>(),
            "tended quoted instrument"
        );
    }
}

#[async_trait]
impl Stage for DataTendingStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let data = ctx.require_mut(&keys::DATA)?;

        for instrument in config.instruments() {
            let instrument_data = data.get_mut(&instrument.ticker).ok_or_else(|| {
                MarketflowError::Data(format!(
                    "no loaded data for ticker '{}'",
                    instrument.ticker
                ))
            })?;
            Self::tend(instrument, instrument_data);
        }

        Ok(WorkflowState::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Frame, InstrumentDataSet, LocalData, RemoteData, RemoteSourceName};
    use crate::testing::fixtures::{sample_config, sample_frame};
    use indexmap::IndexMap;

    fn loaded(frame: Frame) -> ComplexData {
        ComplexData {
            remote: RemoteData {
                source: RemoteSourceName::YahooFinance,
                frame: frame.clone(),
            },
            local: LocalData {
                frame,
                source_path: "data/test.csv".into(),
            },
        }
    }

    fn raw_frame() -> Frame {
        let mut columns = IndexMap::new();
        columns.insert("Open".to_string(), vec![1.0; 5]);
        columns.insert("Adj Close".to_string(), vec![2.0; 5]);
        columns.insert("Dividends".to_string(), vec![0.0; 5]);
        Frame::from_columns(sample_frame().index().to_vec(), columns).unwrap()
    }

    #[tokio::test]
    async fn test_removes_and_renames_columns() {
        let mut config = sample_config();
        config.research.quoted_instruments.clear();
        let target = &mut config.research.target_quoted_instrument;
        if let Some(columns) = &mut target.data_transformation.tending.columns {
            columns.remove = vec!["Dividends".to_string()];
        }

        let mut data = InstrumentDataSet::new();
        data.insert("NVDA".to_string(), loaded(raw_frame()));

        let mut ctx = WorkflowContext::new();
        ctx.set(&keys::CONFIG, config);
        ctx.set(&keys::DATA, data);

        let state = DataTendingStage::new().execute(&mut ctx).await.unwrap();
        assert_eq!(state, WorkflowState::Success);

        let data = ctx.require(&keys::DATA).unwrap();
        let names: Vec<&str> = data["NVDA"].remote.frame.column_names().collect();
        assert_eq!(names, vec!["open", "adj_close"]);
        let names: Vec<&str> = data["NVDA"].local.frame.column_names().collect();
        assert_eq!(names, vec!["open", "adj_close"]);
    }

    #[tokio::test]
    async fn test_missing_ticker_is_a_fault() {
        let mut ctx = WorkflowContext::new();
        ctx.set(&keys::CONFIG, sample_config());
        ctx.set(&keys::DATA, InstrumentDataSet::new());

        let error = DataTendingStage::new().execute(&mut ctx).await.unwrap_err();
        assert!(matches!(error, MarketflowError::Data(_)));
    }
}
