//! Date validation and time-range selection stages.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::SelectedData;
use crate::errors::MarketflowError;
use crate::stages::Stage;

/// Validates the timestamp index of every loaded frame.
///
/// A non-monotonic index is a `Failed` outcome; loaded data that does not
/// span the research time range is an `Aborted` outcome (the stage declines
/// to let the run continue with holes at its edges).
///
/// Context keys: requires `config` and `data`; produces nothing.
#[derive(Debug, Clone, Copy)]
pub struct CheckDatesStage {
    use_remote_data: bool,
}

impl CheckDatesStage {
    /// Creates the stage; `use_remote_data` selects which half of the
    /// loaded data is validated.
    #[must_use]
    pub fn new(use_remote_data: bool) -> Self {
        Self { use_remote_data }
    }
}

impl Default for CheckDatesStage {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Stage for CheckDatesStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let data = ctx.require(&keys::DATA)?;
        let research_range = &config.research.machine_learning.time_range;

        for instrument in config.instruments() {
            let instrument_data = data.get(&instrument.ticker).ok_or_else(|| {
                MarketflowError::Data(format!(
                    "no loaded data for ticker '{}'",
                    instrument.ticker
                ))
            })?;
            let frame = instrument_data.frame(self.use_remote_data);

            if !frame.is_monotonic_increasing() {
                warn!(ticker = %instrument.ticker, "timestamp index is not increasing");
                return Ok(WorkflowState::Failed);
            }
            if !frame.covers(research_range) {
                info!(
                    ticker = %instrument.ticker,
                    first = ?frame.first_time(),
                    last = ?frame.last_time(),
                    "loaded data does not span the research time range, declining to proceed"
                );
                return Ok(WorkflowState::Aborted);
            }
        }

        Ok(WorkflowState::Success)
    }
}

/// Restricts every loaded frame to the research time range.
///
/// Context keys: requires `config` and `data`; produces the selected
/// per-ticker frames under the configured output key (default
/// `selected-data`).
pub struct SelectByTimeRangeStage {
    use_remote_data: bool,
    selected_data_key: ContextKey<SelectedData>,
}

impl SelectByTimeRangeStage {
    /// Creates the stage with the default `selected-data` output key.
    #[must_use]
    pub fn new(use_remote_data: bool) -> Self {
        Self {
            use_remote_data,
            selected_data_key: keys::SELECTED_DATA,
        }
    }

    /// Overrides the output key.
    #[must_use]
    pub fn with_selected_data_key(mut self, key: ContextKey<SelectedData>) -> Self {
        self.selected_data_key = key;
        self
    }
}

#[async_trait]
impl Stage for SelectByTimeRangeStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let data = ctx.require(&keys::DATA)?;
        let research_range = &config.research.machine_learning.time_range;

        let mut selected = SelectedData::new();
        for instrument in config.instruments() {
            let instrument_data = data.get(&instrument.ticker).ok_or_else(|| {
                MarketflowError::Data(format!(
                    "no loaded data for ticker '{}'",
                    instrument.ticker
                ))
            })?;
            let frame = instrument_data
                .frame(self.use_remote_data)
                .select_range(research_range);
            info!(
                ticker = %instrument.ticker,
                rows = frame.shape().0,
                "selected research time range"
            );
            selected.insert(instrument.ticker.clone(), frame);
        }

        ctx.set(&self.selected_data_key, selected);
        Ok(WorkflowState::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TimeRange;
    use crate::data::{ComplexData, Frame, InstrumentDataSet, LocalData, RemoteData, RemoteSourceName};
    use crate::testing::fixtures::{day, sample_config, sample_frame};
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

    fn single_instrument_context(frame: Frame) -> WorkflowContext {
        let mut config = sample_config();
        config.research.quoted_instruments.clear();

        let mut data = InstrumentDataSet::new();
        data.insert("NVDA".to_string(), loaded(frame));

        let mut ctx = WorkflowContext::new();
        ctx.set(&keys::CONFIG, config);
        ctx.set(&keys::DATA, data);
        ctx
    }

    #[tokio::test]
    async fn test_check_dates_success() {
        let mut ctx = single_instrument_context(sample_frame());
        let state = CheckDatesStage::default().execute(&mut ctx).await.unwrap();
        assert_eq!(state, WorkflowState::Success);
    }

    #[tokio::test]
    async fn test_check_dates_fails_on_disorder() {
        let mut columns = IndexMap::new();
        columns.insert("close".to_string(), vec![1.0, 2.0, 3.0]);
        let shuffled =
            Frame::from_columns(vec![day(1), day(3), day(2)], columns).unwrap();

        let mut ctx = single_instrument_context(shuffled);
        let state = CheckDatesStage::default().execute(&mut ctx).await.unwrap();
        assert_eq!(state, WorkflowState::Failed);
    }

    #[tokio::test]
    async fn test_check_dates_aborts_on_short_coverage() {
        let short = sample_frame().select_range(&TimeRange {
            begin_time: day(2),
            end_time: day(5),
        });

        let mut ctx = single_instrument_context(short);
        let state = CheckDatesStage::default().execute(&mut ctx).await.unwrap();
        assert_eq!(state, WorkflowState::Aborted);
    }

    #[tokio::test]
    async fn test_select_by_time_range() {
        let mut ctx = single_instrument_context(sample_frame());
        let mut config = ctx.require(&keys::CONFIG).unwrap().clone();
        config.research.machine_learning.time_range = TimeRange {
            begin_time: day(2),
            end_time: day(4),
        };
        ctx.set(&keys::CONFIG, config);

        let state = SelectByTimeRangeStage::new(true)
            .execute(&mut ctx)
            .await
            .unwrap();
        assert_eq!(state, WorkflowState::Success);

        let selected = ctx.require(&keys::SELECTED_DATA).unwrap();
        assert_eq!(selected["NVDA"].shape().0, 3);
        // The loaded data is untouched.
        let data = ctx.require(&keys::DATA).unwrap();
        assert_eq!(data["NVDA"].remote.frame.shape().0, 5);
    }

    #[tokio::test]
    async fn test_select_with_configured_output_key() {
        let mut ctx = single_instrument_context(sample_frame());

        let key: ContextKey<SelectedData> = ContextKey::named("selected-remote");
        let state = SelectByTimeRangeStage::new(true)
            .with_selected_data_key(key.clone())
            .execute(&mut ctx)
            .await
            .unwrap();
        assert_eq!(state, WorkflowState::Success);
        assert!(ctx.contains("selected-remote"));
        assert!(!ctx.contains("selected-data"));
    }
}
