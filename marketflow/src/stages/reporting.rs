//! Report and chart rendering stages.

use async_trait::async_trait;
use indexmap::IndexMap;
use tracing::info;

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::data::{Frame, InstrumentDataSet, SelectedData};
use crate::errors::MarketflowError;
use crate::plot::LinePlot;
use crate::report::{render_config_overview, render_frame_report, write_report};
use crate::stages::Stage;
use crate::util::fs::make_directory;
use crate::util::strings::urlify;

/// Renders the prepared-data report: the research overview plus one summary
/// section per selected frame.
///
/// Context keys: requires `config` and the selected-data key; produces no
/// context entries, writes `prepared_data_report.md` under the reporting
/// output directory.
pub struct PreparedDataReportStage {
    selected_data_key: ContextKey<SelectedData>,
}

impl PreparedDataReportStage {
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

impl Default for PreparedDataReportStage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Stage for PreparedDataReportStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let selected = ctx.require(&self.selected_data_key)?;

        let mut content = render_config_overview(&config);
        for (ticker, frame) in selected {
            content.push('\n');
            content.push_str(&render_frame_report(&format!("{ticker}, prepared"), frame));
        }

        let directory = make_directory(&config.research.reporting.output_directory)?;
        let path = directory.join("prepared_data_report.md");
        write_report(&path, &content)?;
        info!(path = %path.display(), "wrote prepared data report");

        Ok(WorkflowState::Success)
    }
}

/// Which context entry an EDA pass reads its frames from.
pub enum EdaInput {
    /// The full loaded data; `use_remote_data` picks the half to describe.
    LoadedData {
        /// The context key holding the loaded data.
        key: ContextKey<InstrumentDataSet>,
        /// Describe the remote half instead of the local one.
        use_remote_data: bool,
    },
    /// Frames already restricted to the research time range.
    Selected {
        /// The context key holding the selected frames.
        key: ContextKey<SelectedData>,
    },
}

/// Renders an exploratory-data-analysis pass: descriptive statistics plus a
/// line chart per column, under a per-pass folder.
///
/// Context keys: requires `config` and the configured input key; produces
/// no context entries, writes `<output>/<eda name>/`.
pub struct AutoEdaStage {
    input: EdaInput,
    eda_name: String,
    report_joined: bool,
}

impl AutoEdaStage {
    /// Creates an EDA pass over the given input.
    ///
    /// With `report_joined` the statistics of all instruments land in one
    /// report file; otherwise each instrument gets its own.
    #[must_use]
    pub fn new(input: EdaInput, eda_name: impl Into<String>, report_joined: bool) -> Self {
        Self {
            input,
            eda_name: eda_name.into(),
            report_joined,
        }
    }

    fn frames(&self, ctx: &WorkflowContext) -> Result<IndexMap<String, Frame>, MarketflowError> {
        match &self.input {
            EdaInput::LoadedData {
                key,
                use_remote_data,
            } => {
                let data = ctx.require(key)?;
                Ok(data
                    .iter()
                    .map(|(ticker, loaded)| {
                        (ticker.clone(), loaded.frame(*use_remote_data).clone())
                    })
                    .collect())
            }
            EdaInput::Selected { key } => {
                let selected = ctx.require(key)?;
                Ok(selected.clone())
            }
        }
    }
}

#[async_trait]
impl Stage for AutoEdaStage {
    async fn execute(&self, ctx: &mut WorkflowContext) -> Result<WorkflowState, MarketflowError> {
        let config = ctx.require(&keys::CONFIG)?.clone();
        let frames = self.frames(ctx)?;

        let directory = make_directory(
            config
                .research
                .reporting
                .output_directory
                .join(&self.eda_name),
        )?;

        let mut joined_report = String::new();
        for (ticker, frame) in &frames {
            let section = render_frame_report(ticker, frame);
            if self.report_joined {
                joined_report.push_str(&section);
                joined_report.push('\n');
            } else {
                write_report(directory.join(format!("{}.md", urlify(ticker))), &section)?;
            }

            for column in frame.column_names() {
                let plot = LinePlot::new(format!("{ticker} {column}"))
                    .with_labels("time", column.to_string());
                let path = directory.join(format!("{}_{}.svg", urlify(ticker), urlify(column)));
                plot.write_svg(&path, frame, column)?;
            }
        }
        if self.report_joined {
            write_report(directory.join("report.md"), &joined_report)?;
        }

        info!(
            eda = %self.eda_name,
            directory = %directory.display(),
            instruments = frames.len(),
            "rendered EDA pass"
        );
        Ok(WorkflowState::Success)
    }
}
