//! Command-line entry point for the marketflow research pipeline.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use marketflow::prelude::*;

#[derive(Parser, Debug)]
#[command(name = "marketflow", version, about = "Sequential research pipeline for quoted instruments")]
struct Cli {
    /// Path to the research configuration file
    #[arg(long, default_value = "config/config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Execute the whole pipeline
    Run,
    /// Execute the next pipeline stage and stop
    Step {
        /// Number of stages to advance
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
    /// Execute the previous pipeline stage and stop
    StepBack,
}

/// Wires the standard research pipeline in its declared order.
fn research_workflow(
    source: Arc<dyn QuoteSource>,
    events: Arc<dyn EventSink>,
) -> Result<Workflow, MarketflowError> {
    let workflow = Workflow::builder("research")
        .stage("01-data_loading", Arc::new(DataLoadStage::new(source)))?
        .stage("02-data_tending", Arc::new(DataTendingStage::new()))?
        .stage(
            "03-eda_post_tending",
            Arc::new(AutoEdaStage::new(
                EdaInput::LoadedData {
                    key: keys::DATA,
                    use_remote_data: true,
                },
                "03-eda_post_tending",
                true,
            )),
        )?
        .stage("04-check_dates", Arc::new(CheckDatesStage::new(true)))?
        .stage(
            "05-select_data_by_timerange",
            Arc::new(SelectByTimeRangeStage::new(true)),
        )?
        .stage("06-clear_data", Arc::new(DataClearingStage::new()))?
        .stage(
            "07-prepared_data_report",
            Arc::new(PreparedDataReportStage::new()),
        )?
        .stage("08-treat_data", Arc::new(DataTreatingStage::new()))?
        .stage(
            "09-eda_post_treating",
            Arc::new(AutoEdaStage::new(
                EdaInput::Selected {
                    key: keys::SELECTED_DATA,
                },
                "09-eda_post_treating",
                true,
            )),
        )?
        .stage("11-dataset", Arc::new(JoinedDatasetStage::new(true)))?
        .event_sink(events)
        .build();
    Ok(workflow)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config_loader = ConfigLoader::from_path(&cli.config)?;
    let source: Arc<dyn QuoteSource> = Arc::new(HttpQuoteSource::yahoo_finance());
    let events: Arc<dyn EventSink> = Arc::new(LoggingEventSink::new());
    let workflow = research_workflow(source, events)?;
    let mut processor = Processor::new(&config_loader, workflow, &WorkflowContext::new())?;

    match cli.command {
        Commands::Run => {
            let state = processor.process().await?;
            println!("final state: {state}");
        }
        Commands::Step { count } => {
            for _ in 0..count {
                processor.process_next_stage().await;
            }
            report_position(&processor);
        }
        Commands::StepBack => {
            processor.process_previous_stage().await;
            report_position(&processor);
        }
    }

    Ok(())
}

fn report_position(processor: &Processor) {
    println!(
        "stage: {}, state: {}",
        processor.current_workflow_stage().unwrap_or("<before first>"),
        processor.current_workflow_state()
    );
}
