//! End-to-end scenarios for the orchestrator and the processor façade.

use std::sync::Arc;

use crate::context::{keys, ContextKey, WorkflowContext};
use crate::core::WorkflowState;
use crate::errors::MarketflowError;
use crate::events::CollectingEventSink;
use crate::processor::Processor;
use crate::stages::{FnStage, Stage};
use crate::testing::fixtures::sample_config;
use crate::testing::mocks::MockStage;
use crate::workflow::Workflow;
use pretty_assertions::assert_eq;

fn three_stage_workflow(
    first: Arc<MockStage>,
    second: Arc<MockStage>,
    third: Arc<MockStage>,
    events: Arc<CollectingEventSink>,
) -> Workflow {
    Workflow::builder("research")
        .stage("01-first", first)
        .unwrap()
        .stage("02-second", second)
        .unwrap()
        .stage("03-third", third)
        .unwrap()
        .event_sink(events)
        .build()
}

#[tokio::test]
async fn all_success_run_finishes_in_declared_order() {
    let stages = (
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
    );
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = three_stage_workflow(
        stages.0.clone(),
        stages.1.clone(),
        stages.2.clone(),
        events.clone(),
    );

    let mut ctx = WorkflowContext::new();
    let state = workflow.execute(&mut ctx).await.unwrap();

    assert_eq!(state, WorkflowState::Finished);
    assert_eq!(workflow.current_state(), WorkflowState::Finished);
    assert_eq!(stages.0.call_count(), 1);
    assert_eq!(stages.1.call_count(), 1);
    assert_eq!(stages.2.call_count(), 1);
    assert_eq!(
        events.stage_names_of_type("stage.started"),
        vec!["01-first", "02-second", "03-third"]
    );
    assert_eq!(events.events_of_type("workflow.completed").len(), 1);
}

#[tokio::test]
async fn failed_stage_halts_the_run() {
    let stages = (
        Arc::new(MockStage::new()),
        Arc::new(MockStage::returning(WorkflowState::Failed)),
        Arc::new(MockStage::new()),
    );
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = three_stage_workflow(
        stages.0.clone(),
        stages.1.clone(),
        stages.2.clone(),
        events.clone(),
    );

    let mut ctx = WorkflowContext::new();
    let state = workflow.execute(&mut ctx).await.unwrap();

    assert_eq!(state, WorkflowState::Failed);
    // The stage after the failure never executes.
    assert_eq!(stages.2.call_count(), 0);
    assert_eq!(workflow.current_stage(), Some("02-second"));
    assert_eq!(events.events_of_type("workflow.interrupted").len(), 1);
    assert_eq!(events.events_of_type("workflow.completed").len(), 0);
}

#[tokio::test]
async fn rerun_on_fresh_context_is_idempotent() {
    let seed = {
        let mut seed = WorkflowContext::new();
        seed.set(&ContextKey::<String>::new("input"), "same".to_string());
        seed
    };

    let output: ContextKey<String> = ContextKey::new("output");
    let make_workflow = || {
        Workflow::builder("deterministic")
            .stage(
                "only",
                Arc::new(FnStage::new(|ctx| {
                    let input = ctx
                        .require(&ContextKey::<String>::new("input"))?
                        .clone();
                    ctx.set(&ContextKey::<String>::new("output"), input.to_uppercase());
                    Ok(WorkflowState::Success)
                })) as Arc<dyn Stage>,
            )
            .unwrap()
            .build()
    };

    let mut first_ctx = seed.clone();
    let mut second_ctx = seed.clone();
    let first_state = make_workflow().execute(&mut first_ctx).await.unwrap();
    let second_state = make_workflow().execute(&mut second_ctx).await.unwrap();

    assert_eq!(first_state, second_state);
    assert_eq!(
        first_ctx.keys().collect::<Vec<_>>(),
        second_ctx.keys().collect::<Vec<_>>()
    );
    assert_eq!(first_ctx.get(&output), second_ctx.get(&output));
}

#[tokio::test]
async fn step_forward_then_backward_returns_the_pointer() {
    let stages = (
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
    );
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = three_stage_workflow(
        stages.0.clone(),
        stages.1.clone(),
        stages.2.clone(),
        events.clone(),
    );

    let mut ctx = WorkflowContext::new();
    workflow.execute(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 2);

    // Park the pointer on the middle stage, then go forward and back.
    workflow.execute_previous_stage(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 1);
    workflow.execute_next_stage(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 2);
    workflow.execute_previous_stage(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 1);

    // Stepping replays side effects rather than undoing them: the middle
    // stage has now run three times (full run plus two steps onto it).
    assert_eq!(stages.1.call_count(), 3);
}

#[tokio::test]
async fn stepping_is_a_noop_at_both_boundaries() {
    let stages = (
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
    );
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = three_stage_workflow(
        stages.0.clone(),
        stages.1.clone(),
        stages.2.clone(),
        events.clone(),
    );
    let mut ctx = WorkflowContext::new();

    // Below: a fresh pipeline refuses both directions (index 0 is only
    // reachable through a full run).
    let state = workflow.execute_next_stage(&mut ctx).await.unwrap();
    assert_eq!(state, WorkflowState::Initialized);
    let state = workflow.execute_previous_stage(&mut ctx).await.unwrap();
    assert_eq!(state, WorkflowState::Initialized);
    assert_eq!(stages.0.call_count(), 0);
    assert_eq!(workflow.position(), -1);

    // Above: stepping forward off the end returns the prior state unchanged.
    workflow.execute(&mut ctx).await.unwrap();
    let state = workflow.execute_next_stage(&mut ctx).await.unwrap();
    assert_eq!(state, WorkflowState::Finished);
    assert_eq!(workflow.position(), 2);
    assert_eq!(stages.2.call_count(), 1);
}

#[tokio::test]
async fn step_backward_never_reaches_the_first_stage() {
    let stages = (
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
        Arc::new(MockStage::new()),
    );
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = three_stage_workflow(
        stages.0.clone(),
        stages.1.clone(),
        stages.2.clone(),
        events.clone(),
    );
    let mut ctx = WorkflowContext::new();

    workflow.execute(&mut ctx).await.unwrap();
    workflow.execute_previous_stage(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 1);

    // One more step back would land on index 0; the boundary rule refuses.
    let state = workflow.execute_previous_stage(&mut ctx).await.unwrap();
    assert_eq!(workflow.position(), 1);
    assert_eq!(state, workflow.current_state());
    assert_eq!(stages.0.call_count(), 1);
}

#[tokio::test]
async fn sentinel_outcome_from_a_stage_is_recorded_as_failed() {
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = Workflow::builder("research")
        .stage(
            "liar",
            Arc::new(FnStage::new(|_| Ok(WorkflowState::Finished))) as Arc<dyn Stage>,
        )
        .unwrap()
        .event_sink(events.clone())
        .build();

    let mut ctx = WorkflowContext::new();
    let state = workflow.execute(&mut ctx).await.unwrap();

    assert_eq!(state, WorkflowState::Failed);
    assert_eq!(events.events_of_type("stage.invalid_outcome").len(), 1);
}

#[tokio::test]
async fn seeded_config_survives_a_writing_stage() {
    let data_key: ContextKey<Vec<f64>> = ContextKey::new("data");
    let workflow = Workflow::builder("research")
        .stage(
            "writer",
            Arc::new(FnStage::new(|ctx| {
                ctx.set(&ContextKey::<Vec<f64>>::new("data"), vec![1.0, 2.0]);
                Ok(WorkflowState::Success)
            })) as Arc<dyn Stage>,
        )
        .unwrap()
        .build();

    let config = sample_config();
    let mut processor = Processor::from_config(config.clone(), workflow, &WorkflowContext::new());
    processor.process().await.unwrap();

    // Both keys present, and the configuration is unchanged by value.
    assert_eq!(processor.context().get(&data_key), Some(&vec![1.0, 2.0]));
    assert_eq!(processor.context().get(&keys::CONFIG), Some(&config));
}

#[tokio::test]
async fn fault_during_full_run_propagates_with_state_parked() {
    let events = Arc::new(CollectingEventSink::new());
    let mut workflow = Workflow::builder("research")
        .stage("01-first", Arc::new(MockStage::new()) as Arc<dyn Stage>)
        .unwrap()
        .stage(
            "02-second",
            Arc::new(MockStage::erroring("missing prerequisite")) as Arc<dyn Stage>,
        )
        .unwrap()
        .event_sink(events.clone())
        .build();

    let mut ctx = WorkflowContext::new();
    let error = workflow.execute(&mut ctx).await.unwrap_err();

    assert!(matches!(error, MarketflowError::StageExecution(_)));
    // The recorded state is whatever the last completed stage produced.
    assert_eq!(workflow.current_state(), WorkflowState::Success);
    assert_eq!(workflow.current_stage(), Some("02-second"));
    assert_eq!(events.events_of_type("stage.failed").len(), 1);
}
