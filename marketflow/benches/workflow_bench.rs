//! Benchmarks for orchestrator overhead.

use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use marketflow::context::WorkflowContext;
use marketflow::core::WorkflowState;
use marketflow::stages::{FnStage, Stage};
use marketflow::workflow::Workflow;

fn build_workflow(stages: usize) -> Workflow {
    let mut builder = Workflow::builder("bench");
    for index in 0..stages {
        builder = builder
            .stage(
                format!("stage-{index}"),
                Arc::new(FnStage::new(|_| Ok(WorkflowState::Success))) as Arc<dyn Stage>,
            )
            .expect("unique stage names");
    }
    builder.build()
}

fn workflow_benchmark(c: &mut Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("tokio runtime");

    c.bench_function("execute_ten_success_stages", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let mut workflow = build_workflow(10);
                let mut ctx = WorkflowContext::new();
                workflow.execute(&mut ctx).await
            })
        })
    });
}

criterion_group!(benches, workflow_benchmark);
criterion_main!(benches);
