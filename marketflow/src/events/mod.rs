//! Workflow observability events.
//!
//! The orchestrator reports progress through an explicitly injected
//! [`EventSink`] handle rather than a process-global logger registry. One
//! event is emitted on entry and one on exit of every run and every stage,
//! carrying the stage name and resulting state; this is the only externally
//! observable trace of pipeline progress.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};
