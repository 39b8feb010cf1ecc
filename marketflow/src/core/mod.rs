//! Core pipeline types shared by every layer.

mod state;

pub use state::WorkflowState;
