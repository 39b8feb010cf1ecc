//! The run state machine value.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The state of a workflow run, and the outcome of a single stage.
///
/// Stage implementations may only return [`WorkflowState::Failed`],
/// [`WorkflowState::Success`], or [`WorkflowState::Aborted`].
/// [`WorkflowState::Initialized`] and [`WorkflowState::Finished`] are
/// orchestrator-internal sentinels: the former is the starting value of a
/// run before any stage has executed, the latter is recorded by the
/// orchestrator alone after a full pass completed with no interruption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// No stage has executed yet.
    Initialized,
    /// The most recent stage detected an error local to its own logic.
    Failed,
    /// The most recent stage completed normally.
    Success,
    /// The most recent stage deliberately declined to proceed.
    Aborted,
    /// Every stage of a full run completed, none was skipped.
    Finished,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self::Initialized
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Initialized => write!(f, "initialized"),
            Self::Failed => write!(f, "failed"),
            Self::Success => write!(f, "success"),
            Self::Aborted => write!(f, "aborted"),
            Self::Finished => write!(f, "finished"),
        }
    }
}

impl WorkflowState {
    /// Returns true if this state halts the remaining stages of a run.
    #[must_use]
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Failed | Self::Aborted)
    }

    /// Returns true if a stage is allowed to return this state.
    ///
    /// The two sentinels are reserved for the orchestrator; a stage that
    /// returns one of them is recorded as `Failed`.
    #[must_use]
    pub fn is_stage_outcome(&self) -> bool {
        matches!(self, Self::Failed | Self::Success | Self::Aborted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(WorkflowState::Initialized.to_string(), "initialized");
        assert_eq!(WorkflowState::Failed.to_string(), "failed");
        assert_eq!(WorkflowState::Success.to_string(), "success");
        assert_eq!(WorkflowState::Aborted.to_string(), "aborted");
        assert_eq!(WorkflowState::Finished.to_string(), "finished");
    }

    #[test]
    fn test_default_is_initialized() {
        assert_eq!(WorkflowState::default(), WorkflowState::Initialized);
    }

    #[test]
    fn test_interruption() {
        assert!(WorkflowState::Failed.is_interruption());
        assert!(WorkflowState::Aborted.is_interruption());
        assert!(!WorkflowState::Success.is_interruption());
        assert!(!WorkflowState::Initialized.is_interruption());
        assert!(!WorkflowState::Finished.is_interruption());
    }

    #[test]
    fn test_stage_outcomes_exclude_sentinels() {
        assert!(WorkflowState::Failed.is_stage_outcome());
        assert!(WorkflowState::Success.is_stage_outcome());
        assert!(WorkflowState::Aborted.is_stage_outcome());
        assert!(!WorkflowState::Initialized.is_stage_outcome());
        assert!(!WorkflowState::Finished.is_stage_outcome());
    }

    #[test]
    fn test_serialize() {
        let json = serde_json::to_string(&WorkflowState::Aborted).unwrap();
        assert_eq!(json, r#""aborted""#);

        let deserialized: WorkflowState = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, WorkflowState::Aborted);
    }
}
