#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Per-agent episode status, written only by the tree driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ExecutionStatus {
    /// No episode has run yet, or the last one was force-stopped.
    #[default]
    Idle,
    Running,
    Success,
    Failure,
}

impl ExecutionStatus {
    pub fn is_running(self) -> bool {
        self == ExecutionStatus::Running
    }

    /// `Success` or `Failure`: the episode is over.
    pub fn is_terminal(self) -> bool {
        matches!(self, ExecutionStatus::Success | ExecutionStatus::Failure)
    }
}
