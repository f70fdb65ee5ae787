//! File state machines for task files and message artifacts.

use serde::{Deserialize, Serialize};

use super::DeliveryOutcome;

/// Where a task file lives.
///
/// State transitions:
/// - Pending -> Completed (after every recipient was attempted)
///
/// There is no failed state for a task; failures are tracked per message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskFileState {
    /// In the tasks directory, waiting for a run.
    Pending,

    /// Moved to `complete/`.
    Completed,
}

impl TaskFileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskFileState::Completed)
    }

    pub fn can_transition_to(self, next: TaskFileState) -> bool {
        matches!((self, next), (TaskFileState::Pending, TaskFileState::Completed))
    }
}

/// Where a composed message artifact lives.
///
/// State transitions:
/// - Outbound -> Sent
/// - Outbound -> Failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageFileState {
    /// Written to `out/`, not yet dispatched.
    Outbound,

    /// Delivered, moved to `send/`.
    Sent,

    /// Delivery failed, moved to `bad/`.
    Failed,
}

impl MessageFileState {
    /// Terminal state an outbound artifact moves to for a given outcome.
    pub fn after(outcome: &DeliveryOutcome) -> Self {
        if outcome.is_delivered() {
            MessageFileState::Sent
        } else {
            MessageFileState::Failed
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, MessageFileState::Sent | MessageFileState::Failed)
    }

    pub fn can_transition_to(self, next: MessageFileState) -> bool {
        self == MessageFileState::Outbound && next.is_terminal()
    }
}
