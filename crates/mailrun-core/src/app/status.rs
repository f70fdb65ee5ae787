//! Status - 実行結果の集計
//!
//! CLI が実行の最後にログへ出す。

use serde::{Deserialize, Serialize};

/// Counters for one run of the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Suspended task files moved back for today.
    pub reactivated: usize,

    /// Task files read and queued (any kind).
    pub tasks_loaded: usize,

    /// Task files that could not be read, normalized or rendered.
    pub tasks_skipped: usize,

    /// Task files moved to `complete/`.
    pub tasks_completed: usize,

    pub delivered: usize,
    pub failed: usize,

    /// Recipients dropped before dispatch (no profile data, compose failure).
    pub recipients_skipped: usize,
}

impl RunSummary {
    /// Messages that reached the dispatcher.
    pub fn attempted(&self) -> usize {
        self.delivered + self.failed
    }
}
