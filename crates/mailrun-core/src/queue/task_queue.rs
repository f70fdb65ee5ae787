//! Ordered task queue keyed by task file identifier.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::{BodyTemplates, Normalization, expand, normalize};
use crate::domain::{MailrunError, QueuedTask, RenderedTask, ServiceKind, TaskBody, TaskRecord};
use crate::ports::{ProfileStore, TemplateSource};

/// File identifier plus the rendered task, or the error that prevented rendering.
pub type Popped = (String, Result<RenderedTask, MailrunError>);

/// Queue of normalized tasks.
///
/// Iteration and retrieval follow file-identifier order. The queue owns
/// removal: a popped task is gone whether or not it could be rendered.
pub struct TaskQueue {
    tasks: BTreeMap<String, QueuedTask>,
    templates: Arc<dyn TemplateSource>,
}

impl TaskQueue {
    pub fn new(templates: Arc<dyn TemplateSource>) -> Self {
        Self {
            tasks: BTreeMap::new(),
            templates,
        }
    }

    /// Insert (or replace) the task stored under `id`.
    pub fn insert(&mut self, id: impl Into<String>, task: QueuedTask) {
        self.tasks.insert(id.into(), task);
    }

    /// Normalize `record` and insert it. Returns the skipped recipients.
    pub fn load(
        &mut self,
        id: &str,
        record: TaskRecord,
        profiles: &dyn ProfileStore,
    ) -> Result<Vec<MailrunError>, MailrunError> {
        let Normalization { task, skipped } = normalize(id, record, profiles)?;
        self.insert(id, task);
        Ok(skipped)
    }

    pub fn count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn counts_by_kind(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for task in self.tasks.values() {
            *counts.entry(task.service.as_str().to_string()).or_insert(0) += 1;
        }
        counts
    }

    /// Remove the first processable task of `kind` and render it.
    ///
    /// `None` means no such task remains. Unprocessed kinds are never returned.
    pub fn pop_by_kind(&mut self, kind: &ServiceKind) -> Option<Popped> {
        let id = self
            .tasks
            .iter()
            .find(|(_, task)| &task.service == kind && matches!(task.body, TaskBody::Mailer(_)))
            .map(|(id, _)| id.clone())?;

        let task = self.tasks.remove(&id)?;
        let TaskBody::Mailer(normalized) = task.body else {
            return None;
        };

        debug!(task = %id, remaining = self.tasks.len(), "task popped");

        let rendered = BodyTemplates::load(self.templates.as_ref(), normalized.template())
            .map(|bodies| expand(&normalized, &bodies));
        Some((id, rendered))
    }
}
