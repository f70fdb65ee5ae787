//! Pipeline - バッチ 1 回分の実行
//!
//! # フロー
//! 1. suspend/ から当日分のタスクを戻す
//! 2. tasks/ の全タスクを読み込み、正規化してキューへ
//! 3. `count()` 回だけ mailer タスクを pop（None なら打ち切り）
//! 4. 受信者ごとに compose → dispatch → send/ か bad/ へ移動 → ログ
//! 5. タスクファイルを complete/ へ移動
//!
//! 逐次実行のみ。止まるのは状態遷移（rename）の失敗だけで、
//! それ以外の失敗はログに出して次の受信者・タスクへ進む。

use std::sync::Arc;

use tracing::{error, info, warn};

use super::RunSummary;
use crate::config::LogLabels;
use crate::domain::{MailrunError, RenderedRecipient, RenderedTask, ServiceKind};
use crate::mail::{MailDispatcher, MessageComposer, MessageDraft};
use crate::ports::{Clock, ProfileStore, TaskSource};
use crate::queue::TaskQueue;
use crate::spool::SpoolLayout;

/// Logged when a recipient has no value for a label key.
const MISSING_LABEL: &str = "-";

pub struct Pipeline {
    layout: SpoolLayout,
    tasks: Arc<dyn TaskSource>,
    profiles: Arc<dyn ProfileStore>,
    queue: TaskQueue,
    composer: MessageComposer,
    dispatcher: MailDispatcher,
    clock: Arc<dyn Clock>,
    labels: LogLabels,
}

impl Pipeline {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        layout: SpoolLayout,
        tasks: Arc<dyn TaskSource>,
        profiles: Arc<dyn ProfileStore>,
        queue: TaskQueue,
        composer: MessageComposer,
        dispatcher: MailDispatcher,
        clock: Arc<dyn Clock>,
        labels: LogLabels,
    ) -> Self {
        Self {
            layout,
            tasks,
            profiles,
            queue,
            composer,
            dispatcher,
            clock,
            labels,
        }
    }

    pub fn layout(&self) -> &SpoolLayout {
        &self.layout
    }

    /// Run one batch.
    ///
    /// Errors only when the layout cannot be prepared, the tasks directory
    /// cannot be listed, or a state transition fails.
    pub async fn run(&mut self) -> Result<RunSummary, MailrunError> {
        let mut summary = RunSummary::default();

        self.layout.ensure()?;
        summary.reactivated = self.layout.reactivate_suspended(self.clock.today())?.len();

        self.load_tasks(&mut summary)?;
        info!(
            queued = self.queue.count(),
            by_kind = ?self.queue.counts_by_kind(),
            "tasks queued"
        );

        let mailer = ServiceKind::mailer();
        for _ in 0..self.queue.count() {
            let Some((id, rendered)) = self.queue.pop_by_kind(&mailer) else {
                break;
            };

            let task = match rendered {
                Ok(task) => task,
                Err(e) => {
                    error!(task = %id, error = %e, "task skipped");
                    summary.tasks_skipped += 1;
                    continue;
                }
            };

            self.deliver_task(&id, &task, &mut summary).await?;
            self.layout.complete_task(&id)?;
            summary.tasks_completed += 1;
            info!(task = %id, "task completed");
        }

        if !self.queue.is_empty() {
            warn!(left = self.queue.count(), "unprocessed tasks left in queue");
        }

        info!(
            delivered = summary.delivered,
            failed = summary.failed,
            tasks_completed = summary.tasks_completed,
            "run finished"
        );
        Ok(summary)
    }

    fn load_tasks(&mut self, summary: &mut RunSummary) -> Result<(), MailrunError> {
        for id in self.tasks.list()? {
            let record = match self.tasks.load(&id) {
                Ok(record) => record,
                Err(e) => {
                    error!(task = %id, error = %e, "task file skipped");
                    summary.tasks_skipped += 1;
                    continue;
                }
            };

            match self.queue.load(&id, record, self.profiles.as_ref()) {
                Ok(skipped) => {
                    summary.tasks_loaded += 1;
                    summary.recipients_skipped += skipped.len();
                }
                Err(e) => {
                    error!(task = %id, error = %e, "task file skipped");
                    summary.tasks_skipped += 1;
                }
            }
        }
        Ok(())
    }

    async fn deliver_task(
        &self,
        id: &str,
        task: &RenderedTask,
        summary: &mut RunSummary,
    ) -> Result<(), MailrunError> {
        for recipient in &task.recipients {
            let company = label(recipient, &self.labels.company_key);
            let project = label(recipient, &self.labels.project_key);

            let draft = MessageDraft {
                from: &task.from,
                to: &recipient.address,
                subject: &recipient.subject,
                plain: &recipient.plain,
                html: &recipient.html,
                images: task.images.as_ref(),
                attachments: task.attachments.as_ref(),
            };

            let composed = match self.composer.compose(&draft) {
                Ok(composed) => composed,
                Err(e) => {
                    error!(
                        task = %id,
                        from = %task.from,
                        to = %recipient.address,
                        company,
                        project,
                        error = %e,
                        "message not composed"
                    );
                    summary.recipients_skipped += 1;
                    continue;
                }
            };

            let artifact = composed.file_name();
            let outcome = self.dispatcher.send(&composed.path).await;
            self.layout.settle_artifact(&artifact, &outcome)?;

            match outcome.reason() {
                None => {
                    summary.delivered += 1;
                    info!(
                        from = %task.from,
                        to = %recipient.address,
                        company,
                        project,
                        artifact = %artifact,
                        "message delivered"
                    );
                }
                Some(reason) => {
                    summary.failed += 1;
                    error!(
                        from = %task.from,
                        to = %recipient.address,
                        company,
                        project,
                        artifact = %artifact,
                        reason,
                        "delivery failed"
                    );
                }
            }
        }
        Ok(())
    }
}

/// Value of a label key in the recipient's merged substitutions.
fn label<'a>(recipient: &'a RenderedRecipient, key: &str) -> &'a str {
    recipient
        .replaces
        .get(key)
        .map(String::as_str)
        .unwrap_or(MISSING_LABEL)
}
