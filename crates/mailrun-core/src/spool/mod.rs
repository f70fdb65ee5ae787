//! Spool - ディレクトリ構成とファイルの状態遷移
//!
//! 状態はファイルの置き場所そのもの。遷移は同一ファイルシステム内の rename のみで、
//! 途中でクラッシュしてもファイルは元の場所に残る。
//!
//! ```text
//! tasks/            Pending
//! tasks/complete/   Completed
//! tasks/suspend/    日付 (DDMMYYYY) で始まる .json が当日に tasks/ へ戻る
//! mail/out/         Outbound
//! mail/send/        Sent
//! mail/bad/         Failed
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use tracing::info;

use crate::config::Directories;
use crate::domain::{DeliveryOutcome, MailrunError, MessageFileState, TaskFileState};
use crate::impls::fs::TASK_EXTENSION;

/// `strftime` pattern of the date prefix of suspended task files.
pub const SUSPEND_DATE_FORMAT: &str = "%d%m%Y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolLayout {
    pub tasks: PathBuf,
    pub complete: PathBuf,
    pub suspend: PathBuf,
    pub templates: PathBuf,
    pub assets: PathBuf,
    pub images: PathBuf,
    pub outbound: PathBuf,
    pub sent: PathBuf,
    pub bad: PathBuf,
    pub logs: PathBuf,
}

impl SpoolLayout {
    pub fn new(dirs: &Directories) -> Self {
        let assets = dirs.templates.join("files");
        Self {
            tasks: dirs.tasks.clone(),
            complete: dirs.tasks.join("complete"),
            suspend: dirs.tasks.join("suspend"),
            templates: dirs.templates.clone(),
            images: assets.join("images"),
            assets,
            outbound: dirs.mail.join("out"),
            sent: dirs.mail.join("send"),
            bad: dirs.mail.join("bad"),
            logs: dirs.logs.clone(),
        }
    }

    fn all(&self) -> [&Path; 10] {
        [
            &self.tasks,
            &self.complete,
            &self.suspend,
            &self.templates,
            &self.assets,
            &self.images,
            &self.outbound,
            &self.sent,
            &self.bad,
            &self.logs,
        ]
    }

    /// Create every directory that is missing.
    pub fn ensure(&self) -> Result<(), MailrunError> {
        for dir in self.all() {
            fs::create_dir_all(dir)
                .map_err(|e| MailrunError::Config(format!("cannot create {}: {e}", dir.display())))?;
        }
        Ok(())
    }

    /// Move today's suspended task files back into the tasks directory.
    ///
    /// Returns the names that were moved, in name order.
    pub fn reactivate_suspended(&self, today: NaiveDate) -> Result<Vec<String>, MailrunError> {
        let prefix = today.format(SUSPEND_DATE_FORMAT).to_string();

        let mut due = Vec::new();
        for entry in fs::read_dir(&self.suspend)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with(&prefix) && name.ends_with(TASK_EXTENSION) {
                due.push(name);
            }
        }
        due.sort();

        for name in &due {
            fs::rename(self.suspend.join(name), self.tasks.join(name))?;
            info!(task = %name, "suspended task reactivated");
        }
        Ok(due)
    }

    /// Pending -> Completed.
    pub fn complete_task(&self, id: &str) -> Result<TaskFileState, MailrunError> {
        let next = TaskFileState::Completed;
        transition(
            TaskFileState::Pending.can_transition_to(next),
            &self.tasks.join(id),
            &self.complete.join(id),
        )?;
        Ok(next)
    }

    /// Outbound -> Sent or Failed, by outcome.
    pub fn settle_artifact(
        &self,
        name: &str,
        outcome: &DeliveryOutcome,
    ) -> Result<MessageFileState, MailrunError> {
        let next = MessageFileState::after(outcome);
        let target = match next {
            MessageFileState::Sent => &self.sent,
            MessageFileState::Failed => &self.bad,
            MessageFileState::Outbound => &self.outbound,
        };
        transition(
            MessageFileState::Outbound.can_transition_to(next),
            &self.outbound.join(name),
            &target.join(name),
        )?;
        Ok(next)
    }
}

fn transition(allowed: bool, from: &Path, to: &Path) -> Result<(), MailrunError> {
    if !allowed {
        return Err(MailrunError::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("illegal transition {} -> {}", from.display(), to.display()),
        )));
    }
    fs::rename(from, to)?;
    Ok(())
}
