//! PipelineBuilder - パイプラインの構築とワイヤリング
//!
//! # Fail-fast 設計
//! - 必須の依存（layout, tasks, templates, profiles, transport）が揃っているかを build() で検証
//! - 不足があれば BuildError::Missing にまとめて返す
//! - Clock と IdGenerator は省略時にシステム実装を使う

use std::sync::Arc;

use crate::app::Pipeline;
use crate::config::{Directories, LogLabels};
use crate::domain::MailrunError;
use crate::impls::{FsTaskSource, FsTemplateSource, JsonProfileStore};
use crate::mail::{MailDispatcher, MessageComposer};
use crate::ports::{
    Clock, IdGenerator, MailTransport, ProfileStore, SystemClock, TaskSource, TemplateSource,
    UuidUlidGenerator,
};
use crate::queue::TaskQueue;
use crate::spool::SpoolLayout;

/// BuildError はパイプライン構築時のエラー
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Missing components: {0:?}. These must be set before build().")]
    Missing(Vec<&'static str>),
}

impl From<BuildError> for MailrunError {
    fn from(e: BuildError) -> Self {
        MailrunError::Config(e.to_string())
    }
}

/// # 使用例
/// ```ignore
/// let pipeline = PipelineBuilder::new()
///     .with_directories(&dirs)?
///     .transport(Arc::new(SmtpMailTransport::from_settings(&smtp)?))
///     .build()?;
/// ```
#[derive(Default)]
pub struct PipelineBuilder {
    layout: Option<SpoolLayout>,
    tasks: Option<Arc<dyn TaskSource>>,
    templates: Option<Arc<dyn TemplateSource>>,
    profiles: Option<Arc<dyn ProfileStore>>,
    transport: Option<Arc<dyn MailTransport>>,
    clock: Option<Arc<dyn Clock>>,
    ids: Option<Arc<dyn IdGenerator>>,
    labels: LogLabels,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// File-system layout plus the file-backed sources under it.
    ///
    /// The profile store is read here; a missing or malformed store is a
    /// configuration error.
    pub fn with_directories(self, dirs: &Directories) -> Result<Self, MailrunError> {
        let profiles = JsonProfileStore::open(&dirs.profiles)
            .map_err(|e| MailrunError::Config(format!("profile store: {e}")))?;

        Ok(self
            .layout(SpoolLayout::new(dirs))
            .tasks(Arc::new(FsTaskSource::new(&dirs.tasks)))
            .templates(Arc::new(FsTemplateSource::new(&dirs.templates)))
            .profiles(Arc::new(profiles)))
    }

    pub fn layout(mut self, layout: SpoolLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn tasks(mut self, tasks: Arc<dyn TaskSource>) -> Self {
        self.tasks = Some(tasks);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = Some(templates);
        self
    }

    pub fn profiles(mut self, profiles: Arc<dyn ProfileStore>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn MailTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn ids(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn labels(mut self, labels: LogLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn build(self) -> Result<Pipeline, BuildError> {
        let mut missing = Vec::new();
        if self.layout.is_none() {
            missing.push("layout");
        }
        if self.tasks.is_none() {
            missing.push("tasks");
        }
        if self.templates.is_none() {
            missing.push("templates");
        }
        if self.profiles.is_none() {
            missing.push("profiles");
        }
        if self.transport.is_none() {
            missing.push("transport");
        }

        let (Some(layout), Some(tasks), Some(templates), Some(profiles), Some(transport)) = (
            self.layout,
            self.tasks,
            self.templates,
            self.profiles,
            self.transport,
        ) else {
            return Err(BuildError::Missing(missing));
        };

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UuidUlidGenerator::new(Arc::clone(&clock))));

        let composer = MessageComposer::new(&layout.outbound, &layout.assets, ids);
        let dispatcher = MailDispatcher::new(transport);
        let queue = TaskQueue::new(templates);

        Ok(Pipeline::new(
            layout, tasks, profiles, queue, composer, dispatcher, clock, self.labels,
        ))
    }
}
