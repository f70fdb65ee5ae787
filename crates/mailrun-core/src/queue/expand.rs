//! Recipient expansion: one rendered subject/body set per recipient.

use crate::domain::{
    MailrunError, NormalizedTask, RecipientEntry, RenderedRecipient, RenderedTask, Substitutions,
};
use crate::ports::TemplateSource;
use crate::template::{merge, render};

/// Plain and HTML body templates of one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyTemplates {
    pub plain: String,
    pub html: String,
}

impl BodyTemplates {
    pub const PLAIN_EXTENSION: &'static str = "txt";
    pub const HTML_EXTENSION: &'static str = "html";

    /// Load `<name>.txt` and `<name>.html`.
    pub fn load(templates: &dyn TemplateSource, name: &str) -> Result<Self, MailrunError> {
        let plain = templates.load(&format!("{name}.{}", Self::PLAIN_EXTENSION))?;
        let html = templates.load(&format!("{name}.{}", Self::HTML_EXTENSION))?;
        Ok(Self { plain, html })
    }
}

pub fn expand_recipient(
    global: &Substitutions,
    entry: &RecipientEntry,
    bodies: &BodyTemplates,
) -> RenderedRecipient {
    let replaces = merge(global, &entry.replaces);
    RenderedRecipient {
        address: entry.address.clone(),
        subject: render(&entry.subject, &replaces),
        plain: render(&bodies.plain, &replaces),
        html: render(&bodies.html, &replaces),
        replaces,
    }
}

pub fn expand(task: &NormalizedTask, bodies: &BodyTemplates) -> RenderedTask {
    RenderedTask {
        service: task.service().clone(),
        from: task.from().to_string(),
        images: task.images().cloned(),
        attachments: task.attachments().cloned(),
        recipients: task
            .recipients()
            .iter()
            .map(|entry| expand_recipient(task.replaces(), entry, bodies))
            .collect(),
    }
}
