//! Task model: raw records, normalized tasks and rendered tasks.
//!
//! Lifecycle of one task file:
//! - `TaskRecord`: the JSON object as read from disk
//! - `NormalizedTask`: fields extracted and recipients paired with profile data
//! - `RenderedTask`: subjects and bodies rendered per recipient (built on pop, never cached)

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Placeholder name -> replacement text.
pub type Substitutions = BTreeMap<String, String>;

/// Kind discriminator of a task (`service` field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceKind(String);

impl ServiceKind {
    pub const MAILER: &'static str = "mailer";

    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn mailer() -> Self {
        Self::new(Self::MAILER)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_mailer(&self) -> bool {
        self.0 == Self::MAILER
    }
}

impl fmt::Display for ServiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Raw task record. Only `service` is required at this level; the rest is kept
/// as-is until a normalizer for that kind looks at it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub service: ServiceKind,

    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl TaskRecord {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Decode the `mailer`-specific fields.
    pub fn mailer_fields(&self) -> Result<MailerFields, serde_json::Error> {
        serde_json::from_value(Value::Object(self.fields.clone()))
    }
}

/// Fields of a `mailer` task.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MailerFields {
    pub from: String,

    /// Comma-separated recipient list.
    pub to: String,

    /// Subject template with `[placeholder]` markers.
    pub subject: String,

    /// Base name; resolved to `<template>.txt` and `<template>.html`.
    pub template: String,

    /// Global substitutions shared by all recipients.
    #[serde(default, deserialize_with = "deserialize_substitutions")]
    pub replaces: Substitutions,

    /// content-id marker -> file name under the assets directory.
    #[serde(default)]
    pub images: Option<BTreeMap<String, String>>,

    /// label -> file name under the assets directory.
    #[serde(default)]
    pub attachments: Option<BTreeMap<String, String>>,

    /// Reserved, not interpreted.
    #[serde(default)]
    pub template_repeat: Option<Value>,

    /// Reserved, not interpreted.
    #[serde(default)]
    pub repeat: Option<Value>,
}

/// Text form of a substitution value.
///
/// Strings are used verbatim, `null` is empty, everything else uses its JSON text.
pub fn substitution_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn substitutions_from_map(map: BTreeMap<String, Value>) -> Substitutions {
    map.into_iter()
        .map(|(k, v)| (k, substitution_text(&v)))
        .collect()
}

pub fn deserialize_substitutions<'de, D>(deserializer: D) -> Result<Substitutions, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = BTreeMap::<String, Value>::deserialize(deserializer)?;
    Ok(substitutions_from_map(raw))
}

/// One recipient of a normalized task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientEntry {
    pub address: String,

    /// Subject template, not rendered yet.
    pub subject: String,

    /// Per-recipient substitutions from the profile store.
    pub replaces: Substitutions,
}

/// A `mailer` task after normalization.
///
/// Immutable once built; the queue consumes it exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTask {
    service: ServiceKind,
    from: String,
    template: String,
    replaces: Substitutions,
    recipients: Vec<RecipientEntry>,
    images: Option<BTreeMap<String, String>>,
    attachments: Option<BTreeMap<String, String>>,
}

impl NormalizedTask {
    pub fn new(
        service: ServiceKind,
        fields: MailerFields,
        recipients: Vec<RecipientEntry>,
    ) -> Self {
        Self {
            service,
            from: fields.from,
            template: fields.template,
            replaces: fields.replaces,
            recipients,
            images: fields.images,
            attachments: fields.attachments,
        }
    }

    pub fn service(&self) -> &ServiceKind {
        &self.service
    }

    pub fn from(&self) -> &str {
        &self.from
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn replaces(&self) -> &Substitutions {
        &self.replaces
    }

    pub fn recipients(&self) -> &[RecipientEntry] {
        &self.recipients
    }

    pub fn images(&self) -> Option<&BTreeMap<String, String>> {
        self.images.as_ref()
    }

    pub fn attachments(&self) -> Option<&BTreeMap<String, String>> {
        self.attachments.as_ref()
    }
}

/// What the queue holds for one task file.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskBody {
    Mailer(NormalizedTask),

    /// A kind nobody processes yet. Kept so the file stays accounted for.
    Unprocessed(TaskRecord),
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueuedTask {
    pub service: ServiceKind,
    pub body: TaskBody,
}

/// Rendered content for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRecipient {
    pub address: String,
    pub subject: String,
    pub plain: String,
    pub html: String,

    /// The merged substitutions used for rendering (global overlaid by recipient).
    pub replaces: Substitutions,
}

/// A `mailer` task with every recipient rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedTask {
    pub service: ServiceKind,
    pub from: String,
    pub images: Option<BTreeMap<String, String>>,
    pub attachments: Option<BTreeMap<String, String>>,
    pub recipients: Vec<RenderedRecipient>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_requires_service() {
        let err = TaskRecord::from_json(r#"{"from":"a@x"}"#).unwrap_err();
        assert!(err.to_string().contains("service"));
    }

    #[test]
    fn record_keeps_unknown_fields() {
        let rec = TaskRecord::from_json(r#"{"service":"sms","phone":"+100"}"#).unwrap();
        assert_eq!(rec.service.as_str(), "sms");
        assert!(!rec.service.is_mailer());
        assert_eq!(rec.fields["phone"], "+100");
    }

    #[test]
    fn mailer_fields_decode_with_optional_parts() {
        let rec = TaskRecord::from_json(
            r#"{
                "service": "mailer",
                "from": "a@x",
                "to": "b@y, c@y",
                "subject": "Hi [Name]",
                "template": "greet",
                "replaces": {"Year": 2025, "Sign": "Team", "Empty": null},
                "images": {"logo": "images/logo.png"},
                "repeat": 3
            }"#,
        )
        .unwrap();

        let fields = rec.mailer_fields().unwrap();
        assert_eq!(fields.to, "b@y, c@y");
        assert_eq!(fields.replaces["Year"], "2025");
        assert_eq!(fields.replaces["Sign"], "Team");
        assert_eq!(fields.replaces["Empty"], "");
        assert_eq!(fields.images.unwrap()["logo"], "images/logo.png");
        assert!(fields.attachments.is_none());
        assert_eq!(fields.repeat, Some(serde_json::json!(3)));
    }

    #[test]
    fn mailer_fields_without_replaces_default_to_empty() {
        let rec = TaskRecord::from_json(
            r#"{"service":"mailer","from":"a@x","to":"b@y","subject":"s","template":"t"}"#,
        )
        .unwrap();
        assert!(rec.mailer_fields().unwrap().replaces.is_empty());
    }

    #[test]
    fn mailer_fields_report_missing_field() {
        let rec = TaskRecord::from_json(r#"{"service":"mailer","from":"a@x"}"#).unwrap();
        let err = rec.mailer_fields().unwrap_err();
        assert!(err.to_string().contains("missing field"));
    }
}
