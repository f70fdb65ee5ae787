//! InMemory 実装 - 開発・テスト用
//!
//! ファイルも SMTP サーバも使わずにパイプラインを動かすための実装。
//! RecordingTransport は送った内容を記録し、指定した宛先で失敗させられる。

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use lettre::address::Envelope;

use crate::domain::{LookupError, Substitutions};
use crate::ports::{MailTransport, ProfileStore, TemplateSource, TransportError};

#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplateSource {
    templates: BTreeMap<String, String>,
}

impl InMemoryTemplateSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.templates.insert(name.into(), text.into());
        self
    }
}

impl TemplateSource for InMemoryTemplateSource {
    fn load(&self, name: &str) -> Result<String, LookupError> {
        self.templates
            .get(name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryProfileStore {
    profiles: BTreeMap<String, Substitutions>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, address: impl Into<String>, pairs: &[(&str, &str)]) -> Self {
        let subs = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.profiles.insert(address.into(), subs);
        self
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn lookup(&self, address: &str) -> Result<Substitutions, LookupError> {
        self.profiles
            .get(address)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(address.to_string()))
    }
}

/// One message handed to `RecordingTransport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub from: Option<String>,
    pub to: Vec<String>,
    pub raw: Vec<u8>,
}

impl SentMessage {
    pub fn raw_text(&self) -> String {
        String::from_utf8_lossy(&self.raw).into_owned()
    }
}

#[derive(Debug, Default)]
pub struct RecordingTransport {
    sent: Mutex<Vec<SentMessage>>,
    failing_recipients: HashSet<String>,
    fail_all: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails.
    pub fn failing() -> Self {
        Self {
            fail_all: true,
            ..Self::default()
        }
    }

    /// Sends to `address` fail; the rest succeed.
    pub fn failing_for(mut self, address: impl Into<String>) -> Self {
        self.failing_recipients.insert(address.into());
        self
    }

    /// Messages accepted so far (failed sends are not recorded).
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send_raw(&self, envelope: &Envelope, message: &[u8]) -> Result<(), TransportError> {
        let to: Vec<String> = envelope.to().iter().map(|a| a.to_string()).collect();

        if self.fail_all || to.iter().any(|a| self.failing_recipients.contains(a)) {
            return Err(TransportError(format!(
                "535 authentication failed for {}",
                to.join(",")
            )));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(SentMessage {
                from: envelope.from().map(|a| a.to_string()),
                to,
                raw: message.to_vec(),
            });
        Ok(())
    }
}
