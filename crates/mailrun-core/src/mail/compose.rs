//! Message composer.
//!
//! Layout of a composed artifact:
//!
//! ```text
//! multipart/alternative
//! ├── text/plain                (fallback)
//! └── multipart/related
//!     ├── text/html             (preferred)
//!     ├── inline images         (Content-ID referenced from the HTML)
//!     └── attachments
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use tracing::debug;

use crate::domain::{ArtifactId, MailrunError};
use crate::ports::IdGenerator;

/// Domain used for content-ids when the sender has none we can use.
const FALLBACK_CID_DOMAIN: &str = "localhost";

/// Everything needed to compose one message.
#[derive(Debug, Clone, Copy)]
pub struct MessageDraft<'a> {
    pub from: &'a str,
    pub to: &'a str,
    pub subject: &'a str,
    pub plain: &'a str,
    pub html: &'a str,

    /// HTML marker -> file name under the assets directory.
    pub images: Option<&'a BTreeMap<String, String>>,

    /// Label -> file name under the assets directory.
    pub attachments: Option<&'a BTreeMap<String, String>>,
}

/// A message artifact written to the outbound directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub id: ArtifactId,
    pub path: PathBuf,
}

impl ComposedMessage {
    /// `<uuid>.msg`
    pub fn file_name(&self) -> String {
        self.id.file_name()
    }
}

pub struct MessageComposer {
    outbound_dir: PathBuf,
    assets_dir: PathBuf,
    ids: Arc<dyn IdGenerator>,
}

impl MessageComposer {
    pub fn new(
        outbound_dir: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            outbound_dir: outbound_dir.into(),
            assets_dir: assets_dir.into(),
            ids,
        }
    }

    /// Build the MIME message and write it as `<uuid>.msg`.
    ///
    /// The bytes go to a hidden temporary name first; only a complete artifact
    /// is ever visible under its final name.
    pub fn compose(&self, draft: &MessageDraft<'_>) -> Result<ComposedMessage, MailrunError> {
        let message = self.build(draft)?;
        let bytes = message.formatted();

        let id = self.ids.artifact_id();
        let path = self.outbound_dir.join(id.file_name());
        let partial = self.outbound_dir.join(format!(".{}.part", id.file_name()));

        fs::write(&partial, &bytes)?;
        if let Err(e) = fs::rename(&partial, &path) {
            let _ = fs::remove_file(&partial);
            return Err(e.into());
        }

        debug!(artifact = %id.file_name(), bytes = bytes.len(), "message composed");
        Ok(ComposedMessage { id, path })
    }

    fn build(&self, draft: &MessageDraft<'_>) -> Result<Message, MailrunError> {
        let from = parse_mailbox(draft.from)?;
        let to = parse_mailbox(draft.to)?;

        let domain = match from.email.domain() {
            "" => FALLBACK_CID_DOMAIN,
            d => d,
        };

        let mut html = draft.html.to_string();
        let mut inline = Vec::new();
        for (marker, file) in draft.images.into_iter().flatten() {
            let cid = self.ids.content_id(domain);
            html = html.replace(&format!("{{{marker}}}"), cid.as_str());
            let (bytes, content_type) = self.read_asset(file)?;
            inline.push(Attachment::new_inline(cid.to_string()).body(bytes, content_type));
        }

        let mut related = MultiPart::related().singlepart(SinglePart::html(html));
        for part in inline {
            related = related.singlepart(part);
        }
        for (label, file) in draft.attachments.into_iter().flatten() {
            let (bytes, content_type) = self.read_asset(file)?;
            let name = Path::new(file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| label.clone());
            related = related.singlepart(Attachment::new(name).body(bytes, content_type));
        }

        let body = MultiPart::alternative()
            .singlepart(SinglePart::plain(draft.plain.to_string()))
            .multipart(related);

        Message::builder()
            .from(from)
            .to(to)
            .subject(draft.subject)
            .multipart(body)
            .map_err(|e| MailrunError::Compose(e.to_string()))
    }

    fn read_asset(&self, file: &str) -> Result<(Vec<u8>, ContentType), MailrunError> {
        let path = self.assets_dir.join(file);
        let bytes = fs::read(&path)
            .map_err(|e| MailrunError::Compose(format!("{}: {e}", path.display())))?;
        let mime = mime_guess::from_path(&path).first_or_octet_stream();
        let content_type = ContentType::parse(mime.as_ref())
            .map_err(|e| MailrunError::Compose(format!("{}: {e}", path.display())))?;
        Ok((bytes, content_type))
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailrunError> {
    address
        .parse()
        .map_err(|e| MailrunError::Compose(format!("invalid address {address}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorKind;
    use crate::ports::{FixedClock, UuidUlidGenerator};

    struct Fixture {
        _root: tempfile::TempDir,
        out: PathBuf,
        composer: MessageComposer,
    }

    fn fixture() -> Fixture {
        let root = tempfile::tempdir().unwrap();
        let out = root.path().join("out");
        let files = root.path().join("files");
        fs::create_dir_all(&out).unwrap();
        fs::create_dir_all(files.join("images")).unwrap();
        fs::write(files.join("images/logo.png"), b"\x89PNG\r\n\x1a\nfake").unwrap();
        fs::write(files.join("price.pdf"), b"%PDF-1.4 fake").unwrap();

        let clock = FixedClock::on_date(2025, 1, 1).unwrap();
        let ids = Arc::new(UuidUlidGenerator::new(clock));
        let composer = MessageComposer::new(&out, &files, ids);
        Fixture {
            _root: root,
            out,
            composer,
        }
    }

    fn draft<'a>() -> MessageDraft<'a> {
        MessageDraft {
            from: "a@x.org",
            to: "b@y.org",
            subject: "Hi Bob",
            plain: "Hello Bob",
            html: "<p>Hello Bob</p>",
            images: None,
            attachments: None,
        }
    }

    fn artifacts(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn plain_and_html_are_alternatives() {
        let f = fixture();
        let composed = f.composer.compose(&draft()).unwrap();

        assert_eq!(artifacts(&f.out), vec![composed.file_name()]);
        assert!(composed.file_name().ends_with(".msg"));

        let text = fs::read_to_string(&composed.path).unwrap();
        assert!(text.contains("From: a@x.org"));
        assert!(text.contains("To: b@y.org"));
        assert!(text.contains("Subject: Hi Bob"));
        assert!(text.contains("multipart/alternative"));
        assert!(text.contains("multipart/related"));

        let plain_at = text.find("Hello Bob").unwrap();
        let html_at = text.find("<p>Hello Bob</p>").unwrap();
        assert!(plain_at < html_at);
    }

    #[test]
    fn images_are_inlined_with_generated_content_ids() {
        let f = fixture();
        let images: BTreeMap<_, _> =
            [("logo".to_string(), "images/logo.png".to_string())].into();
        let d = MessageDraft {
            html: r#"<img src="cid:{logo}">"#,
            images: Some(&images),
            ..draft()
        };

        let composed = f.composer.compose(&d).unwrap();
        let text = fs::read_to_string(&composed.path).unwrap();

        assert!(!text.contains("{logo}"));
        assert!(text.contains("@x.org"));
        assert!(text.contains("Content-ID: <"));
        assert!(text.contains("image/png"));
        assert!(text.contains("Content-Disposition: inline"));
    }

    #[test]
    fn attachments_keep_their_file_name() {
        let f = fixture();
        let attachments: BTreeMap<_, _> =
            [("Price list".to_string(), "price.pdf".to_string())].into();
        let d = MessageDraft {
            attachments: Some(&attachments),
            ..draft()
        };

        let composed = f.composer.compose(&d).unwrap();
        let text = fs::read_to_string(&composed.path).unwrap();
        assert!(text.contains("application/pdf"));
        assert!(text.contains("attachment; filename=\"price.pdf\""));
    }

    #[test]
    fn missing_asset_is_a_compose_error_and_writes_nothing() {
        let f = fixture();
        let images: BTreeMap<_, _> = [("logo".to_string(), "images/none.png".to_string())].into();
        let d = MessageDraft {
            images: Some(&images),
            ..draft()
        };

        let err = f.composer.compose(&d).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Compose);
        assert!(artifacts(&f.out).is_empty());
    }

    #[test]
    fn invalid_recipient_is_a_compose_error() {
        let f = fixture();
        let d = MessageDraft {
            to: "not an address",
            ..draft()
        };
        assert_eq!(f.composer.compose(&d).unwrap_err().kind(), ErrorKind::Compose);
    }

    #[test]
    fn each_message_gets_a_fresh_name() {
        let f = fixture();
        let a = f.composer.compose(&draft()).unwrap();
        let b = f.composer.compose(&draft()).unwrap();
        assert_ne!(a.file_name(), b.file_name());
        assert_eq!(artifacts(&f.out).len(), 2);
    }
}
