//! Mail dispatcher: one artifact, one connection, one outcome.

use std::path::Path;
use std::sync::Arc;

use lettre::Address;
use lettre::address::Envelope;
use tracing::debug;

use crate::domain::DeliveryOutcome;
use crate::ports::MailTransport;

pub struct MailDispatcher {
    transport: Arc<dyn MailTransport>,
}

impl MailDispatcher {
    pub fn new(transport: Arc<dyn MailTransport>) -> Self {
        Self { transport }
    }

    /// Send the artifact at `path`.
    ///
    /// Never fails: unreadable files, bad headers and SMTP errors all come
    /// back as `DeliveryOutcome::Failed`.
    pub async fn send(&self, path: &Path) -> DeliveryOutcome {
        let raw = match tokio::fs::read(path).await {
            Ok(raw) => raw,
            Err(e) => return DeliveryOutcome::failed(format!("{}: {e}", path.display())),
        };

        let envelope = match envelope_from_headers(&raw) {
            Ok(envelope) => envelope,
            Err(reason) => return DeliveryOutcome::failed(reason),
        };

        debug!(
            artifact = %path.display(),
            recipients = envelope.to().len(),
            "dispatching"
        );

        match self.transport.send_raw(&envelope, &raw).await {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(e) => DeliveryOutcome::failed(e.to_string()),
        }
    }
}

/// Build the SMTP envelope from the artifact's own `From` and `To` headers.
pub fn envelope_from_headers(raw: &[u8]) -> Result<Envelope, String> {
    let text = String::from_utf8_lossy(raw);
    let headers = unfolded_headers(&text);

    let from = header(&headers, "from").ok_or("missing From header")?;
    let to = header(&headers, "to").ok_or("missing To header")?;

    let from = addresses(from)
        .into_iter()
        .next()
        .ok_or_else(|| format!("no address in From: {from}"))?;
    let to = addresses(to);

    Envelope::new(Some(from), to).map_err(|e| e.to_string())
}

/// Header block with continuation lines joined.
fn unfolded_headers(text: &str) -> Vec<(String, String)> {
    let mut out: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        let line = line.trim_end_matches('\r');
        if line.is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = out.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            out.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }
    out
}

fn header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
}

/// Addresses of a mailbox list. `Name <addr>` yields `addr`; bare entries are
/// taken as-is. Entries that do not parse are dropped.
fn addresses(value: &str) -> Vec<Address> {
    let bracketed: Vec<&str> = value
        .split('<')
        .skip(1)
        .filter_map(|rest| rest.split_once('>').map(|(addr, _)| addr))
        .collect();

    let candidates: Vec<&str> = if bracketed.is_empty() {
        value.split(',').collect()
    } else {
        bracketed
    };

    candidates
        .into_iter()
        .filter_map(|a| a.trim().parse::<Address>().ok())
        .collect()
}
