//! Runtime settings handed to the core by the CLI.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TlsMode {
    /// Plaintext connection.
    None,

    /// Plaintext connection upgraded with STARTTLS.
    StartTls,

    /// TLS from the first byte (SMTPS).
    Wrapper,
}

impl TlsMode {
    /// Implicit TLS wins when both flags are set; STARTTLS on an already
    /// encrypted connection is meaningless.
    pub fn from_flags(ssl: bool, starttls: bool) -> Self {
        match (ssl, starttls) {
            (true, _) => TlsMode::Wrapper,
            (false, true) => TlsMode::StartTls,
            (false, false) => TlsMode::None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,

    /// Empty login disables AUTH.
    pub login: String,

    #[serde(skip_serializing)]
    pub password: String,

    pub tls: TlsMode,

    /// Connect/read timeout applied to every dispatch.
    pub timeout: Duration,
}

impl SmtpSettings {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    pub fn has_credentials(&self) -> bool {
        !self.login.is_empty()
    }
}

/// Root directories; sub-areas are derived by `spool::SpoolLayout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Directories {
    pub tasks: PathBuf,
    pub templates: PathBuf,
    pub mail: PathBuf,
    pub logs: PathBuf,

    /// Recipient profile store (JSON).
    pub profiles: PathBuf,
}

/// Substitution keys whose values identify a recipient in delivery logs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLabels {
    pub company_key: String,
    pub project_key: String,
}

impl LogLabels {
    pub const DEFAULT_COMPANY_KEY: &'static str = "Название компании";
    pub const DEFAULT_PROJECT_KEY: &'static str = "Проект";
}

impl Default for LogLabels {
    fn default() -> Self {
        Self {
            company_key: Self::DEFAULT_COMPANY_KEY.to_string(),
            project_key: Self::DEFAULT_PROJECT_KEY.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::ssl_only(true, false, TlsMode::Wrapper)]
    #[case::ssl_wins(true, true, TlsMode::Wrapper)]
    #[case::starttls(false, true, TlsMode::StartTls)]
    #[case::plaintext(false, false, TlsMode::None)]
    fn tls_mode_from_flags(#[case] ssl: bool, #[case] starttls: bool, #[case] expected: TlsMode) {
        assert_eq!(TlsMode::from_flags(ssl, starttls), expected);
    }

    #[test]
    fn password_is_not_serialized() {
        let settings = SmtpSettings {
            host: "smtp.example.org".to_string(),
            port: 465,
            login: "user".to_string(),
            password: "secret".to_string(),
            tls: TlsMode::Wrapper,
            timeout: SmtpSettings::DEFAULT_TIMEOUT,
        };
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("smtp.example.org"));
    }
}
