//! SMTP transport backed by lettre.
//!
//! The `pool` feature of lettre is not enabled, so every `send_raw` opens a
//! fresh connection, authenticates, sends and quits.

use async_trait::async_trait;
use lettre::address::Envelope;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::debug;

use crate::config::{SmtpSettings, TlsMode};
use crate::domain::MailrunError;
use crate::ports::{MailTransport, TransportError};

pub struct SmtpMailTransport {
    inner: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn from_settings(settings: &SmtpSettings) -> Result<Self, MailrunError> {
        let host = settings.host.as_str();

        let tls = match settings.tls {
            TlsMode::None => Tls::None,
            TlsMode::StartTls => Tls::Required(Self::tls_parameters(host)?),
            TlsMode::Wrapper => Tls::Wrapper(Self::tls_parameters(host)?),
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(settings.port)
            .tls(tls)
            .timeout(Some(settings.timeout));

        if settings.has_credentials() {
            builder = builder.credentials(Credentials::new(
                settings.login.clone(),
                settings.password.clone(),
            ));
        }

        debug!(
            host,
            port = settings.port,
            tls = ?settings.tls,
            auth = settings.has_credentials(),
            "smtp transport configured"
        );

        Ok(Self {
            inner: builder.build(),
        })
    }

    fn tls_parameters(host: &str) -> Result<TlsParameters, MailrunError> {
        TlsParameters::builder(host.to_string())
            .build()
            .map_err(|e| MailrunError::Config(format!("TLS configuration error: {e}")))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send_raw(&self, envelope: &Envelope, message: &[u8]) -> Result<(), TransportError> {
        self.inner
            .send_raw(envelope, message)
            .await
            .map(|_| ())
            .map_err(|e| TransportError(e.to_string()))
    }
}
