//! MailTransport port - SMTP 送信
//!
//! 1 メッセージにつき 1 接続。エンベロープは成果物のヘッダから作る。

use async_trait::async_trait;
use lettre::address::Envelope;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send an already serialized message.
    async fn send_raw(&self, envelope: &Envelope, message: &[u8]) -> Result<(), TransportError>;
}
