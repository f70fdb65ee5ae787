//! Errors - エラー型と分類
//!
//! `ErrorKind` は運用上の分類、`MailrunError` はその具体的な中身。
//! バッチ全体を止めるのは `Config` と状態遷移中の `Io` だけで、
//! それ以外はタスク単位・受信者単位で握りつぶさずにログへ出す。

use thiserror::Error;

/// ErrorKind は実行エラーの分類
///
/// - Config: 起動時の設定エラー（致命的）
/// - SourceRead: タスク/テンプレート/プロファイルが読めない（そのタスク・受信者をスキップ）
/// - DataMissing: プロファイルに受信者がいない（受信者をスキップ）
/// - Compose: メッセージを組み立てられない（受信者をスキップ）
/// - Transport: SMTP の失敗（成果物を bad/ へ）
/// - Io: 状態遷移（rename）の失敗（バッチを中断）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    SourceRead,
    DataMissing,
    Compose,
    Transport,
    Io,
}

#[derive(Debug, Error)]
pub enum MailrunError {
    #[error("config: {0}")]
    Config(String),

    #[error("cannot read {source_name}: {reason}")]
    SourceRead { source_name: String, reason: String },

    #[error("no profile data for recipient {0}")]
    MissingRecipientData(String),

    #[error("compose: {0}")]
    Compose(String),

    #[error("transport: {0}")]
    Transport(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl MailrunError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Config,
            Self::SourceRead { .. } => ErrorKind::SourceRead,
            Self::MissingRecipientData(_) => ErrorKind::DataMissing,
            Self::Compose(_) => ErrorKind::Compose,
            Self::Transport(_) => ErrorKind::Transport,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub fn source_read(source_name: impl Into<String>, reason: impl ToString) -> Self {
        Self::SourceRead {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of a keyed lookup against an external collaborator.
///
/// Callers must handle `NotFound` explicitly; there is no "empty" fallback.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("{name} is malformed: {reason}")]
    Malformed { name: String, reason: String },

    #[error("{name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl LookupError {
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound(name) => name,
            Self::Malformed { name, .. } | Self::Io { name, .. } => name,
        }
    }
}

impl From<LookupError> for MailrunError {
    fn from(err: LookupError) -> Self {
        MailrunError::source_read(err.name().to_string(), &err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_becomes_source_read() {
        let err: MailrunError = LookupError::NotFound("greet.txt".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::SourceRead);
        assert!(err.to_string().contains("greet.txt"));
    }

    #[test]
    fn io_error_is_classified_as_io() {
        let err: MailrunError = std::io::Error::other("disk gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
