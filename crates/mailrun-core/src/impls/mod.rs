//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **fs**: 作業ディレクトリのタスク、テンプレートディレクトリ、JSON プロファイルストア
//! - **smtp**: lettre による SMTP 送信
//! - **memory**: 開発・テスト用のインメモリ実装

pub mod fs;
pub mod memory;
pub mod smtp;

pub use self::fs::{FsTaskSource, FsTemplateSource, JsonProfileStore};
pub use self::memory::{InMemoryProfileStore, InMemoryTemplateSource, RecordingTransport};
pub use self::smtp::SmtpMailTransport;
