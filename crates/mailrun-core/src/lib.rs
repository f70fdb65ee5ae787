//! mailrun-core
//!
//! Building blocks for the batch mail dispatcher.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（task, outcome, state, ids, errors）
//! - **ports**: 抽象化レイヤー（TaskSource, TemplateSource, ProfileStore, MailTransport, Clock, IdGenerator）
//! - **impls**: ports の実装（ファイルシステム, SMTP）
//! - **template**: `[placeholder]` 置換エンジン
//! - **queue**: 正規化・受信者展開・タスクキュー
//! - **mail**: MIME メッセージ生成と配送
//! - **spool**: ディレクトリ構成とファイル状態遷移
//! - **app**: パイプライン（builder, pipeline, status）
//! - **config**: 実行時設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod mail;
pub mod ports;
pub mod queue;
pub mod spool;
pub mod template;

pub use app::{Pipeline, PipelineBuilder, RunSummary};
pub use domain::{ErrorKind, MailrunError};
