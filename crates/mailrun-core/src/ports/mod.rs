//! Ports - 抽象化レイヤー
//!
//! パイプラインが外部に依存する箇所はすべてここの trait を通す。
//!
//! # 外部コラボレーター
//! - TaskSource: タスクファイルの列挙と読み込み
//! - TemplateSource: テンプレート本文の取得
//! - ProfileStore: 受信者ごとの置換データ
//! - MailTransport: SMTP 送信
//!
//! # テスト容易性
//! - Clock / IdGenerator を差し替えて日付・ID を固定できる

pub mod clock;
pub mod id_generator;
pub mod profile_store;
pub mod task_source;
pub mod template_source;
pub mod transport;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::id_generator::{IdGenerator, UuidUlidGenerator};
pub use self::profile_store::ProfileStore;
pub use self::task_source::TaskSource;
pub use self::template_source::TemplateSource;
pub use self::transport::{MailTransport, TransportError};
