//! Mail - MIME 成果物の生成と SMTP 配送
//!
//! - `compose`: 受信者 1 人分の `.msg` ファイルを out/ に書き出す
//! - `dispatch`: `.msg` ファイルを読み、自身の From/To ヘッダから envelope を作って送る

mod compose;
mod dispatch;

pub use compose::{ComposedMessage, MessageComposer, MessageDraft};
pub use dispatch::{MailDispatcher, envelope_from_headers};
