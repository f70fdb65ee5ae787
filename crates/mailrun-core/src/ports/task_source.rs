//! TaskSource port - タスクファイルの列挙と読み込み
//!
//! キーはファイル識別子（作業ディレクトリ内のファイル名）。

use crate::domain::{LookupError, TaskRecord};

pub trait TaskSource: Send + Sync {
    /// Identifiers of the pending task files, in a stable order.
    fn list(&self) -> Result<Vec<String>, LookupError>;

    fn load(&self, id: &str) -> Result<TaskRecord, LookupError>;
}
