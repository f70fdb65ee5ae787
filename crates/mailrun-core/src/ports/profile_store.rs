//! ProfileStore port - 受信者ごとの置換データ
//!
//! 受信者がいない場合は `LookupError::NotFound` を返す（空の map で代用しない）。

use crate::domain::{LookupError, Substitutions};

pub trait ProfileStore: Send + Sync {
    fn lookup(&self, address: &str) -> Result<Substitutions, LookupError>;
}
