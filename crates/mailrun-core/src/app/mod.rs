//! App - アプリケーション層
//!
//! ports・queue・mail・spool を組み合わせてバッチを 1 回実行する。
//!
//! # 主要コンポーネント
//! - **PipelineBuilder**: 依存のワイヤリングと起動時検証
//! - **Pipeline**: reactivate → load → pop → compose → dispatch → settle → complete
//! - **RunSummary**: 実行結果の集計

pub mod builder;
pub mod pipeline;
pub mod status;

pub use self::builder::{BuildError, PipelineBuilder};
pub use self::pipeline::Pipeline;
pub use self::status::RunSummary;
