//! # demo 子命令 CLI 定义
//!
//! 内置演示：H₂O 分子 + 五个常数偏移势。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/demo.rs`

use super::EnsembleOptions;
use clap::Args;

/// demo 子命令参数
#[derive(Args, Debug)]
pub struct DemoArgs {
    #[command(flatten)]
    pub ensemble: EnsembleOptions,
}
