//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。库层错误 (`EnsembleError`) 在这里
//! 通过 `anyhow::Context` 附加上下文后交给 `main.rs` 打印。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/` 和 `ensemble_uq` 库
//! - 子模块: evaluate, demo

pub mod demo;
pub mod evaluate;

use crate::cli::Commands;

/// 执行命令
pub fn run(cmd: Commands) -> anyhow::Result<()> {
    match cmd {
        Commands::Evaluate(args) => evaluate::execute(args),
        Commands::Demo(args) => demo::execute(args),
    }
}
