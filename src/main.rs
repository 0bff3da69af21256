//! # ensemble-uq 命令行驱动
//!
//! ## 子命令
//! - `evaluate` - 用模型集成评估结构文件（单文件或批量目录）
//! - `demo`     - 内置 H₂O 演示
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   └── commands/   (命令执行逻辑)
//!         └── ensemble_uq (库：集成计算、解析器、导出)
//! ```

mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use ensemble_uq::utils::{logging, output};

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    if let Err(e) = commands::run(cli.command) {
        output::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}
