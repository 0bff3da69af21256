//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `evaluate`: 用模型集成评估结构文件（单文件或目录批量）
//! - `demo`: 内置 H₂O + 五个偏移势的演示
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: evaluate, demo

pub mod demo;
pub mod evaluate;

use clap::{Args, Parser, Subcommand};

/// ensemble-uq - 原子间势集成不确定度工具
#[derive(Parser)]
#[command(name = "ensemble-uq")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Ensemble uncertainty quantification for interatomic potentials",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate structure files with an ensemble of potentials
    Evaluate(evaluate::EvaluateArgs),

    /// Run the built-in H2O demonstration ensemble
    Demo(demo::DemoArgs),
}

/// 集成参数（evaluate 与 demo 共用）
#[derive(Args, Debug, Clone, Copy)]
pub struct EnsembleOptions {
    /// Bias strength r in E_bias = r * var(E) / N
    #[arg(long, default_value_t = 1.0, env = "ENSEMBLE_BIAS_STRENGTH")]
    pub bias_strength: f64,

    /// Weight of the mean energy/forces blended into the output
    #[arg(long, default_value_t = 0.0, env = "ENSEMBLE_W_MEANS")]
    pub w_means: f64,

    /// Invoke member models in parallel
    #[arg(long, default_value_t = false)]
    pub parallel: bool,
}

impl EnsembleOptions {
    pub fn settings(&self) -> ensemble_uq::EnsembleSettings {
        ensemble_uq::EnsembleSettings::default()
            .with_bias_strength(self.bias_strength)
            .with_w_means(self.w_means)
            .with_parallel(self.parallel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_evaluate() {
        let cli = Cli::try_parse_from([
            "ensemble-uq",
            "evaluate",
            "water.xyz",
            "--model",
            "offset:energy=0.1",
            "--model",
            "offset:energy=-0.1",
            "--bias-strength",
            "2.0",
        ])
        .unwrap();

        match cli.command {
            Commands::Evaluate(args) => {
                assert_eq!(args.models.len(), 2);
                assert_eq!(args.ensemble.bias_strength, 2.0);
                assert_eq!(args.ensemble.settings().w_means, 0.0);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn test_evaluate_requires_model() {
        assert!(Cli::try_parse_from(["ensemble-uq", "evaluate", "water.xyz"]).is_err());
    }
}
