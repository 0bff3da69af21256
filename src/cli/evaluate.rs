//! # evaluate 子命令 CLI 定义
//!
//! 用一组成员模型评估结构文件（单文件或目录）。
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/evaluate.rs`

use super::EnsembleOptions;
use clap::Args;
use ensemble_uq::potentials::ModelSpec;
use std::path::PathBuf;

/// evaluate 子命令参数
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Structure file (POSCAR/CONTCAR, .vasp, .xyz) or directory of structures
    pub input: PathBuf,

    /// Ensemble member, e.g. 'lj:epsilon=0.0104,sigma=3.4' (repeat for each model)
    #[arg(short, long = "model", required = true)]
    pub models: Vec<ModelSpec>,

    #[command(flatten)]
    pub ensemble: EnsembleOptions,

    /// Glob pattern(s) for input files, comma separated
    #[arg(short, long, default_value = "*.xyz,*.extxyz,*.vasp,POSCAR*,CONTCAR*")]
    pub pattern: String,

    /// Recurse into subdirectories
    #[arg(short, long, default_value_t = false)]
    pub recursive: bool,

    /// Number of parallel jobs over structures (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Write a per-structure summary CSV
    #[arg(long)]
    pub output_csv: Option<PathBuf>,

    /// Write per-atom forces CSV (single structure input only)
    #[arg(long)]
    pub forces_csv: Option<PathBuf>,

    /// Print per-atom force table (single structure input only)
    #[arg(long, default_value_t = false)]
    pub show_forces: bool,
}
