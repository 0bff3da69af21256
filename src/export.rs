//! # 评估结果导出
//!
//! 导出集成评估结果到 CSV。
//!
//! ## 支持格式
//! - 汇总 CSV：每个结构一行（能量、方差、偏差、不确定度）
//! - 力 CSV：单个结构每个原子一行（总力、平均力、偏差力）
//!
//! ## 依赖关系
//! - 被 `commands/evaluate.rs` 调用
//! - 使用 `ensemble/result.rs` 的 EnsembleResult
//! - 使用 `csv` + `serde` 写入 CSV 文件

use crate::ensemble::EnsembleResult;
use crate::error::{EnsembleError, Result};
use crate::models::Configuration;

use serde::Serialize;
use std::path::Path;

/// 单个结构的汇总
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub structure: String,
    pub formula: String,
    pub n_atoms: usize,
    pub n_models: usize,
    pub energy: f64,
    pub mean_energy: f64,
    pub energy_variance: f64,
    pub energy_std: f64,
    pub energy_bias: f64,
    pub max_force_std: f64,
}

impl SummaryRow {
    pub fn new(config: &Configuration, result: &EnsembleResult) -> Self {
        SummaryRow {
            structure: config.name.clone(),
            formula: config.formula(),
            n_atoms: result.n_atoms,
            n_models: result.n_models(),
            energy: result.energy,
            mean_energy: result.mean_energy,
            energy_variance: result.energy_variance,
            energy_std: result.energy_std(),
            energy_bias: result.energy_bias,
            max_force_std: result.max_force_std(),
        }
    }
}

/// 导出汇总表
pub fn summary_to_csv(rows: &[SummaryRow], output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for row in rows {
        wtr.serialize(row)?;
    }

    wtr.flush().map_err(|e| EnsembleError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// 导出单个结构的逐原子力
pub fn forces_to_csv(
    config: &Configuration,
    result: &EnsembleResult,
    output_path: &Path,
) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    let dim = result.forces.dim();
    let axes = ["x", "y", "z"];
    let axis = |k: usize| axes.get(k).map(|s| s.to_string()).unwrap_or_else(|| k.to_string());

    let mut header = vec!["index".to_string(), "species".to_string()];
    for prefix in ["f", "mean_f", "bias_f"] {
        header.extend((0..dim).map(|k| format!("{}{}", prefix, axis(k))));
    }
    header.push("force_std".to_string());
    wtr.write_record(&header)?;

    let force_std = result.force_std();
    for (i, species) in config.species().iter().enumerate() {
        let mut record = vec![i.to_string(), species.clone()];
        for field in [&result.forces, &result.mean_forces, &result.bias_forces] {
            record.extend(field.row(i).iter().map(|x| format!("{:.8}", x)));
        }
        record.push(format!("{:.8}", force_std[i]));
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(|e| EnsembleError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
