//! # 集成评估结果与诊断信息
//!
//! `EnsembleResult` 是一次评估的完整输出；`Diagnostics` 是其只读快照，
//! 以键值映射的形式提供给模拟驱动程序。

use crate::models::ForceField;

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// 一次集成评估的结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnsembleResult {
    /// 输出总能量 w_means·Ē − E_bias (eV)
    pub energy: f64,
    /// 输出总力 w_means·F̄ + F_bias (eV/Å)
    pub forces: ForceField,

    /// 平均能量 Ē
    pub mean_energy: f64,
    /// 平均力 F̄
    pub mean_forces: ForceField,
    /// 能量总体方差 σ²_E
    pub energy_variance: f64,
    /// 能量偏差 r σ²_E / N
    pub energy_bias: f64,
    /// 偏差力
    pub bias_forces: ForceField,

    /// 各模型能量（按模型索引）
    pub individual_energies: Vec<f64>,
    /// 各模型力场（按模型索引）
    pub individual_forces: Vec<ForceField>,

    /// 原子数 N
    pub n_atoms: usize,
    /// 使用的偏差强度 r
    pub bias_strength: f64,
    /// 使用的均值权重
    pub w_means: f64,
}

impl EnsembleResult {
    /// 模型数 M
    pub fn n_models(&self) -> usize {
        self.individual_energies.len()
    }

    /// 能量标准差 σ_E
    pub fn energy_std(&self) -> f64 {
        self.energy_variance.sqrt()
    }

    /// 每个原子的力不确定度：sqrt(mean_i |Fᵢ − F̄|²)
    pub fn force_std(&self) -> Vec<f64> {
        let m = self.n_models() as f64;
        let dim = self.mean_forces.dim();
        let mut acc = vec![0.0; self.n_atoms];

        for forces in &self.individual_forces {
            for (k, (f, mean)) in forces
                .values()
                .iter()
                .zip(self.mean_forces.values().iter())
                .enumerate()
            {
                acc[k / dim] += (f - mean) * (f - mean);
            }
        }

        acc.into_iter().map(|s| (s / m).sqrt()).collect()
    }

    /// 最大原子力不确定度
    pub fn max_force_std(&self) -> f64 {
        self.force_std().into_iter().fold(0.0, f64::max)
    }

    /// 生成诊断快照
    pub fn diagnostics(&self) -> Diagnostics {
        let mut map = Diagnostics::new();
        map.insert("mean_energy", DiagnosticValue::Scalar(self.mean_energy));
        map.insert("energy_bias", DiagnosticValue::Scalar(self.energy_bias));
        map.insert(
            "energy_variance",
            DiagnosticValue::Scalar(self.energy_variance),
        );
        map.insert("total_energy", DiagnosticValue::Scalar(self.energy));
        map.insert("n_potentials", DiagnosticValue::Count(self.n_models()));
        map.insert("bias_strength", DiagnosticValue::Scalar(self.bias_strength));
        map.insert(
            "individual_energies",
            DiagnosticValue::Energies(self.individual_energies.clone()),
        );
        map.insert(
            "individual_forces",
            DiagnosticValue::Forces(self.individual_forces.clone()),
        );
        map
    }
}

/// 诊断映射，键按字母序
pub type Diagnostics = BTreeMap<&'static str, DiagnosticValue>;

/// 诊断值
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DiagnosticValue {
    Scalar(f64),
    Count(usize),
    Energies(Vec<f64>),
    Forces(Vec<ForceField>),
}

impl DiagnosticValue {
    pub fn as_scalar(&self) -> Option<f64> {
        match self {
            DiagnosticValue::Scalar(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<usize> {
        match self {
            DiagnosticValue::Count(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for DiagnosticValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticValue::Scalar(x) => write!(f, "{:.6}", x),
            DiagnosticValue::Count(n) => write!(f, "{}", n),
            DiagnosticValue::Energies(es) => {
                let items: Vec<String> = es.iter().map(|e| format!("{:.6}", e)).collect();
                write!(f, "[{}]", items.join(", "))
            }
            DiagnosticValue::Forces(fs) => {
                let (n, d) = fs.first().map(|x| x.shape()).unwrap_or((0, 0));
                write!(f, "{} force fields of shape {}x{}", fs.len(), n, d)
            }
        }
    }
}
