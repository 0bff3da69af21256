//! # 谐振子势阱
//!
//! E = ½ k Σ |rᵢ − r₀ᵢ|²，F = −k (rᵢ − r₀ᵢ)。
//! 未给定参考位置时，所有原子被拉向构型的几何中心。

use crate::error::{EnsembleError, Result};
use crate::models::{Configuration, ForceField};
use crate::potentials::Potential;

/// 谐振子势阱
#[derive(Debug, Clone, PartialEq)]
pub struct HarmonicWell {
    /// 弹簧常数 k (eV/Å²)
    pub spring_constant: f64,
    /// 参考位置（None 表示几何中心）
    pub reference: Option<Vec<[f64; 3]>>,
}

impl HarmonicWell {
    pub fn new(spring_constant: f64) -> Self {
        Self {
            spring_constant,
            reference: None,
        }
    }

    pub fn with_reference(mut self, reference: Vec<[f64; 3]>) -> Self {
        self.reference = Some(reference);
        self
    }

    /// 每个原子的偏离向量 rᵢ − r₀ᵢ
    fn offsets(&self, config: &Configuration) -> Result<Vec<[f64; 3]>> {
        let anchors: Vec<[f64; 3]> = match &self.reference {
            Some(reference) => {
                if reference.len() != config.len() {
                    return Err(EnsembleError::ModelFailure(format!(
                        "Reference has {} positions, configuration has {} atoms",
                        reference.len(),
                        config.len()
                    )));
                }
                reference.clone()
            }
            None => vec![config.centroid(); config.len()],
        };

        Ok(config
            .positions()
            .iter()
            .zip(anchors.iter())
            .map(|(p, a)| [p[0] - a[0], p[1] - a[1], p[2] - a[2]])
            .collect())
    }
}

impl Potential for HarmonicWell {
    fn name(&self) -> String {
        format!("harmonic(k={})", self.spring_constant)
    }

    fn predict_energy(&self, config: &Configuration) -> Result<f64> {
        let sum_sq: f64 = self
            .offsets(config)?
            .iter()
            .map(|d| d[0] * d[0] + d[1] * d[1] + d[2] * d[2])
            .sum();
        Ok(0.5 * self.spring_constant * sum_sq)
    }

    fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
        let k = self.spring_constant;
        let rows: Vec<[f64; 3]> = self
            .offsets(config)?
            .iter()
            .map(|d| [-k * d[0], -k * d[1], -k * d[2]])
            .collect();
        Ok(ForceField::from_vectors(&rows))
    }
}
