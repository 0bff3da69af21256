//! # 常数偏移势
//!
//! 能量 = N × 1.0 + energy_offset，所有力分量 = force_offset。
//! 没有物理意义，用于构造已知离散度的集成以测试聚合逻辑。

use crate::error::Result;
use crate::models::{Configuration, ForceField};
use crate::potentials::Potential;

/// 每原子参考能量 (eV)
const ENERGY_PER_ATOM: f64 = 1.0;

/// 常数偏移势
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetPotential {
    pub energy_offset: f64,
    pub force_offset: f64,
}

impl OffsetPotential {
    pub fn new(energy_offset: f64, force_offset: f64) -> Self {
        Self {
            energy_offset,
            force_offset,
        }
    }
}

impl Potential for OffsetPotential {
    fn name(&self) -> String {
        format!("offset(e={}, f={})", self.energy_offset, self.force_offset)
    }

    fn predict_energy(&self, config: &Configuration) -> Result<f64> {
        Ok(config.len() as f64 * ENERGY_PER_ATOM + self.energy_offset)
    }

    fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
        Ok(ForceField::filled(config.len(), 3, self.force_offset))
    }
}
