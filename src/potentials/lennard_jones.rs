//! # Lennard-Jones 对势
//!
//! V(r) = 4ε [(σ/r)¹² − (σ/r)⁶]，截断半径外为零（不做能量平移）。
//! 有晶胞时使用最小镜像约定，因此截断半径应小于晶胞最短高的一半。
//!
//! ## 依赖关系
//! - 被 `potentials/spec.rs` 构造
//! - 使用 `models/configuration.rs` 的位移计算

use crate::error::{EnsembleError, Result};
use crate::models::{Configuration, ForceField};
use crate::potentials::Potential;

/// Lennard-Jones 对势
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LennardJones {
    /// 势阱深度 ε (eV)
    pub epsilon: f64,
    /// 零势能距离 σ (Å)
    pub sigma: f64,
    /// 截断半径 (Å)
    pub cutoff: f64,
}

impl Default for LennardJones {
    /// 氩的常用参数
    fn default() -> Self {
        LennardJones {
            epsilon: 0.0104,
            sigma: 3.40,
            cutoff: 8.5,
        }
    }
}

impl LennardJones {
    pub fn new(epsilon: f64, sigma: f64, cutoff: f64) -> Result<Self> {
        if !(sigma > 0.0 && cutoff > 0.0 && epsilon.is_finite()) {
            return Err(EnsembleError::InvalidArgument(format!(
                "Invalid Lennard-Jones parameters: epsilon={}, sigma={}, cutoff={}",
                epsilon, sigma, cutoff
            )));
        }
        Ok(LennardJones {
            epsilon,
            sigma,
            cutoff,
        })
    }

    /// 对势能量和 dV/dr / r
    fn pair_terms(&self, r2: f64) -> (f64, f64) {
        let s2 = self.sigma * self.sigma / r2;
        let s6 = s2 * s2 * s2;
        let s12 = s6 * s6;
        let energy = 4.0 * self.epsilon * (s12 - s6);
        // dV/dr = -24ε (2 s12 - s6) / r
        let de_dr_over_r = -24.0 * self.epsilon * (2.0 * s12 - s6) / r2;
        (energy, de_dr_over_r)
    }

    /// 遍历截断半径内的原子对
    fn for_each_pair<F>(&self, config: &Configuration, mut visit: F) -> Result<()>
    where
        F: FnMut(usize, usize, [f64; 3], f64),
    {
        let cutoff2 = self.cutoff * self.cutoff;
        let n = config.len();

        for i in 0..n {
            for j in (i + 1)..n {
                let d = config.displacement(i, j);
                let r2 = d[0] * d[0] + d[1] * d[1] + d[2] * d[2];
                if r2 > cutoff2 {
                    continue;
                }
                if r2 < 1e-12 {
                    return Err(EnsembleError::ModelFailure(format!(
                        "Atoms {} and {} overlap",
                        i, j
                    )));
                }
                visit(i, j, d, r2);
            }
        }

        Ok(())
    }
}

impl Potential for LennardJones {
    fn name(&self) -> String {
        format!("lj(eps={}, sigma={})", self.epsilon, self.sigma)
    }

    fn predict_energy(&self, config: &Configuration) -> Result<f64> {
        let mut energy = 0.0;
        self.for_each_pair(config, |_, _, _, r2| {
            energy += self.pair_terms(r2).0;
        })?;
        Ok(energy)
    }

    fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
        let mut forces = ForceField::zeros(config.len(), 3);
        let values = forces.values_mut();

        self.for_each_pair(config, |i, j, d, r2| {
            let (_, de_dr_over_r) = self.pair_terms(r2);
            // d = r_j - r_i；F_j = -dV/dr · d/r，F_i = -F_j
            for k in 0..3 {
                let f = -de_dr_over_r * d[k];
                values[j * 3 + k] += f;
                values[i * 3 + k] -= f;
            }
        })?;

        Ok(forces)
    }
}
