//! # 力场数组
//!
//! 行主序的 N×D 稠密数组，N 为原子数，D 为每个原子力向量的维数（通常为 3）。
//! 集成聚合中的均值、偏差力都在这个类型上逐元素完成。
//!
//! ## 依赖关系
//! - 被 `potentials/`, `ensemble/`, `export.rs` 使用
//! - 无外部模块依赖

use crate::error::{EnsembleError, Result};

use serde::{Deserialize, Serialize};

/// N×D 力场
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForceField {
    n_atoms: usize,
    dim: usize,
    values: Vec<f64>,
}

impl ForceField {
    /// 全零力场
    pub fn zeros(n_atoms: usize, dim: usize) -> Self {
        ForceField {
            n_atoms,
            dim,
            values: vec![0.0; n_atoms * dim],
        }
    }

    /// 所有分量取同一值
    pub fn filled(n_atoms: usize, dim: usize, value: f64) -> Self {
        ForceField {
            n_atoms,
            dim,
            values: vec![value; n_atoms * dim],
        }
    }

    /// 从三维力向量列表创建
    pub fn from_vectors(rows: &[[f64; 3]]) -> Self {
        ForceField {
            n_atoms: rows.len(),
            dim: 3,
            values: rows.iter().flatten().copied().collect(),
        }
    }

    /// 从任意维数的行创建，所有行长度必须一致
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let dim = rows.first().map(|r| r.len()).unwrap_or(0);
        if let Some(i) = rows.iter().position(|r| r.len() != dim) {
            return Err(EnsembleError::InvalidArgument(format!(
                "Force row {} has {} components, expected {}",
                i,
                rows[i].len(),
                dim
            )));
        }

        Ok(ForceField {
            n_atoms: rows.len(),
            dim,
            values: rows.iter().flatten().copied().collect(),
        })
    }

    /// 形状 (N, D)
    pub fn shape(&self) -> (usize, usize) {
        (self.n_atoms, self.dim)
    }

    pub fn n_atoms(&self) -> usize {
        self.n_atoms
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// 展平的分量
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// 第 i 个原子的力向量
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    /// 按原子遍历
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // D = 0 时 values 为空，max(1) 只为避开 chunks(0) 的 panic
        self.values.chunks(self.dim.max(1))
    }

    /// 所有分量是否有限
    pub fn is_finite(&self) -> bool {
        self.values.iter().all(|x| x.is_finite())
    }

    /// 返回 factor * self
    pub fn scaled(&self, factor: f64) -> Self {
        ForceField {
            n_atoms: self.n_atoms,
            dim: self.dim,
            values: self.values.iter().map(|x| x * factor).collect(),
        }
    }

    /// self += factor * other（调用方保证形状一致）
    pub fn add_scaled(&mut self, other: &ForceField, factor: f64) {
        debug_assert_eq!(self.shape(), other.shape());
        for (a, b) in self.values.iter_mut().zip(other.values.iter()) {
            *a += factor * b;
        }
    }

    /// 每个原子力向量的模长
    pub fn norms(&self) -> Vec<f64> {
        self.rows()
            .map(|r| r.iter().map(|x| x * x).sum::<f64>().sqrt())
            .collect()
    }

    /// 最大原子力模长
    pub fn max_norm(&self) -> f64 {
        self.norms().into_iter().fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vectors_shape() {
        let f = ForceField::from_vectors(&[[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        assert_eq!(f.shape(), (2, 3));
        assert_eq!(f.row(1), &[4.0, 5.0, 6.0]);
        assert_eq!(f.rows().count(), 2);
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows = vec![vec![1.0, 2.0], vec![3.0]];
        assert!(ForceField::from_rows(&rows).is_err());
    }

    #[test]
    fn test_add_scaled_and_norms() {
        let mut a = ForceField::zeros(1, 3);
        let b = ForceField::from_vectors(&[[3.0, 4.0, 0.0]]);
        a.add_scaled(&b, 2.0);
        assert_eq!(a.values(), &[6.0, 8.0, 0.0]);
        assert!((a.max_norm() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_is_finite() {
        let mut f = ForceField::zeros(2, 3);
        assert!(f.is_finite());
        f.values_mut()[4] = f64::INFINITY;
        assert!(!f.is_finite());
    }
}
