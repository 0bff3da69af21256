//! # 原子构型数据模型
//!
//! 一次能量/力评估的输入：元素、笛卡尔坐标（Å）和可选的周期性晶胞。
//! 评估期间以只读引用传给每个成员模型。
//!
//! ## 依赖关系
//! - 被 `potentials/`, `ensemble/`, `parsers/` 使用
//! - 使用 `models/lattice.rs`

use crate::error::{EnsembleError, Result};
use crate::models::Lattice;

use serde::{Deserialize, Serialize};

/// 原子构型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    /// 构型名称
    pub name: String,

    /// 元素符号，与 positions 一一对应
    species: Vec<String>,

    /// 笛卡尔坐标 (Å)
    positions: Vec<[f64; 3]>,

    /// 周期性晶胞（孤立分子为 None）
    cell: Option<Lattice>,
}

impl Configuration {
    /// 创建孤立体系构型
    pub fn new(
        name: impl Into<String>,
        species: Vec<String>,
        positions: Vec<[f64; 3]>,
    ) -> Result<Self> {
        if species.len() != positions.len() {
            return Err(EnsembleError::InvalidArgument(format!(
                "{} species given for {} positions",
                species.len(),
                positions.len()
            )));
        }

        if positions.iter().flatten().any(|x| !x.is_finite()) {
            return Err(EnsembleError::InvalidArgument(
                "Atomic positions must be finite".to_string(),
            ));
        }

        Ok(Configuration {
            name: name.into(),
            species,
            positions,
            cell: None,
        })
    }

    /// 从化学式风格的元素列表快速构建，如 `["O", "H", "H"]`
    pub fn from_symbols(
        name: impl Into<String>,
        symbols: &[&str],
        positions: Vec<[f64; 3]>,
    ) -> Result<Self> {
        let species = symbols.iter().map(|s| s.to_string()).collect();
        Self::new(name, species, positions)
    }

    /// 设置周期性晶胞
    pub fn with_cell(mut self, cell: Lattice) -> Self {
        self.cell = Some(cell);
        self
    }

    /// 原子数 N
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn species(&self) -> &[String] {
        &self.species
    }

    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    pub fn cell(&self) -> Option<&Lattice> {
        self.cell.as_ref()
    }

    /// 原子 j 相对原子 i 的位移 r_j - r_i（有晶胞时取最小镜像）
    pub fn displacement(&self, i: usize, j: usize) -> [f64; 3] {
        let a = self.positions[i];
        let b = self.positions[j];
        let delta = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        match &self.cell {
            Some(cell) => cell.minimum_image(delta),
            None => delta,
        }
    }

    /// 几何中心
    pub fn centroid(&self) -> [f64; 3] {
        if self.positions.is_empty() {
            return [0.0; 3];
        }
        let n = self.positions.len() as f64;
        let mut c = [0.0; 3];
        for p in &self.positions {
            for k in 0..3 {
                c[k] += p[k];
            }
        }
        c.map(|x| x / n)
    }

    /// 计算化学式
    pub fn formula(&self) -> String {
        use std::collections::BTreeMap;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();

        for el in &self.species {
            *counts.entry(el.as_str()).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|(el, count)| {
                if count == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, count)
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}
