//! # 集成计算参数
//!
//! 偏差强度 r、均值权重 w_means 和是否并行调用成员模型。

use crate::error::{EnsembleError, Result};

use serde::{Deserialize, Serialize};

/// 默认偏差强度 r
pub const DEFAULT_BIAS_STRENGTH: f64 = 1.0;

/// 默认均值权重（只输出偏差项）
pub const DEFAULT_W_MEANS: f64 = 0.0;

/// 集成计算参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleSettings {
    /// 偏差强度 r：E_bias = r σ²_E / N
    pub bias_strength: f64,

    /// 平均能量/力混入输出的权重
    pub w_means: f64,

    /// 是否用 rayon 并行调用成员模型
    pub parallel: bool,
}

impl Default for EnsembleSettings {
    fn default() -> Self {
        EnsembleSettings {
            bias_strength: DEFAULT_BIAS_STRENGTH,
            w_means: DEFAULT_W_MEANS,
            parallel: false,
        }
    }
}

impl EnsembleSettings {
    pub fn with_bias_strength(mut self, bias_strength: f64) -> Self {
        self.bias_strength = bias_strength;
        self
    }

    pub fn with_w_means(mut self, w_means: f64) -> Self {
        self.w_means = w_means;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// 检查参数是否有限
    pub fn validate(&self) -> Result<()> {
        if !self.bias_strength.is_finite() {
            return Err(EnsembleError::Configuration(format!(
                "bias_strength must be finite, got {}",
                self.bias_strength
            )));
        }
        if !self.w_means.is_finite() {
            return Err(EnsembleError::Configuration(format!(
                "w_means must be finite, got {}",
                self.w_means
            )));
        }
        Ok(())
    }
}
