//! # 集成不确定度模块
//!
//! 聚合多个原子间势的能量/力预测，用模型间分歧构造偏差修正。
//!
//! ## 子模块
//! - `collector`: 调用成员模型并收集预测
//! - `aggregator`: 均值、方差、偏差能量与偏差力
//! - `calculator`: 对外入口（构造 / 评估 / 诊断）
//! - `result`: 评估结果与诊断映射
//! - `settings`: 偏差强度与均值权重
//!
//! ## 依赖关系
//! - 被 `commands/` 和库用户使用
//! - 使用 `models/`, `potentials/`

pub mod aggregator;
pub mod calculator;
pub mod collector;
pub mod result;
pub mod settings;

pub use calculator::{Ensemble, EnsembleCalculator};
pub use collector::{collect_predictions, PredictionSet};
pub use result::{DiagnosticValue, Diagnostics, EnsembleResult};
pub use settings::EnsembleSettings;
