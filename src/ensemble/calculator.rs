//! # 集成计算器
//!
//! 对外的唯一入口：构造、评估、读取诊断信息。
//!
//! ## 组成
//! - `Ensemble`: 成员模型 + 参数，无状态，`compute` 可在多个线程间共享调用
//! - `EnsembleCalculator`: 在 `Ensemble` 之上加一个单槽缓存，保存最近一次结果
//!
//! 缓存只通过 `&mut self` 写入，同一实例上不存在并发写。评估失败时缓存保持不变。
//!
//! ## 依赖关系
//! - 被 `commands/` 和库用户调用
//! - 使用 `ensemble/collector.rs`, `ensemble/aggregator.rs`

use crate::ensemble::aggregator;
use crate::ensemble::collector::collect_predictions;
use crate::ensemble::result::{Diagnostics, EnsembleResult};
use crate::ensemble::settings::EnsembleSettings;
use crate::error::{EnsembleError, Result};
use crate::models::Configuration;
use crate::potentials::Potential;

/// 成员模型集合及其参数
pub struct Ensemble {
    models: Vec<Box<dyn Potential>>,
    settings: EnsembleSettings,
}

impl Ensemble {
    /// 创建集成，模型列表不能为空
    pub fn new(models: Vec<Box<dyn Potential>>, settings: EnsembleSettings) -> Result<Self> {
        if models.is_empty() {
            return Err(EnsembleError::Configuration(
                "An ensemble needs at least one model".to_string(),
            ));
        }
        settings.validate()?;

        Ok(Ensemble { models, settings })
    }

    /// 模型数 M
    pub fn n_models(&self) -> usize {
        self.models.len()
    }

    pub fn settings(&self) -> &EnsembleSettings {
        &self.settings
    }

    /// 各成员模型名称
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|m| m.name()).collect()
    }

    /// 评估一个构型（不写缓存）
    pub fn compute(&self, config: &Configuration) -> Result<EnsembleResult> {
        log::debug!(
            "evaluating '{}' ({} atoms) with {} models",
            config.name,
            config.len(),
            self.models.len()
        );

        let predictions = collect_predictions(&self.models, config, self.settings.parallel)?;

        aggregator::aggregate(
            &predictions,
            config.len(),
            self.settings.bias_strength,
            self.settings.w_means,
        )
    }
}

/// 带最近结果缓存的集成计算器
pub struct EnsembleCalculator {
    ensemble: Ensemble,
    last: Option<EnsembleResult>,
}

impl EnsembleCalculator {
    /// 使用默认参数 (r = 1.0, w_means = 0.0) 构造
    pub fn new(models: Vec<Box<dyn Potential>>) -> Result<Self> {
        Self::with_settings(models, EnsembleSettings::default())
    }

    pub fn with_settings(
        models: Vec<Box<dyn Potential>>,
        settings: EnsembleSettings,
    ) -> Result<Self> {
        Ok(Self::from_ensemble(Ensemble::new(models, settings)?))
    }

    pub fn from_ensemble(ensemble: Ensemble) -> Self {
        EnsembleCalculator {
            ensemble,
            last: None,
        }
    }

    pub fn ensemble(&self) -> &Ensemble {
        &self.ensemble
    }

    /// 评估构型并覆盖缓存
    pub fn evaluate(&mut self, config: &Configuration) -> Result<&EnsembleResult> {
        let result = self.ensemble.compute(config)?;
        Ok(self.last.insert(result))
    }

    /// 最近一次成功评估的结果
    pub fn last_result(&self) -> Option<&EnsembleResult> {
        self.last.as_ref()
    }

    /// 最近一次结果的诊断快照；尚未评估时为空
    pub fn diagnostics(&self) -> Diagnostics {
        self.last
            .as_ref()
            .map(EnsembleResult::diagnostics)
            .unwrap_or_default()
    }
}
