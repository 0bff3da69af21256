//! # 势函数模块
//!
//! 定义集成成员模型必须满足的 `Potential` 接口，以及几个参考实现。
//! 集成核心只依赖这个 trait，不关心模型内部如何计算。
//!
//! ## 子模块
//! - `offset`: 常数偏移势（测试/演示用）
//! - `lennard_jones`: Lennard-Jones 对势
//! - `harmonic`: 谐振子势阱
//! - `spec`: 命令行模型描述字符串解析
//!
//! ## 依赖关系
//! - 被 `ensemble/` 和 `commands/` 使用
//! - 使用 `models/`

pub mod harmonic;
pub mod lennard_jones;
pub mod offset;
pub mod spec;

pub use harmonic::HarmonicWell;
pub use lennard_jones::LennardJones;
pub use offset::OffsetPotential;
pub use spec::ModelSpec;

use crate::error::Result;
use crate::models::{Configuration, ForceField};

/// 原子间势模型
///
/// `Send + Sync` 使收集器可以并行调用各成员模型。
pub trait Potential: Send + Sync {
    /// 模型名称，用于错误信息和诊断输出
    fn name(&self) -> String;

    /// 预测构型的总能量 (eV)
    fn predict_energy(&self, config: &Configuration) -> Result<f64>;

    /// 预测每个原子受力 (eV/Å)，形状必须为 N×D
    fn predict_forces(&self, config: &Configuration) -> Result<ForceField>;
}

impl<P: Potential + ?Sized> Potential for Box<P> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn predict_energy(&self, config: &Configuration) -> Result<f64> {
        (**self).predict_energy(config)
    }

    fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
        (**self).predict_forces(config)
    }
}

impl<P: Potential + ?Sized> Potential for std::sync::Arc<P> {
    fn name(&self) -> String {
        (**self).name()
    }

    fn predict_energy(&self, config: &Configuration) -> Result<f64> {
        (**self).predict_energy(config)
    }

    fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
        (**self).predict_forces(config)
    }
}
