//! # ensemble-uq - 原子间势集成不确定度
//!
//! 把多个独立原子间势模型的能量/力预测聚合为一个共识估计，
//! 并用模型间能量方差构造偏差修正：
//!
//! - E = w_means·Ē − r σ²_E / N
//! - F = w_means·F̄ − r Σᵢ (Eᵢ − Ē)(Fᵢ − F̄)
//!
//! ## 用法
//! ```no_run
//! use ensemble_uq::{Configuration, EnsembleCalculator, OffsetPotential, Potential};
//!
//! let models: Vec<Box<dyn Potential>> = vec![
//!     Box::new(OffsetPotential::new(0.0, 0.0)),
//!     Box::new(OffsetPotential::new(0.1, 0.1)),
//! ];
//! let mut calc = EnsembleCalculator::new(models)?;
//! let h2 = Configuration::from_symbols("H2", &["H", "H"], vec![[0.0; 3], [0.7, 0.0, 0.0]])?;
//! let result = calc.evaluate(&h2)?;
//! println!("E = {} eV", result.energy);
//! # Ok::<(), ensemble_uq::EnsembleError>(())
//! ```
//!
//! ## 依赖关系
//! ```text
//! lib.rs
//!   ├── ensemble/   (收集器、聚合器、计算器)
//!   │     ├── potentials/ (成员模型接口)
//!   │     └── models/     (构型、力场)
//!   ├── parsers/    (POSCAR / XYZ)
//!   ├── batch/      (批量文件评估)
//!   ├── export.rs   (CSV 导出)
//!   ├── utils/      (输出、进度条、日志)
//!   └── error.rs    (错误处理)
//! ```

pub mod batch;
pub mod ensemble;
pub mod error;
pub mod export;
pub mod models;
pub mod parsers;
pub mod potentials;
pub mod utils;

pub use ensemble::{
    Diagnostics, DiagnosticValue, Ensemble, EnsembleCalculator, EnsembleResult, EnsembleSettings,
};
pub use error::{EnsembleError, Result};
pub use models::{Configuration, ForceField, Lattice};
pub use potentials::{HarmonicWell, LennardJones, ModelSpec, OffsetPotential, Potential};
