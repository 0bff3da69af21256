//! # 数据模型模块
//!
//! 定义原子构型、晶格和力场数组。
//!
//! ## 依赖关系
//! - 被 `potentials/`, `ensemble/`, `parsers/` 使用
//! - 子模块: configuration, forces, lattice

pub mod configuration;
pub mod forces;
pub mod lattice;

pub use configuration::Configuration;
pub use forces::ForceField;
pub use lattice::Lattice;
