//! # 预测收集器
//!
//! 在同一个构型上依次（或并行）调用每个成员模型，收集对齐的能量和力场数组。
//!
//! ## 功能
//! - 每个模型恰好调用一次，结果按模型列表顺序索引
//! - 在边界处校验能量/力是否有限、原子数是否与构型一致
//! - 校验所有力场维数一致
//! - 任一模型失败即整体失败，不返回部分结果
//!
//! ## 依赖关系
//! - 被 `ensemble/calculator.rs` 调用
//! - 使用 `potentials/` 的 `Potential` trait
//! - 使用 `rayon` 进行可选的并行调用

use crate::error::{EnsembleError, Result};
use crate::models::{Configuration, ForceField};
use crate::potentials::Potential;

use rayon::prelude::*;

/// M 个成员模型的预测，按模型索引对齐
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionSet {
    /// 各模型能量
    pub energies: Vec<f64>,
    /// 各模型力场
    pub forces: Vec<ForceField>,
}

impl PredictionSet {
    /// 模型数 M
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }

    /// 力场形状（取第一个模型）
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.forces.first().map(|f| f.shape())
    }
}

/// 单个模型的预测
struct MemberPrediction {
    index: usize,
    model: String,
    energy: f64,
    forces: ForceField,
}

/// 调用单个模型并校验输出
fn predict_one<P: Potential + ?Sized>(
    index: usize,
    model: &P,
    config: &Configuration,
) -> Result<MemberPrediction> {
    let name = model.name();
    let fail = |reason: String| EnsembleError::Prediction {
        index,
        model: name.clone(),
        reason,
    };

    let energy = model
        .predict_energy(config)
        .map_err(|e| fail(e.to_string()))?;
    if !energy.is_finite() {
        return Err(fail(format!("non-finite energy {}", energy)));
    }

    let forces = model
        .predict_forces(config)
        .map_err(|e| fail(e.to_string()))?;
    if forces.n_atoms() != config.len() {
        return Err(fail(format!(
            "forces given for {} atoms, configuration has {}",
            forces.n_atoms(),
            config.len()
        )));
    }
    if !forces.is_finite() {
        return Err(fail("non-finite force components".to_string()));
    }

    log::debug!(
        "model #{} ({}): energy = {:.6} eV, max |F| = {:.6} eV/Å",
        index,
        name,
        energy,
        forces.max_norm()
    );

    Ok(MemberPrediction {
        index,
        model: name,
        energy,
        forces,
    })
}

/// 按索引顺序合并预测，并检查力场维数一致
fn assemble<I>(outputs: I, capacity: usize) -> Result<PredictionSet>
where
    I: Iterator<Item = Result<MemberPrediction>>,
{
    let mut set = PredictionSet {
        energies: Vec::with_capacity(capacity),
        forces: Vec::with_capacity(capacity),
    };

    for output in outputs {
        let member = output?;

        if let Some(expected) = set.shape() {
            if member.forces.shape() != expected {
                return Err(EnsembleError::ShapeMismatch {
                    index: member.index,
                    model: member.model,
                    expected,
                    found: member.forces.shape(),
                });
            }
        }

        set.energies.push(member.energy);
        set.forces.push(member.forces);
    }

    Ok(set)
}

/// 收集所有成员模型的预测
///
/// 并行模式下等待全部模型完成后再按索引合并；若多个模型失败，报告索引最小者。
pub fn collect_predictions<P: Potential>(
    models: &[P],
    config: &Configuration,
    parallel: bool,
) -> Result<PredictionSet> {
    if models.is_empty() {
        return Err(EnsembleError::Configuration(
            "Cannot collect predictions from an empty ensemble".to_string(),
        ));
    }

    if parallel {
        let outputs: Vec<Result<MemberPrediction>> = models
            .par_iter()
            .enumerate()
            .map(|(i, model)| predict_one(i, model, config))
            .collect();
        assemble(outputs.into_iter(), models.len())
    } else {
        let outputs = models
            .iter()
            .enumerate()
            .map(|(i, model)| predict_one(i, model, config));
        assemble(outputs, models.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::potentials::OffsetPotential;

    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 返回错误原子数的模型
    struct Truncating;

    impl Potential for Truncating {
        fn name(&self) -> String {
            "truncating".to_string()
        }

        fn predict_energy(&self, _config: &Configuration) -> Result<f64> {
            Ok(0.0)
        }

        fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
            Ok(ForceField::zeros(config.len() - 1, 3))
        }
    }

    /// 返回二维力的模型
    struct Planar;

    impl Potential for Planar {
        fn name(&self) -> String {
            "planar".to_string()
        }

        fn predict_energy(&self, _config: &Configuration) -> Result<f64> {
            Ok(0.0)
        }

        fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
            Ok(ForceField::zeros(config.len(), 2))
        }
    }

    /// 记录调用次数的模型
    struct Counting<'a> {
        calls: &'a AtomicUsize,
        fail: bool,
    }

    impl Potential for Counting<'_> {
        fn name(&self) -> String {
            "counting".to_string()
        }

        fn predict_energy(&self, _config: &Configuration) -> Result<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(EnsembleError::ModelFailure("scripted failure".to_string()))
            } else {
                Ok(1.0)
            }
        }

        fn predict_forces(&self, config: &Configuration) -> Result<ForceField> {
            Ok(ForceField::zeros(config.len(), 3))
        }
    }

    fn h2() -> Configuration {
        Configuration::from_symbols("H2", &["H", "H"], vec![[0.0; 3], [0.7, 0.0, 0.0]]).unwrap()
    }

    fn offsets() -> Vec<Box<dyn Potential>> {
        vec![
            Box::new(OffsetPotential::new(0.0, 0.0)),
            Box::new(OffsetPotential::new(0.1, 0.1)),
            Box::new(OffsetPotential::new(-0.1, -0.1)),
        ]
    }

    #[test]
    fn test_collect_aligned() {
        let set = collect_predictions(&offsets(), &h2(), false).unwrap();
        assert_eq!(set.len(), 3);
        assert!((set.energies[1] - 2.1).abs() < 1e-12);
        assert!((set.forces[2].values()[0] + 0.1).abs() < 1e-12);
        assert_eq!(set.shape(), Some((2, 3)));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let models = offsets();
        let seq = collect_predictions(&models, &h2(), false).unwrap();
        let par = collect_predictions(&models, &h2(), true).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn test_empty_models() {
        let models: Vec<Box<dyn Potential>> = Vec::new();
        let err = collect_predictions(&models, &h2(), false).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_wrong_atom_count_reports_index() {
        let mut models = offsets();
        models.insert(1, Box::new(Truncating));
        let err = collect_predictions(&models, &h2(), false).unwrap_err();
        assert!(matches!(err, EnsembleError::Prediction { index: 1, .. }));
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut models = offsets();
        models.push(Box::new(Planar));

        for parallel in [false, true] {
            let err = collect_predictions(&models, &h2(), parallel).unwrap_err();
            match err {
                EnsembleError::ShapeMismatch {
                    index,
                    expected,
                    found,
                    ..
                } => {
                    assert_eq!(index, 3);
                    assert_eq!(expected, (2, 3));
                    assert_eq!(found, (2, 2));
                }
                other => panic!("unexpected error: {}", other),
            }
        }
    }

    #[test]
    fn test_sequential_stops_at_first_failure() {
        let calls = AtomicUsize::new(0);
        let models = vec![
            Counting { calls: &calls, fail: false },
            Counting { calls: &calls, fail: true },
            Counting { calls: &calls, fail: false },
        ];
        let err = collect_predictions(&models, &h2(), false).unwrap_err();
        assert_eq!(err.model_index(), Some(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_each_model_called_once() {
        let calls = AtomicUsize::new(0);
        let models = vec![
            Counting { calls: &calls, fail: false },
            Counting { calls: &calls, fail: false },
        ];
        collect_predictions(&models, &h2(), true).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_first_failure_wins_in_parallel() {
        let calls = AtomicUsize::new(0);
        let models = vec![
            Counting { calls: &calls, fail: false },
            Counting { calls: &calls, fail: true },
            Counting { calls: &calls, fail: true },
        ];
        let err = collect_predictions(&models, &h2(), true).unwrap_err();
        assert_eq!(err.model_index(), Some(1));
        assert!(err.to_string().contains("scripted failure"));
    }
}
