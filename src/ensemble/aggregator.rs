//! # 集成聚合器
//!
//! 将 M 个成员模型的预测合并为一个能量/力估计，并用模型间的能量方差
//! 构造偏差修正项。
//!
//! ## 算法概述
//! 1. Ē = mean(Eᵢ)
//! 2. F̄ = mean(Fᵢ)（逐元素）
//! 3. σ²_E = mean((Eᵢ − Ē)²)（总体方差，除以 M）
//! 4. E_bias = r σ²_E / N
//! 5. F_bias = −r Σᵢ (Eᵢ − Ē)(Fᵢ − F̄)（不除以 N）
//! 6. E = w_means·Ē − E_bias
//! 7. F = w_means·F̄ + F_bias
//!
//! 能量偏差除以原子数而偏差力不除，这一不对称保持原样。
//!
//! ## 依赖关系
//! - 被 `ensemble/calculator.rs` 调用
//! - 使用 `ensemble/collector.rs` 的 PredictionSet

use crate::ensemble::collector::PredictionSet;
use crate::ensemble::result::EnsembleResult;
use crate::error::{EnsembleError, Result};
use crate::models::ForceField;

/// 平均能量
pub fn mean_energy(energies: &[f64]) -> Result<f64> {
    if energies.is_empty() {
        return Err(EnsembleError::Configuration(
            "Cannot average an empty set of energies".to_string(),
        ));
    }
    Ok(energies.iter().sum::<f64>() / energies.len() as f64)
}

/// 逐元素平均力场
pub fn mean_forces(forces: &[ForceField]) -> Result<ForceField> {
    let first = forces.first().ok_or_else(|| {
        EnsembleError::Configuration("Cannot average an empty set of force fields".to_string())
    })?;
    let (n_atoms, dim) = first.shape();

    let mut mean = ForceField::zeros(n_atoms, dim);
    for f in forces {
        mean.add_scaled(f, 1.0);
    }
    Ok(mean.scaled(1.0 / forces.len() as f64))
}

/// 能量总体方差（除以 M）
pub fn energy_variance(energies: &[f64], mean: f64) -> Result<f64> {
    if energies.is_empty() {
        return Err(EnsembleError::Configuration(
            "Cannot take the variance of an empty set of energies".to_string(),
        ));
    }
    Ok(energies.iter().map(|e| (e - mean) * (e - mean)).sum::<f64>() / energies.len() as f64)
}

/// 偏差力 −r Σᵢ (Eᵢ − Ē)(Fᵢ − F̄)
pub fn bias_forces(
    energies: &[f64],
    forces: &[ForceField],
    mean_energy: f64,
    mean_forces: &ForceField,
    bias_strength: f64,
) -> ForceField {
    let (n_atoms, dim) = mean_forces.shape();
    let mut acc = ForceField::zeros(n_atoms, dim);

    for (e, f) in energies.iter().zip(forces.iter()) {
        let energy_diff = e - mean_energy;
        for ((a, fi), fm) in acc
            .values_mut()
            .iter_mut()
            .zip(f.values().iter())
            .zip(mean_forces.values().iter())
        {
            *a += energy_diff * (fi - fm);
        }
    }

    acc.scaled(-bias_strength)
}

/// 检查预测集内部一致
fn check_predictions(predictions: &PredictionSet, n_atoms: usize) -> Result<()> {
    if predictions.is_empty() {
        return Err(EnsembleError::Configuration(
            "Cannot aggregate an empty prediction set".to_string(),
        ));
    }
    if n_atoms == 0 {
        return Err(EnsembleError::Configuration(
            "Cannot aggregate predictions for a configuration with no atoms".to_string(),
        ));
    }
    if predictions.forces.len() != predictions.energies.len() {
        return Err(EnsembleError::Configuration(format!(
            "{} energies but {} force fields",
            predictions.energies.len(),
            predictions.forces.len()
        )));
    }

    let expected = (n_atoms, predictions.forces[0].dim());
    for (index, f) in predictions.forces.iter().enumerate() {
        if f.shape() != expected {
            return Err(EnsembleError::ShapeMismatch {
                index,
                model: format!("member {}", index),
                expected,
                found: f.shape(),
            });
        }
    }

    Ok(())
}

/// 聚合 M 个预测
pub fn aggregate(
    predictions: &PredictionSet,
    n_atoms: usize,
    bias_strength: f64,
    w_means: f64,
) -> Result<EnsembleResult> {
    check_predictions(predictions, n_atoms)?;

    let energies = &predictions.energies;
    let forces = &predictions.forces;

    let mean_e = mean_energy(energies)?;
    let mean_f = mean_forces(forces)?;
    let variance = energy_variance(energies, mean_e)?;
    let energy_bias = bias_strength * variance / n_atoms as f64;
    let bias_f = bias_forces(energies, forces, mean_e, &mean_f, bias_strength);

    let total_energy = w_means * mean_e - energy_bias;
    let mut total_forces = mean_f.scaled(w_means);
    total_forces.add_scaled(&bias_f, 1.0);

    log::info!(
        "ensemble of {}: mean E = {:.6} eV, variance = {:.6e}, bias = {:.6e} eV",
        predictions.len(),
        mean_e,
        variance,
        energy_bias
    );

    Ok(EnsembleResult {
        energy: total_energy,
        forces: total_forces,
        mean_energy: mean_e,
        mean_forces: mean_f,
        energy_variance: variance,
        energy_bias,
        bias_forces: bias_f,
        individual_energies: energies.clone(),
        individual_forces: forces.clone(),
        n_atoms,
        bias_strength,
        w_means,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 每个模型的力在空间上为常数
    fn constant_set(energies: &[f64], force_values: &[f64], n_atoms: usize) -> PredictionSet {
        PredictionSet {
            energies: energies.to_vec(),
            forces: force_values
                .iter()
                .map(|&v| ForceField::filled(n_atoms, 3, v))
                .collect(),
        }
    }

    /// 力随原子和分量变化的预测集
    fn varied_set() -> PredictionSet {
        PredictionSet {
            energies: vec![-3.2, -3.5, -2.9, -3.1],
            forces: vec![
                ForceField::from_vectors(&[[0.1, 0.2, 0.3], [-0.1, 0.0, 0.4], [0.5, -0.2, 0.0]]),
                ForceField::from_vectors(&[[0.0, 0.1, 0.2], [-0.3, 0.2, 0.1], [0.4, 0.0, -0.1]]),
                ForceField::from_vectors(&[[0.2, 0.2, 0.1], [0.1, -0.1, 0.3], [0.6, -0.3, 0.2]]),
                ForceField::from_vectors(&[[0.1, 0.0, 0.4], [0.0, 0.1, 0.2], [0.3, -0.1, 0.1]]),
            ],
        }
    }

    #[test]
    fn test_three_model_scenario() {
        let set = constant_set(&[1.0, 1.1, 0.9], &[0.0, 0.1, -0.1], 2);
        let result = aggregate(&set, 2, 1.0, 0.0).unwrap();

        assert!((result.mean_energy - 1.0).abs() < 1e-12);
        assert!((result.energy_variance - 0.02 / 3.0).abs() < 1e-6);
        assert!((result.energy_bias - 0.01 / 3.0).abs() < 1e-6);
        assert!((result.energy + 0.01 / 3.0).abs() < 1e-6);
        assert_eq!(result.forces.shape(), (2, 3));

        // Σ (ΔE)(ΔF) = 0.1·0.1 + (−0.1)(−0.1) = 0.02，取负
        for &f in result.bias_forces.values() {
            assert!((f + 0.02).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_spread() {
        let set = constant_set(&[2.5, 2.5, 2.5], &[0.3, 0.3, 0.3], 4);
        let result = aggregate(&set, 4, 1.0, 0.7).unwrap();

        assert_eq!(result.energy_variance, 0.0);
        assert_eq!(result.energy_bias, 0.0);
        assert!((result.energy - 0.7 * 2.5).abs() < 1e-12);
        assert!(result.bias_forces.values().iter().all(|&f| f == 0.0));
    }

    #[test]
    fn test_single_model() {
        let set = PredictionSet {
            energies: vec![-1.7],
            forces: vec![ForceField::from_vectors(&[[0.1, -0.2, 0.3], [0.4, 0.5, -0.6]])],
        };
        let result = aggregate(&set, 2, 1.0, 0.5).unwrap();

        assert_eq!(result.energy_variance, 0.0);
        assert!((result.energy - 0.5 * -1.7).abs() < 1e-12);
        assert!(result.bias_forces.values().iter().all(|&f| f == 0.0));
        assert!((result.forces.row(1)[2] - 0.5 * -0.6).abs() < 1e-12);
    }

    #[test]
    fn test_variance_non_negative() {
        let set = varied_set();
        let result = aggregate(&set, 3, 1.0, 0.0).unwrap();
        assert!(result.energy_variance >= 0.0);
        assert!(result.energy_bias >= 0.0);
    }

    #[test]
    fn test_order_invariance() {
        let set = varied_set();
        let mut reversed = set.clone();
        reversed.energies.reverse();
        reversed.forces.reverse();

        let a = aggregate(&set, 3, 0.8, 0.3).unwrap();
        let b = aggregate(&reversed, 3, 0.8, 0.3).unwrap();

        assert!((a.mean_energy - b.mean_energy).abs() < 1e-12);
        assert!((a.energy_variance - b.energy_variance).abs() < 1e-12);
        assert!((a.energy_bias - b.energy_bias).abs() < 1e-12);
        for (x, y) in a.bias_forces.values().iter().zip(b.bias_forces.values()) {
            assert!((x - y).abs() < 1e-12);
        }
        for (x, y) in a.forces.values().iter().zip(b.forces.values()) {
            assert!((x - y).abs() < 1e-12);
        }
    }

    #[test]
    fn test_bias_strength_scaling() {
        let set = varied_set();
        let a = aggregate(&set, 3, 1.0, 0.0).unwrap();
        let b = aggregate(&set, 3, 2.0, 0.0).unwrap();

        assert!((b.energy_bias - 2.0 * a.energy_bias).abs() < 1e-12);
        for (x, y) in a.bias_forces.values().iter().zip(b.bias_forces.values()) {
            assert!((y - 2.0 * x).abs() < 1e-12);
        }
    }

    #[test]
    fn test_energy_bias_is_intensive() {
        // 同样的方差，原子数翻倍时能量偏差减半，偏差力不变
        let small = constant_set(&[1.0, 2.0], &[0.0, 1.0], 2);
        let large = constant_set(&[1.0, 2.0], &[0.0, 1.0], 4);

        let a = aggregate(&small, 2, 1.0, 0.0).unwrap();
        let b = aggregate(&large, 4, 1.0, 0.0).unwrap();

        assert!((a.energy_bias - 2.0 * b.energy_bias).abs() < 1e-12);
        assert!((a.bias_forces.values()[0] - b.bias_forces.values()[0]).abs() < 1e-12);
    }

    #[test]
    fn test_shape_law() {
        for m in 1..5 {
            let energies: Vec<f64> = (0..m).map(|i| i as f64 * 0.1).collect();
            let forces: Vec<f64> = (0..m).map(|i| i as f64 * 0.01).collect();
            let set = constant_set(&energies, &forces, 5);
            let result = aggregate(&set, 5, 1.0, 1.0).unwrap();
            assert_eq!(result.forces.shape(), (5, 3));
            assert_eq!(result.mean_forces.shape(), (5, 3));
        }
    }

    #[test]
    fn test_empty_prediction_set() {
        let set = PredictionSet {
            energies: vec![],
            forces: vec![],
        };
        let err = aggregate(&set, 2, 1.0, 0.0).unwrap_err();
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_empty_helpers_are_configuration_errors() {
        assert!(mean_energy(&[]).unwrap_err().is_configuration_error());
        assert!(mean_forces(&[]).unwrap_err().is_configuration_error());
        assert!(energy_variance(&[], 0.0).unwrap_err().is_configuration_error());
        assert!((energy_variance(&[1.0, 3.0], 2.0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_atoms() {
        let set = constant_set(&[1.0], &[0.0], 0);
        assert!(aggregate(&set, 0, 1.0, 0.0).unwrap_err().is_configuration_error());
    }

    #[test]
    fn test_inconsistent_shapes() {
        let mut set = constant_set(&[1.0, 1.2], &[0.0, 0.1], 2);
        set.forces[1] = ForceField::zeros(3, 3);
        let err = aggregate(&set, 2, 1.0, 0.0).unwrap_err();
        assert_eq!(err.model_index(), Some(1));
    }

    #[test]
    fn test_force_std() {
        let set = constant_set(&[1.0, 1.0], &[0.0, 0.2], 1);
        let result = aggregate(&set, 1, 1.0, 0.0).unwrap();
        // 每个分量偏离 0.1，三个分量 → sqrt(3 · 0.01)
        let expected = (3.0f64 * 0.01).sqrt();
        assert!((result.force_std()[0] - expected).abs() < 1e-12);
        assert!((result.max_force_std() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_diagnostics_keys() {
        let set = constant_set(&[1.0, 1.1, 0.9], &[0.0, 0.1, -0.1], 2);
        let result = aggregate(&set, 2, 1.0, 0.0).unwrap();
        let diag = result.diagnostics();

        assert_eq!(diag.len(), 8);
        assert_eq!(diag["n_potentials"].as_count(), Some(3));
        assert_eq!(diag["bias_strength"].as_scalar(), Some(1.0));
        assert!((diag["total_energy"].as_scalar().unwrap() - result.energy).abs() < 1e-15);
        assert!(matches!(diag["individual_forces"], crate::ensemble::DiagnosticValue::Forces(ref f) if f.len() == 3));
    }
}
