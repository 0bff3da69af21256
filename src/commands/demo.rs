//! # demo 命令实现
//!
//! H₂O 分子上的五个常数偏移势集成：打印总能量、总力和诊断映射。
//!
//! ## 依赖关系
//! - 使用 `cli/demo.rs` 定义的参数
//! - 使用 `ensemble_uq` 的 ensemble / potentials
//! - 使用 `utils/output.rs`

use crate::cli::demo::DemoArgs;

use ensemble_uq::ensemble::EnsembleCalculator;
use ensemble_uq::models::Configuration;
use ensemble_uq::potentials::{OffsetPotential, Potential};
use ensemble_uq::utils::output;

/// 演示用 (能量偏移, 力偏移)
const DEMO_OFFSETS: [(f64, f64); 5] = [
    (0.0, 0.01),
    (0.1, 0.02),
    (-0.1, -0.01),
    (0.2, 0.03),
    (-0.05, -0.02),
];

/// 键角 104.5°、键长 0.95 Å 的水分子
fn water() -> anyhow::Result<Configuration> {
    let angle = 104.5f64.to_radians();
    Ok(Configuration::from_symbols(
        "H2O",
        &["H", "H", "O"],
        vec![
            [0.0, 0.0, 0.0],
            [0.95, 0.0, 0.0],
            [0.95 * angle.cos(), 0.95 * angle.sin(), 0.0],
        ],
    )?)
}

/// 执行 demo 命令
pub fn execute(args: DemoArgs) -> anyhow::Result<()> {
    output::print_header("Ensemble Demo: H2O with 5 offset potentials");

    let models: Vec<Box<dyn Potential>> = DEMO_OFFSETS
        .iter()
        .map(|&(e, f)| Box::new(OffsetPotential::new(e, f)) as Box<dyn Potential>)
        .collect();

    let mut calculator = EnsembleCalculator::with_settings(models, args.ensemble.settings())?;
    let config = water()?;
    let result = calculator.evaluate(&config)?;

    output::print_field("Total energy (eV)", &format!("{:.6}", result.energy));
    println!("  Forces (eV/Å):");
    for (species, row) in config.species().iter().zip(result.forces.rows()) {
        println!(
            "    {:<2} {:>12.6} {:>12.6} {:>12.6}",
            species, row[0], row[1], row[2]
        );
    }

    output::print_separator();
    println!("  Stats:");
    for (key, value) in calculator.diagnostics() {
        output::print_field(key, &value.to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_water_geometry() {
        let config = water().unwrap();
        assert_eq!(config.formula(), "H2O");

        let d = config.displacement(0, 2);
        let r = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
        assert!((r - 0.95).abs() < 1e-12);
    }

    #[test]
    fn test_demo_ensemble_statistics() {
        let models: Vec<Box<dyn Potential>> = DEMO_OFFSETS
            .iter()
            .map(|&(e, f)| Box::new(OffsetPotential::new(e, f)) as Box<dyn Potential>)
            .collect();
        let mut calculator = EnsembleCalculator::new(models).unwrap();
        let result = calculator.evaluate(&water().unwrap()).unwrap();

        // 偏移 {0, 0.1, -0.1, 0.2, -0.05}：均值 0.03，总体方差 0.0116
        assert!((result.mean_energy - 3.03).abs() < 1e-9);
        assert!((result.energy_variance - 0.0116).abs() < 1e-9);
        assert!((result.energy + 0.0116 / 3.0).abs() < 1e-9);
    }
}
