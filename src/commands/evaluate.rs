//! # evaluate 命令实现
//!
//! 用模型集成评估一个或多个结构文件。
//!
//! ## 功能
//! - 按 `--model` 描述构造成员模型
//! - 单文件：打印结果、诊断信息，可选逐原子力表/CSV
//! - 目录：并行批量评估，打印汇总表，可选导出 CSV
//!
//! ## 依赖关系
//! - 使用 `cli/evaluate.rs` 定义的参数
//! - 使用 `ensemble_uq` 的 ensemble / parsers / batch / export
//! - 使用 `utils/output.rs`

use crate::cli::evaluate::EvaluateArgs;

use anyhow::{bail, Context};
use ensemble_uq::batch::{BatchRunner, FileCollector, ProcessResult};
use ensemble_uq::ensemble::{Ensemble, EnsembleCalculator, EnsembleResult};
use ensemble_uq::error::EnsembleError;
use ensemble_uq::export::{self, SummaryRow};
use ensemble_uq::models::Configuration;
use ensemble_uq::parsers;
use ensemble_uq::potentials::Potential;
use ensemble_uq::utils::output;

use std::path::Path;
use tabled::{Table, Tabled};

/// 汇总表行
#[derive(Debug, Clone, Tabled)]
struct SummaryTableRow {
    #[tabled(rename = "Structure")]
    structure: String,
    #[tabled(rename = "N")]
    n_atoms: usize,
    #[tabled(rename = "E (eV)")]
    energy: String,
    #[tabled(rename = "Ē (eV)")]
    mean_energy: String,
    #[tabled(rename = "σ²_E")]
    variance: String,
    #[tabled(rename = "E_bias (eV)")]
    bias: String,
    #[tabled(rename = "max σ_F (eV/Å)")]
    max_force_std: String,
}

impl From<&SummaryRow> for SummaryTableRow {
    fn from(row: &SummaryRow) -> Self {
        SummaryTableRow {
            structure: row.structure.clone(),
            n_atoms: row.n_atoms,
            energy: format!("{:.6}", row.energy),
            mean_energy: format!("{:.6}", row.mean_energy),
            variance: format!("{:.4e}", row.energy_variance),
            bias: format!("{:.4e}", row.energy_bias),
            max_force_std: format!("{:.4}", row.max_force_std),
        }
    }
}

/// 逐原子力表行
#[derive(Debug, Clone, Tabled)]
struct ForceTableRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Species")]
    species: String,
    #[tabled(rename = "F (eV/Å)")]
    total: String,
    #[tabled(rename = "F̄ (eV/Å)")]
    mean: String,
    #[tabled(rename = "F_bias (eV/Å)")]
    bias: String,
    #[tabled(rename = "σ_F")]
    std: String,
}

fn format_vector(v: &[f64]) -> String {
    let items: Vec<String> = v.iter().map(|x| format!("{:>9.5}", x)).collect();
    format!("[{}]", items.join(" "))
}

/// 执行 evaluate 命令
pub fn execute(args: EvaluateArgs) -> anyhow::Result<()> {
    output::print_header("Ensemble Evaluation");

    let models = args
        .models
        .iter()
        .map(|spec| {
            spec.build()
                .with_context(|| format!("Failed to build model '{}'", spec))
        })
        .collect::<anyhow::Result<Vec<Box<dyn Potential>>>>()?;

    let ensemble = Ensemble::new(models, args.ensemble.settings())?;

    output::print_info(&format!(
        "{} models, bias strength r = {}, w_means = {}",
        ensemble.n_models(),
        ensemble.settings().bias_strength,
        ensemble.settings().w_means
    ));
    for (i, name) in ensemble.model_names().iter().enumerate() {
        output::print_field(&format!("model #{}", i), name);
    }
    println!();

    if !args.input.exists() {
        bail!("Input not found: {}", args.input.display());
    }

    if args.input.is_file() {
        evaluate_single(ensemble, &args.input, &args)
    } else {
        evaluate_batch(&ensemble, &args)
    }
}

/// 单个结构文件
fn evaluate_single(ensemble: Ensemble, path: &Path, args: &EvaluateArgs) -> anyhow::Result<()> {
    let config = parsers::parse_structure_file(path)
        .with_context(|| format!("Failed to read structure {}", path.display()))?;

    let mut calculator = EnsembleCalculator::from_ensemble(ensemble);
    let result = calculator
        .evaluate(&config)
        .with_context(|| format!("Ensemble evaluation failed for {}", path.display()))?;

    let row = SummaryRow::new(&config, result);
    println!("{}", Table::new([SummaryTableRow::from(&row)]));

    if args.show_forces {
        print_forces(&config, result);
    }

    if let Some(forces_csv) = &args.forces_csv {
        export::forces_to_csv(&config, result, forces_csv)?;
        output::print_done(&format!("Forces written to '{}'", forces_csv.display()));
    }

    if let Some(output_csv) = &args.output_csv {
        export::summary_to_csv(std::slice::from_ref(&row), output_csv)?;
        output::print_done(&format!("Summary written to '{}'", output_csv.display()));
    }

    output::print_separator();
    for (key, value) in calculator.diagnostics() {
        if value.as_scalar().is_some() || value.as_count().is_some() {
            output::print_field(key, &value.to_string());
        }
    }

    Ok(())
}

/// 打印逐原子力表
fn print_forces(config: &Configuration, result: &EnsembleResult) {
    let force_std = result.force_std();
    let rows: Vec<ForceTableRow> = config
        .species()
        .iter()
        .enumerate()
        .map(|(i, species)| ForceTableRow {
            index: i,
            species: species.clone(),
            total: format_vector(result.forces.row(i)),
            mean: format_vector(result.mean_forces.row(i)),
            bias: format_vector(result.bias_forces.row(i)),
            std: format!("{:.5}", force_std[i]),
        })
        .collect();

    println!("{}", Table::new(rows));
}

/// 目录批量评估
fn evaluate_batch(ensemble: &Ensemble, args: &EvaluateArgs) -> anyhow::Result<()> {
    if args.show_forces || args.forces_csv.is_some() {
        output::print_warning("Per-atom force output is only available for a single structure.");
    }

    let files = FileCollector::new(args.input.clone())
        .with_pattern(&args.pattern)?
        .recursive(args.recursive)
        .collect();

    if files.is_empty() {
        return Err(EnsembleError::NoFilesFound {
            pattern: args.pattern.clone(),
        }
        .into());
    }

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!(
        "Evaluating {} structures with {} jobs...",
        files.len(),
        runner.jobs()
    ));

    let batch = runner.run(&files, |path| {
        let name = path.display().to_string();
        let config = match parsers::parse_structure_file(path) {
            Ok(config) => config,
            Err(EnsembleError::UnsupportedFormat(_)) => return ProcessResult::Skipped(name),
            Err(e) => return ProcessResult::Failed(name, e.to_string()),
        };

        match ensemble.compute(&config) {
            Ok(result) => ProcessResult::Success(SummaryRow::new(&config, &result)),
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    })?;

    if !batch.successes.is_empty() {
        let table_rows: Vec<SummaryTableRow> =
            batch.successes.iter().map(SummaryTableRow::from).collect();
        println!("{}", Table::new(table_rows));
    }

    if let Some(output_csv) = &args.output_csv {
        export::summary_to_csv(&batch.successes, output_csv)?;
        output::print_done(&format!("Summary written to '{}'", output_csv.display()));
    }

    for (path, err) in &batch.failures {
        output::print_warning(&format!("{}: {}", path, err));
    }

    output::print_info(&format!(
        "Total: {}, evaluated: {}, skipped: {}, failed: {}",
        batch.total(),
        batch.successes.len(),
        batch.skipped,
        batch.failures.len()
    ));

    if !batch.failures.is_empty() {
        bail!("{} structures failed to evaluate", batch.failures.len());
    }

    Ok(())
}
