//! # XYZ 格式解析器
//!
//! 支持普通 XYZ 和扩展 XYZ（注释行中 `Lattice="ax ay az bx by bz cx cy cz"` 给出晶胞）。
//! 多帧文件只读取第一帧。
//!
//! ## XYZ 格式说明
//! ```text
//! 3                                   # number of atoms
//! water Lattice="10 0 0 0 10 0 0 0 10" # comment (optional extended-xyz keys)
//! O  0.000  0.000  0.000              # symbol x y z [extra columns ignored]
//! H  0.950  0.000  0.000
//! H -0.238  0.920  0.000
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `regex` 解析扩展 XYZ 注释行

use crate::error::{EnsembleError, Result};
use crate::models::{Configuration, Lattice};

use regex::Regex;
use std::fs;
use std::path::Path;

/// 解析 XYZ 文件
pub fn parse_xyz_file(path: &Path) -> Result<Configuration> {
    let content = fs::read_to_string(path).map_err(|e| EnsembleError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_xyz_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

fn parse_error(name: &str, reason: impl Into<String>) -> EnsembleError {
    EnsembleError::ParseError {
        format: "xyz".to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

/// 从注释行提取扩展 XYZ 晶胞
fn parse_lattice(comment: &str, name: &str) -> Result<Option<Lattice>> {
    let re = Regex::new(r#"(?i)lattice\s*=\s*"([^"]*)""#).map_err(|e| parse_error(name, e.to_string()))?;

    let caps = match re.captures(comment) {
        Some(caps) => caps,
        None => return Ok(None),
    };

    let values: Vec<f64> = caps[1]
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| parse_error(name, "Lattice entry is not numeric"))?;

    if values.len() != 9 {
        return Err(parse_error(
            name,
            format!("Lattice needs 9 numbers, found {}", values.len()),
        ));
    }

    Ok(Some(Lattice::from_vectors([
        [values[0], values[1], values[2]],
        [values[3], values[4], values[5]],
        [values[6], values[7], values[8]],
    ])))
}

/// 从字符串内容解析 XYZ 格式
pub fn parse_xyz_content(content: &str, default_name: &str) -> Result<Configuration> {
    let mut lines = content.lines();

    let n_atoms: usize = lines
        .next()
        .and_then(|l| l.trim().parse().ok())
        .ok_or_else(|| parse_error(default_name, "First line must be the atom count"))?;

    let comment = lines.next().unwrap_or("").trim();
    let lattice = parse_lattice(comment, default_name)?;

    // 注释行去掉 key=value 后剩余的文本作为名称
    let plain: Vec<&str> = comment
        .split_whitespace()
        .take_while(|w| !w.contains('='))
        .collect();
    let name = if plain.is_empty() {
        default_name.to_string()
    } else {
        plain.join(" ")
    };

    // 头部原子数不可信，预分配不超过剩余行数
    let capacity = n_atoms.min(content.lines().count());
    let mut species = Vec::with_capacity(capacity);
    let mut positions = Vec::with_capacity(capacity);

    for i in 0..n_atoms {
        let line = lines.next().ok_or_else(|| {
            parse_error(&name, format!("Expected {} atoms, found {}", n_atoms, i))
        })?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 4 {
            return Err(parse_error(&name, format!("Invalid atom line {}", i + 3)));
        }

        let coords: Vec<f64> = parts[1..4].iter().filter_map(|s| s.parse().ok()).collect();
        if coords.len() < 3 {
            return Err(parse_error(&name, format!("Invalid coordinates at line {}", i + 3)));
        }

        species.push(parts[0].to_string());
        positions.push([coords[0], coords[1], coords[2]]);
    }

    let config = Configuration::new(name, species, positions)?;
    Ok(match lattice {
        Some(cell) => config.with_cell(cell),
        None => config,
    })
}
