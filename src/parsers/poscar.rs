//! # VASP POSCAR 格式解析器
//!
//! 解析 VASP POSCAR/CONTCAR 文件为原子构型（笛卡尔坐标 + 晶胞）。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor (negative = target volume)
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `parsers/mod.rs` 使用
//! - 使用 `models/configuration.rs`, `models/lattice.rs`

use crate::error::{EnsembleError, Result};
use crate::models::{Configuration, Lattice};
use std::fs;
use std::path::Path;

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Configuration> {
    let content = fs::read_to_string(path).map_err(|e| EnsembleError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(
        &content,
        path.file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("unknown"),
    )
}

fn parse_error(name: &str, reason: impl Into<String>) -> EnsembleError {
    EnsembleError::ParseError {
        format: "poscar".to_string(),
        path: name.to_string(),
        reason: reason.into(),
    }
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, default_name: &str) -> Result<Configuration> {
    let lines: Vec<&str> = content.lines().collect();

    if lines.len() < 8 {
        return Err(parse_error(default_name, "File too short"));
    }

    // Line 0: Comment/name
    let name = lines[0].trim().to_string();
    let name = if name.is_empty() {
        default_name.to_string()
    } else {
        name
    };

    // Line 1: Scaling factor
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| parse_error(&name, "Invalid scaling factor"))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(parse_error(
                &name,
                format!("Invalid lattice vector at line {}", 3 + i),
            ));
        }
        *row = [parts[0], parts[1], parts[2]];
    }

    // 负缩放因子表示目标体积
    let factor = if scale < 0.0 {
        let volume = Lattice::from_vectors(matrix).volume().abs();
        if volume < 1e-10 {
            return Err(parse_error(&name, "Degenerate lattice"));
        }
        (-scale / volume).cbrt()
    } else {
        scale
    };
    let lattice = Lattice::from_vectors(matrix.map(|row| row.map(|x| x * factor)));

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    let first = line5_parts
        .first()
        .ok_or_else(|| parse_error(&name, "Missing element/count line"))?;
    let (elements, counts, atom_line_start) = if first.parse::<usize>().is_ok() {
        // VASP 4 format: no element line, only counts
        let counts: Vec<usize> = line5_parts.iter().filter_map(|s| s.parse().ok()).collect();
        let elements: Vec<String> = (0..counts.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, counts, 6)
    } else {
        // VASP 5+ format: element symbols on line 5, counts on line 6
        let elements: Vec<String> = line5_parts.iter().map(|s| s.to_string()).collect();
        let counts: Vec<usize> = lines[6]
            .split_whitespace()
            .filter_map(|s| s.parse().ok())
            .collect();
        (elements, counts, 7)
    };

    if elements.len() != counts.len() {
        return Err(parse_error(
            &name,
            format!(
                "{} element symbols but {} counts",
                elements.len(),
                counts.len()
            ),
        ));
    }

    // Check for "Selective dynamics" line
    let mut coord_line = atom_line_start;
    if lines.len() > coord_line
        && lines[coord_line]
            .trim()
            .to_lowercase()
            .starts_with('s')
    {
        coord_line += 1;
    }

    if lines.len() <= coord_line {
        return Err(parse_error(&name, "Missing coordinate type line"));
    }

    let coord_type = lines[coord_line].trim().to_lowercase();
    let is_cartesian = coord_type.starts_with('c') || coord_type.starts_with('k');

    // Parse atom positions
    let total = counts
        .iter()
        .try_fold(0usize, |acc, &n| acc.checked_add(n))
        .ok_or_else(|| parse_error(&name, "Atom count overflows"))?;
    let capacity = total.min(lines.len());
    let mut species = Vec::with_capacity(capacity);
    let mut positions = Vec::with_capacity(capacity);
    let mut line_idx = coord_line + 1;

    for (elem, &count) in elements.iter().zip(counts.iter()) {
        for _ in 0..count {
            let parts: Vec<f64> = lines
                .get(line_idx)
                .map(|l| {
                    l.split_whitespace()
                        .take(3)
                        .filter_map(|s| s.parse().ok())
                        .collect()
                })
                .unwrap_or_default();

            if parts.len() < 3 {
                return Err(parse_error(
                    &name,
                    format!(
                        "Expected {} atom positions, line {} is invalid",
                        total,
                        line_idx + 1
                    ),
                ));
            }

            let raw = [parts[0], parts[1], parts[2]];
            let position = if is_cartesian {
                raw.map(|x| x * factor)
            } else {
                lattice.frac_to_cart(raw)
            };

            species.push(elem.clone());
            positions.push(position);
            line_idx += 1;
        }
    }

    Ok(Configuration::new(name, species, positions)?.with_cell(lattice))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_poscar_vasp5() {
        let content = r#"NaCl
1.0
5.64 0.0 0.0
0.0 5.64 0.0
0.0 0.0 5.64
Na Cl
4 4
Direct
0.0 0.0 0.0
0.5 0.5 0.0
0.5 0.0 0.5
0.0 0.5 0.5
0.5 0.0 0.0
0.0 0.5 0.0
0.0 0.0 0.5
0.5 0.5 0.5
"#;
        let config = parse_poscar_content(content, "NaCl").unwrap();
        assert_eq!(config.name, "NaCl");
        assert_eq!(config.len(), 8);
        assert_eq!(config.formula(), "Cl4Na4");

        // 分数坐标已转为笛卡尔坐标
        assert!((config.positions()[1][0] - 2.82).abs() < 1e-9);
        assert!(config.cell().is_some());
    }

    #[test]
    fn test_parse_poscar_with_scale() {
        let content = r#"Si
2.0
2.0 0.0 0.0
0.0 2.0 0.0
0.0 0.0 2.0
Si
2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let config = parse_poscar_content(content, "Si").unwrap();
        let cell = config.cell().unwrap();
        assert!((cell.volume() - 64.0).abs() < 1e-9);
        assert!((config.positions()[1][2] - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_poscar_cartesian_vasp4() {
        let content = r#"Ar pair
1.0
10.0 0.0 0.0
0.0 10.0 0.0
0.0 0.0 10.0
2
Cartesian
0.0 0.0 0.0
3.8 0.0 0.0
"#;
        let config = parse_poscar_content(content, "Ar").unwrap();
        assert_eq!(config.species(), &["X1".to_string(), "X1".to_string()]);
        assert!((config.positions()[1][0] - 3.8).abs() < 1e-12);
    }

    #[test]
    fn test_parse_poscar_selective_dynamics() {
        let content = r#"Fe with selective
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
2
Selective dynamics
Direct
0.0 0.0 0.0 T T T
0.5 0.5 0.5 F F F
"#;
        let config = parse_poscar_content(content, "Fe").unwrap();
        assert_eq!(config.len(), 2);
    }

    #[test]
    fn test_parse_poscar_missing_atoms() {
        let content = r#"Fe
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
3
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        assert!(parse_poscar_content(content, "Fe").is_err());
    }

    #[test]
    fn test_parse_poscar_count_overflow() {
        let content = r#"FeNi
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe Ni
18446744073709551615 2
Direct
0.0 0.0 0.0
0.5 0.5 0.5
"#;
        let err = parse_poscar_content(content, "FeNi").unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn test_parse_poscar_huge_count() {
        let content = r#"Fe
1.0
2.87 0.0 0.0
0.0 2.87 0.0
0.0 0.0 2.87
Fe
18446744073709551615
Direct
0.0 0.0 0.0
"#;
        let err = parse_poscar_content(content, "Fe").unwrap_err();
        assert!(matches!(err, EnsembleError::ParseError { .. }));
    }
}
