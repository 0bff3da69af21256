//! # 模型描述字符串
//!
//! 命令行用 `kind:key=value,key=value` 描述一个集成成员，例如：
//! - `offset:energy=0.1,force=0.01`
//! - `lj:epsilon=0.0104,sigma=3.4,cutoff=8.5`
//! - `harmonic:k=0.5`
//!
//! 省略的参数取默认值。
//!
//! ## 依赖关系
//! - 被 `cli/evaluate.rs` 作为 clap 参数类型使用
//! - 构造 `potentials/` 中的具体模型

use crate::error::{EnsembleError, Result};
use crate::potentials::{HarmonicWell, LennardJones, OffsetPotential, Potential};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// 解析后的模型描述
#[derive(Debug, Clone, PartialEq)]
pub enum ModelSpec {
    Offset { energy: f64, force: f64 },
    LennardJones { epsilon: f64, sigma: f64, cutoff: f64 },
    Harmonic { k: f64 },
}

impl ModelSpec {
    /// 构造具体模型
    pub fn build(&self) -> Result<Box<dyn Potential>> {
        let model: Box<dyn Potential> = match *self {
            ModelSpec::Offset { energy, force } => Box::new(OffsetPotential::new(energy, force)),
            ModelSpec::LennardJones {
                epsilon,
                sigma,
                cutoff,
            } => Box::new(LennardJones::new(epsilon, sigma, cutoff)?),
            ModelSpec::Harmonic { k } => Box::new(HarmonicWell::new(k)),
        };
        Ok(model)
    }
}

/// 解析 `key=value` 参数表
fn parse_params(spec: &str, body: &str) -> Result<BTreeMap<String, f64>> {
    let mut params = BTreeMap::new();

    for item in body.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (key, value) = item.split_once('=').ok_or_else(|| EnsembleError::InvalidModelSpec {
            spec: spec.to_string(),
            reason: format!("expected key=value, got '{}'", item),
        })?;

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| EnsembleError::InvalidModelSpec {
                spec: spec.to_string(),
                reason: format!("'{}' is not a number", value.trim()),
            })?;

        params.insert(key.trim().to_lowercase(), value);
    }

    Ok(params)
}

/// 按别名取出参数，缺省时返回 default
fn take(params: &mut BTreeMap<String, f64>, keys: &[&str], default: f64) -> f64 {
    keys.iter()
        .find_map(|k| params.remove(*k))
        .unwrap_or(default)
}

impl FromStr for ModelSpec {
    type Err = EnsembleError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, body) = s.split_once(':').unwrap_or((s, ""));
        let mut params = parse_params(s, body)?;

        let spec = match kind.trim().to_lowercase().as_str() {
            "offset" | "dummy" => ModelSpec::Offset {
                energy: take(&mut params, &["energy", "e"], 0.0),
                force: take(&mut params, &["force", "f"], 0.0),
            },
            "lj" | "lennard-jones" => {
                let defaults = LennardJones::default();
                ModelSpec::LennardJones {
                    epsilon: take(&mut params, &["epsilon", "eps"], defaults.epsilon),
                    sigma: take(&mut params, &["sigma"], defaults.sigma),
                    cutoff: take(&mut params, &["cutoff", "rc"], defaults.cutoff),
                }
            }
            "harmonic" => ModelSpec::Harmonic {
                k: take(&mut params, &["k"], 1.0),
            },
            other => {
                return Err(EnsembleError::InvalidModelSpec {
                    spec: s.to_string(),
                    reason: format!("unknown model kind '{}'", other),
                })
            }
        };

        if let Some(key) = params.keys().next() {
            return Err(EnsembleError::InvalidModelSpec {
                spec: s.to_string(),
                reason: format!("unknown parameter '{}'", key),
            });
        }

        Ok(spec)
    }
}

impl fmt::Display for ModelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSpec::Offset { energy, force } => write!(f, "offset:energy={},force={}", energy, force),
            ModelSpec::LennardJones {
                epsilon,
                sigma,
                cutoff,
            } => write!(f, "lj:epsilon={},sigma={},cutoff={}", epsilon, sigma, cutoff),
            ModelSpec::Harmonic { k } => write!(f, "harmonic:k={}", k),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_offset() {
        let spec: ModelSpec = "offset:energy=0.1,force=-0.01".parse().unwrap();
        assert_eq!(
            spec,
            ModelSpec::Offset {
                energy: 0.1,
                force: -0.01
            }
        );
    }

    #[test]
    fn test_parse_lj_defaults() {
        let spec: ModelSpec = "lj:sigma=3.0".parse().unwrap();
        match spec {
            ModelSpec::LennardJones { sigma, cutoff, .. } => {
                assert_eq!(sigma, 3.0);
                assert_eq!(cutoff, 8.5);
            }
            _ => panic!("expected lj"),
        }
    }

    #[test]
    fn test_parse_bare_kind() {
        let spec: ModelSpec = "harmonic".parse().unwrap();
        assert_eq!(spec, ModelSpec::Harmonic { k: 1.0 });
    }

    #[test]
    fn test_parse_errors() {
        assert!("morse:d=1".parse::<ModelSpec>().is_err());
        assert!("lj:sigma".parse::<ModelSpec>().is_err());
        assert!("lj:sigma=abc".parse::<ModelSpec>().is_err());
        assert!("harmonic:q=2".parse::<ModelSpec>().is_err());
    }

    #[test]
    fn test_build() {
        let model = "lj:epsilon=0.01,sigma=3.4".parse::<ModelSpec>().unwrap().build().unwrap();
        assert!(model.name().starts_with("lj"));
        assert!("lj:sigma=-1".parse::<ModelSpec>().unwrap().build().is_err());
    }
}
