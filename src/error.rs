//! # 统一错误处理模块
//!
//! 定义 ensemble-uq 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分类
//! - 配置错误：空模型列表、空预测集、零原子、非有限参数
//! - 预测错误：某个成员模型失败或返回不一致的结果（附带模型索引）
//! - 形状不匹配：各模型力场维度不一致（附带模型索引）
//! - I/O、解析、CSV 错误：仅供命令行驱动层使用
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use thiserror::Error;

/// ensemble-uq 统一错误类型
#[derive(Error, Debug)]
pub enum EnsembleError {
    // ─────────────────────────────────────────────────────────────
    // 集成计算错误
    // ─────────────────────────────────────────────────────────────
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Prediction failed for model #{index} ({model}): {reason}")]
    Prediction {
        index: usize,
        model: String,
        reason: String,
    },

    #[error(
        "Force shape mismatch for model #{index} ({model}): expected {}x{}, found {}x{}",
        .expected.0, .expected.1, .found.0, .found.1
    )]
    ShapeMismatch {
        index: usize,
        model: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    #[error("Model failure: {0}")]
    ModelFailure(String),

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 解析错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to parse {format} file: {path}\nReason: {reason}")]
    ParseError {
        format: String,
        path: String,
        reason: String,
    },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid model specification '{spec}': {reason}")]
    InvalidModelSpec { spec: String, reason: String },

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    // ─────────────────────────────────────────────────────────────
    // 其他
    // ─────────────────────────────────────────────────────────────
    #[error("No matching files found with pattern: {pattern}")]
    NoFilesFound { pattern: String },
}

impl EnsembleError {
    /// 出错的成员模型索引（仅预测错误和形状不匹配有）
    pub fn model_index(&self) -> Option<usize> {
        match self {
            EnsembleError::Prediction { index, .. } | EnsembleError::ShapeMismatch { index, .. } => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// 是否为配置错误
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, EnsembleError::Configuration(_))
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, EnsembleError>;
