//! # 日志初始化
//!
//! 库内部通过 `log` 门面输出诊断日志，二进制程序在启动时安装 `env_logger`。
//! 默认级别为 warn，`-v` 提升到 info，`-vv` 提升到 debug；
//! 设置了 `RUST_LOG` 时以环境变量为准。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `log`, `env_logger`

use log::LevelFilter;

/// 由命令行 `-v` 次数决定的日志级别
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// 安装全局日志记录器（重复调用时忽略）
pub fn init(verbose: u8) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level_for_verbosity(verbose));

    if let Ok(spec) = std::env::var("RUST_LOG") {
        builder.parse_filters(&spec);
    }

    builder.format_timestamp(None).try_init().ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_for_verbosity() {
        assert_eq!(level_for_verbosity(0), LevelFilter::Warn);
        assert_eq!(level_for_verbosity(2), LevelFilter::Debug);
        assert_eq!(level_for_verbosity(9), LevelFilter::Trace);
    }
}
