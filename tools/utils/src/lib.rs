//! 命令行工具依赖的通用组件.

use std::error::Error;
use std::fmt::Write as _;

use log::LevelFilter;
use simple_logger::SimpleLogger;

const SEP: &str = "--------------------------------------------------------";

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 安装写到 stderr 的日志器. 默认级别为 `info`, 可由 `RUST_LOG` 覆盖.
///
/// 重复安装时静默忽略.
pub fn init_logger() {
    let _ = SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .env()
        .init();
}

/// 将错误及其全部 `source` 拼接为一行.
pub fn error_chain(e: &dyn Error) -> String {
    let mut s = e.to_string();
    let mut cur = e.source();
    while let Some(inner) = cur {
        let _ = write!(s, ": {inner}");
        cur = inner.source();
    }
    s
}
