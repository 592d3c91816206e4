//! 可观测性：tracing 订阅器
//!
//! 日志写 stderr，stdout 留给候选列表与交互提示。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 默认 info，`-v` 时 debug；设置了 RUST_LOG 时以它为准
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(verbose))
        .try_init();
}
