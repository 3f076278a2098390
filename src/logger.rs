use tracing_subscriber::{EnvFilter, fmt};

/// 初始化日志系统
///
/// 支持通过 RUST_LOG 环境变量控制日志级别
/// 默认级别: info
/// 日志输出到 stderr，stdout 上的脚本可以直接重定向
///
/// 示例:
/// - RUST_LOG=debug k6gen run --name smoke --script smoke.js
/// - RUST_LOG=warn k6gen generate "curl https://example.com" > smoke.js
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    tracing::debug!("Logger initialized");
}
