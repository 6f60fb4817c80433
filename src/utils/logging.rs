//! 日志工具模块
//!
//! 提供日志初始化、启动横幅和预览截断等辅助函数
use crate::config::Config;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志
///
/// `RUST_LOG` 优先；未设置时按 `verbose` 选择 debug / info。
/// 日志写到 stderr，stdout 留给回答输出。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试里可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 问题构建器启动");
    info!("🌐 处理服务: {}/process", config.endpoint_base_url.trim_end_matches('/'));
    info!("💾 缓冲区文件: {}", config.store_path);
    info!("⏱️ 提交超时: {} 秒", config.submit_timeout().as_secs());
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志和通知显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大字符数
///
/// # 返回
/// 返回截断后的文本，超长时追加 "..."
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
