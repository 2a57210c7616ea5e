/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

/// 初始化日志输出
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `config`: 当前配置（密钥只显示脱敏后的形式）
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!(
        "🚀 ModuTex 启动 - {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📁 项目目录: {}", config.project_dir.display());
    info!("🔑 API 密钥: {}", config.masked_api_key());
    info!("🤖 模型: {} ({})", config.model, config.model_description());
    info!("{}", "=".repeat(60));
}

/// 打印内容预览
///
/// # 参数
/// - `title`: 预览标题
/// - `text`: 完整内容
/// - `max_len`: 最多显示的字符数
pub fn log_preview(title: &str, text: &str, max_len: usize) {
    info!("[PREVIEW] {} (前 {} 个字符):", title, max_len);
    info!("{}", "=".repeat(60));
    info!("{}", truncate_text(text, max_len));
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（按字符计）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
