//! 日志初始化
//!
//! 按配置安装 `tracing-subscriber` 订阅器

use crate::config::{LogFormat, LoggingConfig};
use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

/// 计算最终生效的日志过滤指令，命令行参数优先
pub fn effective_level<'a>(config: &'a LoggingConfig, override_level: Option<&'a str>) -> &'a str {
    override_level
        .map(str::trim)
        .filter(|level| !level.is_empty())
        .unwrap_or(config.level.as_str())
}

/// 初始化全局日志订阅器
pub fn init_logging(config: &LoggingConfig, override_level: Option<&str>) -> Result<()> {
    let level = effective_level(config, override_level);
    let filter = EnvFilter::try_new(level)
        .with_context(|| format!("Invalid log filter '{}'", level))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {}", e))?;

    tracing::debug!("Logging initialised with filter '{}' ({:?})", level, config.format);
    Ok(())
}
