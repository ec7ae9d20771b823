//! # 前台管理模块
//!
//! 提供配置加载与验证、日志初始化等运维功能

pub mod config;
pub mod logging;

pub use self::config::{
    ConfigLoader, ConfigValidator, DeskConfig, JourneyConfig, LogFormat, LoggingConfig,
};
pub use self::logging::init_logging;
