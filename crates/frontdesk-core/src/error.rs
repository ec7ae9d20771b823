//! 错误定义模块

use thiserror::Error;

/// 前台系统统一错误类型
#[derive(Error, Debug)]
pub enum DeskError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("患者已存在: {0}")]
    DuplicatePatient(String),

    #[error("无效的阶段索引: {target} (当前 {current}, 共 {stages} 个阶段)")]
    InvalidStageIndex {
        target: usize,
        current: usize,
        stages: usize,
    },

    #[error("无效的状态: {status} 不能用于阶段 {stage}/{stages}")]
    InvalidStatus {
        status: String,
        stage: usize,
        stages: usize,
    },

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("系统内部错误: {0}")]
    Internal(String),
}

/// 前台系统统一结果类型
pub type Result<T> = std::result::Result<T, DeskError>;
