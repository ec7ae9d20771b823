//! 配置管理
//!
//! 从可选的配置文件和 `FRONTDESK__*` 环境变量加载配置，并在使用前验证

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use frontdesk_core::utils::DEFAULT_ID_PREFIX;
use frontdesk_journey::pipeline::DEFAULT_STAGES;
use frontdesk_journey::StagePipeline;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "FRONTDESK";

/// 前台系统完整配置
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    /// 旅程配置
    pub journey: JourneyConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 旅程配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct JourneyConfig {
    /// 阶段名称，按顺序
    pub stages: Vec<String>,
    /// 患者ID前缀
    pub patient_id_prefix: String,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别（EnvFilter 语法）
    pub level: String,
    /// 日志格式
    pub format: LogFormat,
}

/// 日志格式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Compact,
    Json,
}

impl DeskConfig {
    /// 按配置构建阶段流水线
    pub fn pipeline(&self) -> Result<StagePipeline> {
        StagePipeline::new(&self.journey.stages).context("Invalid journey stages")
    }
}

impl Default for JourneyConfig {
    fn default() -> Self {
        Self {
            stages: DEFAULT_STAGES.iter().map(|s| s.to_string()).collect(),
            patient_id_prefix: DEFAULT_ID_PREFIX.to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// 配置加载器
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// 从文件（可选）和环境变量加载配置
    pub fn load(config_path: Option<&str>) -> Result<DeskConfig> {
        let mut builder = Config::builder();
        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("journey.stages"),
        );

        let config = Self::build(builder)?;
        match config_path {
            Some(path) => info!("Configuration loaded successfully from: {}", path),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    /// 从 TOML 文本加载配置
    pub fn from_toml_str(content: &str) -> Result<DeskConfig> {
        let builder = Config::builder().add_source(File::from_str(content, FileFormat::Toml));
        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<DeskConfig> {
        let settings = builder.build().context("Failed to read configuration sources")?;
        let config: DeskConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ConfigValidator::new().validate(&config)?;
        debug!("Effective configuration: {:?}", config);
        Ok(config)
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    /// 验证规则
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    /// 字段路径
    field_path: &'static str,
    /// 验证函数
    validator: fn(&DeskConfig) -> Result<()>,
    /// 错误消息
    error_message: &'static str,
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "journey.stages",
                validator: |config| {
                    let stages = &config.journey.stages;
                    if stages.is_empty() {
                        return Err(anyhow::anyhow!("At least one stage is required"));
                    }
                    let mut seen = HashSet::new();
                    for stage in stages {
                        let name = stage.trim();
                        if name.is_empty() {
                            return Err(anyhow::anyhow!("Stage names cannot be blank"));
                        }
                        if !seen.insert(name.to_lowercase()) {
                            return Err(anyhow::anyhow!("Duplicate stage '{}'", name));
                        }
                    }
                    Ok(())
                },
                error_message: "Invalid journey stages",
            },
            ValidationRule {
                field_path: "journey.patient_id_prefix",
                validator: |config| {
                    let prefix = &config.journey.patient_id_prefix;
                    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
                        Err(anyhow::anyhow!(
                            "Prefix '{}' must be non-empty and alphanumeric",
                            prefix
                        ))
                    } else {
                        Ok(())
                    }
                },
                error_message: "Invalid patient id prefix",
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("'{}': {}", config.logging.level, e))
                },
                error_message: "Invalid log level",
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &DeskConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("{}: {}", rule.error_message, e));
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
