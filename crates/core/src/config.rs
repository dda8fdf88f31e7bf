use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::{NotifierError, NotifierResult};

/// 系统配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    pub database: DatabaseConfig,
    pub engine: EngineConfig,
    pub email: EmailConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connection_timeout_seconds: u64,
}

/// 引擎调度参数
///
/// 前置条件：外部调用方（cron守护进程等）必须以小于
/// `dedup_window_minutes` 的间隔触发评估，否则整点类CRON的
/// 触发可能落在去重窗口之外被漏掉。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// 去重窗口（分钟）：同一触发器在窗口内最多成功执行一次
    pub dedup_window_minutes: i64,
    /// 单次派发内并行投递的收件人上限
    pub max_concurrent_deliveries: usize,
    /// 单个收件人的投递超时（秒），超时计为失败
    pub delivery_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// 发送方式: "log"（仅记录日志）或 "http"（HTTP邮件中继）
    pub mode: String,
    /// HTTP中继地址，mode = "http" 时必填
    pub relay_endpoint: Option<String>,
    pub from_address: String,
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub bind_address: String,
    pub cors_enabled: bool,
    pub cors_origins: Vec<String>,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite:notifier.db".to_string(),
                max_connections: 5,
                min_connections: 1,
                connection_timeout_seconds: 30,
            },
            engine: EngineConfig {
                dedup_window_minutes: 60,
                max_concurrent_deliveries: 16,
                delivery_timeout_seconds: 10,
            },
            email: EmailConfig {
                mode: "log".to_string(),
                relay_endpoint: None,
                from_address: "noreply@achievements.local".to_string(),
                request_timeout_seconds: 10,
            },
            api: ApiConfig {
                bind_address: "0.0.0.0:8080".to_string(),
                cors_enabled: true,
                cors_origins: vec!["*".to_string()],
            },
        }
    }
}

impl NotifierConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序：
    /// 1. 默认配置
    /// 2. TOML配置文件
    /// 3. 环境变量覆盖（前缀: NOTIFIER_）
    pub fn load(config_path: Option<&str>) -> NotifierResult<Self> {
        let defaults = Self::default();
        let mut builder = ConfigBuilder::builder()
            .add_source(config::Config::try_from(&defaults).map_err(|e| {
                NotifierError::Configuration(format!("构造默认配置失败: {e}"))
            })?);

        if let Some(path) = config_path {
            if !Path::new(path).exists() {
                return Err(NotifierError::Configuration(format!(
                    "配置文件不存在: {path}"
                )));
            }
            builder = builder.add_source(File::new(path, FileFormat::Toml));
        } else {
            // 尝试默认路径，找不到就全部使用默认值
            for path in ["config/notifier.toml", "notifier.toml"] {
                if Path::new(path).exists() {
                    builder = builder.add_source(File::new(path, FileFormat::Toml));
                    break;
                }
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("NOTIFIER")
                .separator("_")
                .try_parsing(true),
        );

        let config: NotifierConfig = builder
            .build()
            .map_err(|e| NotifierError::Configuration(format!("加载配置失败: {e}")))?
            .try_deserialize()
            .map_err(|e| NotifierError::Configuration(format!("解析配置失败: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// 校验配置的合法性
    pub fn validate(&self) -> NotifierResult<()> {
        if self.database.url.is_empty() {
            return Err(NotifierError::Configuration(
                "database.url 不能为空".to_string(),
            ));
        }
        if self.database.max_connections == 0
            || self.database.max_connections < self.database.min_connections
        {
            return Err(NotifierError::Configuration(
                "database 连接池大小配置无效".to_string(),
            ));
        }
        if self.engine.dedup_window_minutes <= 0 {
            return Err(NotifierError::Configuration(
                "engine.dedup_window_minutes 必须大于0".to_string(),
            ));
        }
        if self.engine.max_concurrent_deliveries == 0 {
            return Err(NotifierError::Configuration(
                "engine.max_concurrent_deliveries 必须大于0".to_string(),
            ));
        }
        if self.engine.delivery_timeout_seconds == 0 {
            return Err(NotifierError::Configuration(
                "engine.delivery_timeout_seconds 必须大于0".to_string(),
            ));
        }
        match self.email.mode.as_str() {
            "log" => {}
            "http" => {
                if self.email.relay_endpoint.is_none() {
                    return Err(NotifierError::Configuration(
                        "email.mode 为 http 时必须配置 email.relay_endpoint".to_string(),
                    ));
                }
            }
            other => {
                return Err(NotifierError::Configuration(format!(
                    "不支持的邮件发送方式: {other}"
                )));
            }
        }
        if self.api.bind_address.is_empty() {
            return Err(NotifierError::Configuration(
                "api.bind_address 不能为空".to_string(),
            ));
        }
        Ok(())
    }
}
