//! 配置管理
//!
//! 从配置文件与 `MEDSUPPLY_` 前缀的环境变量加载应用配置，并在使用前验证

use config::{Config, Environment, File};
use medsupply_core::{MedSupplyError, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

/// 应用完整配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// 后端服务配置
    #[serde(default)]
    pub backend: BackendSettings,
    /// 认证配置
    #[serde(default)]
    pub auth: AuthSettings,
    /// 日志配置
    #[serde(default)]
    pub logging: LoggingSettings,
    /// 仪表盘配置
    #[serde(default)]
    pub dashboard: DashboardSettings,
}

/// 后端服务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    /// REST 记录系统地址
    pub endpoint: String,
    /// 请求超时（秒）
    pub request_timeout_secs: u64,
}

/// 认证配置
///
/// 凭证在这里显式配置并向下传递，组件不读取全局会话状态。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AuthSettings {
    /// Bearer 凭证
    pub token: Option<String>,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// 日志级别过滤表达式
    pub level: String,
}

/// 仪表盘配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// 列表每页条数
    pub page_size: usize,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3001/api".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self { page_size: 50 }
    }
}

impl AppConfig {
    /// 加载配置
    ///
    /// 配置文件可选；环境变量（如 `MEDSUPPLY_BACKEND_ENDPOINT`）覆盖文件值。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path));
        }

        let settings = builder
            .add_source(Environment::with_prefix("MEDSUPPLY").separator("_"))
            .build()
            .map_err(|e| MedSupplyError::Config(e.to_string()))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| MedSupplyError::Config(e.to_string()))?;

        config.validate()?;
        info!("Configuration loaded (source: {})", config_path.unwrap_or("defaults"));
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> Result<()> {
        if self.backend.endpoint.is_empty() {
            return Err(MedSupplyError::Config(
                "Backend endpoint cannot be empty".to_string(),
            ));
        }

        if !self.backend.endpoint.starts_with("http://")
            && !self.backend.endpoint.starts_with("https://")
        {
            return Err(MedSupplyError::Config(format!(
                "Backend endpoint must be an http(s) URL: {}",
                self.backend.endpoint
            )));
        }

        if self.backend.request_timeout_secs == 0 {
            return Err(MedSupplyError::Config(
                "Request timeout cannot be 0".to_string(),
            ));
        }

        if self.dashboard.page_size == 0 {
            return Err(MedSupplyError::Config(
                "Dashboard page size cannot be 0".to_string(),
            ));
        }

        Ok(())
    }
}
