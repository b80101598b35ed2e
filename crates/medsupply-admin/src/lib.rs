//! # MedSupply 管理模块
//!
//! 提供配置加载与验证等运维功能

pub mod config;

pub use config::{AppConfig, AuthSettings, BackendSettings, DashboardSettings, LoggingSettings};
