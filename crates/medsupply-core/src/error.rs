//! 错误定义模块

use thiserror::Error;

/// 耗材管理系统统一错误类型
#[derive(Error, Debug)]
pub enum MedSupplyError {
    #[error("配置错误: {0}")]
    Config(String),

    #[error("后端服务错误: {0}")]
    Backend(String),

    #[error("网络错误: {0}")]
    Network(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("验证错误: {0}")]
    Validation(String),

    #[error("权限错误: {0}")]
    Permission(String),

    #[error("系统内部错误: {0}")]
    Internal(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("无效状态转换: 从 {from} 执行 {action}")]
    InvalidStateTransition { from: String, action: String },

    #[error("申请 {0} 的状态变更正在处理中")]
    TransitionInFlight(String),
}

/// 耗材管理系统统一结果类型
pub type Result<T> = std::result::Result<T, MedSupplyError>;
