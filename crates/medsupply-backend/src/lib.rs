//! # MedSupply 后端连接模块
//!
//! 提供与 REST 记录系统的集成功能，包括：
//! - 申请、库存、用户与患者接口的 HTTP 客户端
//! - 接口载荷（camelCase）与核心模型之间的转换
//! - 后端状态词汇与本地状态枚举的映射
//! - 按响应类别归类的错误转换（网络 / 4xx 校验 / 5xx）

pub mod client;
pub mod dto;

pub use client::{AuthenticationConfig, BackendClient, BackendConfig};
pub use dto::{ListEnvelope, NewRequestBody, RequestDto, StatusUpdateBody};
