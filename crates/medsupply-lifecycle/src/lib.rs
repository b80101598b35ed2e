//! # MedSupply 申请生命周期模块
//!
//! 提供耗材领用申请的完整生命周期管理功能，包括：
//! - 申请状态机：以封闭转换表守护状态变更
//! - 申请管理器：本地乐观更新与远端系统对账，失败时整体回滚
//! - 活跃耗材汇总：对待处理与备妥申请的明细行做聚合统计
//! - 集合视图：活跃/停用二分、过滤与分页

pub mod manager;
pub mod state_machine;
pub mod summary;
pub mod views;

// 重新导出主要类型
pub use manager::{RequestManager, RequestScope, RequestStore};
pub use state_machine::{RequestAction, RequestStateMachine};
pub use summary::{active_item_summary, ItemTotal};
pub use views::{partition_by, query_requests, request_stats, RequestFilter, RequestStats};
