//! 申请状态机
//!
//! 管理耗材领用申请的完整生命周期状态转换

use medsupply_core::{MedSupplyError, RequestStatus, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 申请状态转换动作
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestAction {
    Approve,  // 批准：待处理 -> 备妥待取
    Reject,   // 拒绝：待处理 -> 已拒绝（终态，不可恢复）
    Complete, // 完成领取：备妥待取 -> 已完成
    Reopen,   // 退回待处理：备妥待取 -> 待处理（唯一的回退转换）
}

/// 申请状态机
///
/// 终态（已拒绝、已完成）没有任何出边；对终态申请执行任何动作都会被拒绝。
#[derive(Debug)]
pub struct RequestStateMachine {
    transitions: HashMap<(RequestStatus, RequestAction), RequestStatus>,
}

impl RequestStateMachine {
    /// 创建新的状态机实例
    pub fn new() -> Self {
        let mut transitions = HashMap::new();

        // 定义状态转换规则
        transitions.insert(
            (RequestStatus::Pending, RequestAction::Approve),
            RequestStatus::Ready,
        );
        transitions.insert(
            (RequestStatus::Pending, RequestAction::Reject),
            RequestStatus::Rejected,
        );
        transitions.insert(
            (RequestStatus::Ready, RequestAction::Complete),
            RequestStatus::Completed,
        );
        transitions.insert(
            (RequestStatus::Ready, RequestAction::Reopen),
            RequestStatus::Pending,
        );

        Self { transitions }
    }

    /// 检查状态转换是否有效
    pub fn can_apply(&self, from: RequestStatus, action: &RequestAction) -> bool {
        self.transitions.contains_key(&(from, action.clone()))
    }

    /// 执行状态转换
    pub fn apply(&self, from: RequestStatus, action: &RequestAction) -> Result<RequestStatus> {
        match self.transitions.get(&(from, action.clone())) {
            Some(to) => Ok(*to),
            None => Err(MedSupplyError::InvalidStateTransition {
                from: format!("{:?}", from),
                action: format!("{:?}", action),
            }),
        }
    }

    /// 获取状态的所有可执行动作
    pub fn possible_actions(&self, current_status: RequestStatus) -> Vec<RequestAction> {
        self.transitions
            .keys()
            .filter(|(status, _)| *status == current_status)
            .map(|(_, action)| action.clone())
            .collect()
    }
}

impl Default for RequestStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
