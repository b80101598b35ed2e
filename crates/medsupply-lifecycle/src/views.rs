//! 集合视图
//!
//! 提供页面渲染所需的派生视图：活跃/停用二分、申请过滤与分页、数量统计。
//! 所有视图都从内存集合按需重算，不单独向后端取数。

use medsupply_core::{Request, RequestStatus};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 按谓词将集合划分为两个互不相交的子集
///
/// 用户与患者页面的「活跃/停用」双面板都用这一划分：两个子集同时持有，
/// 切换面板不丢失另一侧的数据。
pub fn partition_by<T: Clone, F>(items: &[T], predicate: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> bool,
{
    let mut matched = Vec::new();
    let mut rest = Vec::new();

    for item in items {
        if predicate(item) {
            matched.push(item.clone());
        } else {
            rest.push(item.clone());
        }
    }

    (matched, rest)
}

/// 申请列表过滤器
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestFilter {
    pub status: Option<Vec<RequestStatus>>,
    pub patient_id: Option<Uuid>,
    pub requester_id: Option<Uuid>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl Default for RequestFilter {
    fn default() -> Self {
        Self {
            status: None,
            patient_id: None,
            requester_id: None,
            limit: Some(50),
            offset: Some(0),
        }
    }
}

/// 查询申请列表
///
/// 按创建时间升序（最早的申请排在最前），再做截断分页。
pub fn query_requests(requests: &[Request], filter: &RequestFilter) -> Vec<Request> {
    let mut items: Vec<&Request> = requests.iter().collect();

    if let Some(statuses) = &filter.status {
        items.retain(|r| statuses.contains(&r.status));
    }

    if let Some(patient_id) = filter.patient_id {
        items.retain(|r| r.patient_id == patient_id);
    }

    if let Some(requester_id) = filter.requester_id {
        items.retain(|r| r.requester_id == requester_id);
    }

    items.sort_by(|a, b| a.created_at.cmp(&b.created_at));

    let offset = filter.offset.unwrap_or(0);
    let limit = filter.limit.unwrap_or(50);

    let total = items.len();
    let start = offset.min(total);
    let end = (start + limit).min(total);

    items[start..end].iter().map(|r| (*r).clone()).collect()
}

/// 申请数量统计（仪表盘指标卡数据）
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestStats {
    pub total_requests: usize,
    pub pending_requests: usize,
    pub ready_requests: usize,
}

/// 统计集合中各状态的申请数量
pub fn request_stats(requests: &[Request]) -> RequestStats {
    let mut stats = RequestStats {
        total_requests: requests.len(),
        pending_requests: 0,
        ready_requests: 0,
    };

    for request in requests {
        match request.status {
            RequestStatus::Pending => stats.pending_requests += 1,
            RequestStatus::Ready => stats.ready_requests += 1,
            _ => {}
        }
    }

    stats
}
