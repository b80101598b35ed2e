//! 申请管理器
//!
//! 持有当前视图加载的申请集合，负责守护状态转换并与远端记录系统对账。
//! 转换先在本地乐观生效，远端确认失败时恢复转换前的完整快照。

use crate::state_machine::{RequestAction, RequestStateMachine};
use async_trait::async_trait;
use medsupply_core::{MedSupplyError, NewRequest, Request, RequestStatus, Result};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// 申请查询范围
///
/// 管理员查看全部申请，普通用户只查看自己发起的申请。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestScope {
    All,
    Mine,
}

/// 远端记录系统接口
///
/// 申请数据的唯一权威来源；本地集合只是当前视图的工作副本。
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// 按范围拉取申请列表
    async fn fetch_requests(&self, scope: RequestScope) -> Result<Vec<Request>>;

    /// 提交状态变更
    async fn update_status(&self, id: Uuid, status: RequestStatus) -> Result<()>;

    /// 创建新申请（初始状态为待处理）
    async fn create_request(&self, new: &NewRequest) -> Result<Request>;
}

/// 申请管理器
pub struct RequestManager {
    store: Arc<dyn RequestStore>,
    state_machine: RequestStateMachine,
    /// 活跃视图集合：终态申请在转换成功后即被移除
    requests: RwLock<Vec<Request>>,
    /// 转换进行中的申请，拒绝同一申请的并发转换
    in_flight: Mutex<HashSet<Uuid>>,
}

/// 在途转换守卫，释放时将申请移出在途集合
struct InFlightGuard<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut set) = self.set.lock() {
            set.remove(&self.id);
        }
    }
}

impl RequestManager {
    /// 创建新的申请管理器
    pub fn new(store: Arc<dyn RequestStore>) -> Self {
        Self {
            store,
            state_machine: RequestStateMachine::new(),
            requests: RwLock::new(Vec::new()),
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    /// 从远端加载申请集合，替换本地视图
    pub async fn load(&self, scope: RequestScope) -> Result<()> {
        let fetched = self.store.fetch_requests(scope).await?;
        info!("Loaded {} requests from backend", fetched.len());

        let mut requests = self.requests.write().await;
        *requests = fetched;
        Ok(())
    }

    /// 创建新申请并加入本地集合
    pub async fn create(&self, new: &NewRequest) -> Result<Request> {
        let created = self.store.create_request(new).await?;
        info!("Created request {} for patient {}", created.id, created.patient_id);

        let mut requests = self.requests.write().await;
        requests.push(created.clone());
        Ok(created)
    }

    /// 批准：待处理 -> 备妥待取
    pub async fn approve(&self, id: Uuid) -> Result<RequestStatus> {
        self.transition(id, RequestAction::Approve).await
    }

    /// 拒绝：待处理 -> 已拒绝，申请移出活跃视图
    pub async fn reject(&self, id: Uuid) -> Result<RequestStatus> {
        self.transition(id, RequestAction::Reject).await
    }

    /// 完成领取：备妥待取 -> 已完成，申请移出活跃视图
    pub async fn complete(&self, id: Uuid) -> Result<RequestStatus> {
        self.transition(id, RequestAction::Complete).await
    }

    /// 退回待处理：备妥待取 -> 待处理
    pub async fn reopen(&self, id: Uuid) -> Result<RequestStatus> {
        self.transition(id, RequestAction::Reopen).await
    }

    /// 获取当前集合的快照
    pub async fn requests(&self) -> Vec<Request> {
        self.requests.read().await.clone()
    }

    /// 活跃耗材汇总
    pub async fn active_summary(&self) -> Vec<crate::summary::ItemTotal> {
        let requests = self.requests.read().await;
        crate::summary::active_item_summary(&requests)
    }

    /// 申请数量统计
    pub async fn stats(&self) -> crate::views::RequestStats {
        let requests = self.requests.read().await;
        crate::views::request_stats(&requests)
    }

    /// 乐观更新协议
    ///
    /// 1. 占用该申请的在途守卫；
    /// 2. 用状态机校验转换；
    /// 3. 保存集合快照后在本地生效（终态目标则整体移出视图）；
    /// 4. 提交远端，失败时恢复完整快照并上报错误。
    ///
    /// 持有写锁期间不做网络往返。
    async fn transition(&self, id: Uuid, action: RequestAction) -> Result<RequestStatus> {
        let _guard = self.acquire_in_flight(id)?;

        let (snapshot, target) = {
            let mut requests = self.requests.write().await;
            let current = requests
                .iter()
                .find(|r| r.id == id)
                .map(|r| r.status)
                .ok_or_else(|| MedSupplyError::NotFound(format!("Request {} not found", id)))?;

            let target = self.state_machine.apply(current, &action)?;
            let snapshot = requests.clone();

            if target.is_terminal() {
                requests.retain(|r| r.id != id);
            } else if let Some(request) = requests.iter_mut().find(|r| r.id == id) {
                request.status = target;
            }

            (snapshot, target)
        };

        match self.store.update_status(id, target).await {
            Ok(()) => {
                info!("Request {} transitioned to {:?}", id, target);
                Ok(target)
            }
            Err(e) => {
                let mut requests = self.requests.write().await;
                *requests = snapshot;
                warn!("Transition of request {} to {:?} failed, rolled back: {}", id, target, e);
                Err(e)
            }
        }
    }

    fn acquire_in_flight(&self, id: Uuid) -> Result<InFlightGuard<'_>> {
        let mut set = self
            .in_flight
            .lock()
            .map_err(|_| MedSupplyError::Internal("In-flight set poisoned".to_string()))?;

        if !set.insert(id) {
            return Err(MedSupplyError::TransitionInFlight(id.to_string()));
        }

        Ok(InFlightGuard {
            set: &self.in_flight,
            id,
        })
    }
}
