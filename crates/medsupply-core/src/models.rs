//! 核心数据模型定义

use crate::error::{MedSupplyError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 申请状态
///
/// 后端接口使用的状态词汇与本地状态的映射关系：
/// `PENDING↔Pending`、`APPROVED↔Ready`、`REJECTED↔Rejected`、`COMPLETED↔Completed`。
/// 所有出入口必须通过 [`RequestStatus::wire_name`] 与 [`TryFrom<&str>`] 转换。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum RequestStatus {
    Pending,   // 待处理
    Ready,     // 备妥待取
    Rejected,  // 已拒绝
    Completed, // 已完成
}

impl RequestStatus {
    /// 是否为终态（终态不再接受任何状态转换）
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// 后端接口使用的状态名
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Ready => "APPROVED",
            Self::Rejected => "REJECTED",
            Self::Completed => "COMPLETED",
        }
    }

    /// 所有状态
    pub fn all() -> Vec<RequestStatus> {
        vec![Self::Pending, Self::Ready, Self::Rejected, Self::Completed]
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = MedSupplyError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "PENDING" => Ok(Self::Pending),
            "APPROVED" => Ok(Self::Ready),
            "REJECTED" => Ok(Self::Rejected),
            "COMPLETED" => Ok(Self::Completed),
            _ => Err(MedSupplyError::Validation(format!(
                "Unknown request status: {}",
                value
            ))),
        }
    }
}

/// 申请明细行：一个耗材与申请数量
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestLine {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: u32,
}

/// 耗材领用申请
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Request {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub requester_id: Uuid,
    pub requester_name: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    /// 仅在转入已完成状态时由后端写入
    pub completed_at: Option<DateTime<Utc>>,
    pub lines: Vec<RequestLine>,
}

impl Request {
    /// 是否为活跃申请（待处理或备妥待取）
    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

/// 新建申请的载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewRequest {
    pub patient_id: Uuid,
    pub lines: Vec<RequestLine>,
}

impl NewRequest {
    /// 创建新申请载荷并校验明细行
    ///
    /// 明细行不能为空，数量必须大于零，同一耗材最多出现一次。
    pub fn new(patient_id: Uuid, lines: Vec<RequestLine>) -> Result<Self> {
        if lines.is_empty() {
            return Err(MedSupplyError::Validation(
                "Request must contain at least one line".to_string(),
            ));
        }

        for line in &lines {
            if line.quantity == 0 {
                return Err(MedSupplyError::Validation(format!(
                    "Quantity for item {} must be positive",
                    line.item_name
                )));
            }
        }

        for (i, line) in lines.iter().enumerate() {
            if lines[..i].iter().any(|l| l.item_id == line.item_id) {
                return Err(MedSupplyError::Validation(format!(
                    "Item {} appears more than once",
                    line.item_name
                )));
            }
        }

        Ok(Self { patient_id, lines })
    }
}

/// 库存状态（派生值，不持久化）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StockStatus {
    Available, // 可用
    LowStock,  // 库存不足
    Expired,   // 已过期
}

/// 库存耗材
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity_in_stock: i32,
    pub low_stock_threshold: i32,
    pub expiry_date: Option<NaiveDate>,
}

impl InventoryItem {
    /// 派生库存状态
    ///
    /// 判断顺序不可调换：过期或零库存优先于库存不足。
    pub fn stock_status(&self, today: NaiveDate) -> StockStatus {
        let expired = self
            .expiry_date
            .map(|date| date < today)
            .unwrap_or(false);

        if expired || self.quantity_in_stock <= 0 {
            StockStatus::Expired
        } else if self.quantity_in_stock < self.low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::Available
        }
    }
}

/// 用户角色
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserRole {
    Admin,   // 管理员
    Manager, // 库存主管
    Nurse,   // 护士
}

impl UserRole {
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Admin => "ADMIN",
            Self::Manager => "MANAGER",
            Self::Nurse => "NURSE",
        }
    }
}

impl TryFrom<&str> for UserRole {
    type Error = MedSupplyError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "ADMIN" => Ok(Self::Admin),
            "MANAGER" => Ok(Self::Manager),
            "NURSE" => Ok(Self::Nurse),
            _ => Err(MedSupplyError::Validation(format!(
                "Unknown user role: {}",
                value
            ))),
        }
    }
}

/// 系统用户
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

/// 患者信息
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Patient {
    pub id: Uuid,
    pub name: String,
    pub record_number: String, // 医院内部病历号
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn line(name: &str, quantity: u32) -> RequestLine {
        RequestLine {
            item_id: Uuid::new_v4(),
            item_name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_status_wire_round_trip() {
        for status in RequestStatus::all() {
            let mapped = RequestStatus::try_from(status.wire_name()).unwrap();
            assert_eq!(mapped, status);
        }
    }

    #[test]
    fn test_status_wire_mapping() {
        assert_eq!(RequestStatus::Ready.wire_name(), "APPROVED");
        assert_eq!(
            RequestStatus::try_from("APPROVED").unwrap(),
            RequestStatus::Ready
        );
        assert!(RequestStatus::try_from("approved").is_err());
        assert!(RequestStatus::try_from("UNKNOWN").is_err());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(!RequestStatus::Ready.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
        assert!(RequestStatus::Completed.is_terminal());
    }

    #[test]
    fn test_new_request_validation() {
        let patient_id = Uuid::new_v4();

        assert!(NewRequest::new(patient_id, vec![]).is_err());
        assert!(NewRequest::new(patient_id, vec![line("Gasas", 0)]).is_err());

        let duplicate = line("Jeringas", 5);
        let mut other = duplicate.clone();
        other.quantity = 3;
        assert!(NewRequest::new(patient_id, vec![duplicate, other]).is_err());

        let valid = NewRequest::new(patient_id, vec![line("Jeringas", 5), line("Gasas", 10)]);
        assert!(valid.is_ok());
    }

    #[test]
    fn test_stock_status_zero_stock_is_expired() {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: "Alcohol Pad".to_string(),
            category: "Desinfección".to_string(),
            quantity_in_stock: 0,
            low_stock_threshold: 10,
            expiry_date: None,
        };
        let today = Utc::now().date_naive();
        assert_eq!(item.stock_status(today), StockStatus::Expired);
    }

    #[test]
    fn test_stock_status_low_stock() {
        let today = Utc::now().date_naive();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: "Guantes".to_string(),
            category: "Protección".to_string(),
            quantity_in_stock: 5,
            low_stock_threshold: 10,
            expiry_date: Some(today + Duration::days(30)),
        };
        assert_eq!(item.stock_status(today), StockStatus::LowStock);
    }

    #[test]
    fn test_stock_status_expiry_overrides_ample_stock() {
        let today = Utc::now().date_naive();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: "Mascarillas".to_string(),
            category: "Protección".to_string(),
            quantity_in_stock: 50,
            low_stock_threshold: 10,
            expiry_date: Some(today - Duration::days(1)),
        };
        assert_eq!(item.stock_status(today), StockStatus::Expired);
    }

    #[test]
    fn test_stock_status_available() {
        let today = Utc::now().date_naive();
        let item = InventoryItem {
            id: Uuid::new_v4(),
            name: "Gasas".to_string(),
            category: "Curación".to_string(),
            quantity_in_stock: 300,
            low_stock_threshold: 50,
            expiry_date: None,
        };
        assert_eq!(item.stock_status(today), StockStatus::Available);
    }
}
