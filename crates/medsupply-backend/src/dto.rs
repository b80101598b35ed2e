//! 接口载荷定义
//!
//! 后端接口使用 camelCase 字段与全大写状态词汇；本模块负责载荷与核心模型
//! 之间的双向转换，未知状态在入口处即被拒绝。

use chrono::{DateTime, NaiveDate, Utc};
use medsupply_core::{
    InventoryItem, MedSupplyError, NewRequest, Patient, Request, RequestLine, RequestStatus, User,
    UserRole,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 列表响应信封 `{ "data": [...] }`
#[derive(Debug, Deserialize)]
pub struct ListEnvelope<T> {
    pub data: Vec<T>,
}

/// 错误响应体 `{ "message": "..." }`
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub message: String,
}

/// 申请明细行载荷
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItemDto {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: u32,
}

/// 申请载荷
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDto {
    pub id: Uuid,
    pub patient_id: Uuid,
    pub patient_name: String,
    pub requester_id: Uuid,
    pub requester_name: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub items: Vec<RequestItemDto>,
}

impl TryFrom<RequestDto> for Request {
    type Error = MedSupplyError;

    fn try_from(dto: RequestDto) -> medsupply_core::Result<Self> {
        let status = RequestStatus::try_from(dto.status.as_str())?;

        Ok(Request {
            id: dto.id,
            patient_id: dto.patient_id,
            patient_name: dto.patient_name,
            requester_id: dto.requester_id,
            requester_name: dto.requester_name,
            status,
            created_at: dto.created_at,
            completed_at: dto.completed_at,
            lines: dto
                .items
                .into_iter()
                .map(|item| RequestLine {
                    item_id: item.item_id,
                    item_name: item.item_name,
                    quantity: item.quantity,
                })
                .collect(),
        })
    }
}

/// 状态变更请求体
#[derive(Debug, Serialize)]
pub struct StatusUpdateBody {
    pub status: String,
}

impl StatusUpdateBody {
    pub fn for_status(status: RequestStatus) -> Self {
        Self {
            status: status.wire_name().to_string(),
        }
    }
}

/// 新建申请请求体
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestBody {
    pub patient_id: Uuid,
    pub items: Vec<NewRequestItemBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRequestItemBody {
    pub item_id: Uuid,
    pub quantity: u32,
}

impl From<&NewRequest> for NewRequestBody {
    fn from(new: &NewRequest) -> Self {
        Self {
            patient_id: new.patient_id,
            items: new
                .lines
                .iter()
                .map(|line| NewRequestItemBody {
                    item_id: line.item_id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// 库存耗材载荷
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemDto {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub quantity_in_stock: i32,
    pub low_stock_threshold: i32,
    pub expiry_date: Option<NaiveDate>,
}

impl From<InventoryItemDto> for InventoryItem {
    fn from(dto: InventoryItemDto) -> Self {
        InventoryItem {
            id: dto.id,
            name: dto.name,
            category: dto.category,
            quantity_in_stock: dto.quantity_in_stock,
            low_stock_threshold: dto.low_stock_threshold,
            expiry_date: dto.expiry_date,
        }
    }
}

/// 用户载荷
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
}

impl TryFrom<UserDto> for User {
    type Error = MedSupplyError;

    fn try_from(dto: UserDto) -> medsupply_core::Result<Self> {
        Ok(User {
            id: dto.id,
            name: dto.name,
            email: dto.email,
            role: UserRole::try_from(dto.role.as_str())?,
            is_active: dto.is_active,
        })
    }
}

/// 患者载荷
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: Uuid,
    pub name: String,
    pub record_number: String,
    pub is_active: bool,
}

impl From<PatientDto> for Patient {
    fn from(dto: PatientDto) -> Self {
        Patient {
            id: dto.id,
            name: dto.name,
            record_number: dto.record_number,
            is_active: dto.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_dto_maps_approved_to_ready() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "patientId": Uuid::new_v4(),
            "patientName": "Juan Pérez",
            "requesterId": Uuid::new_v4(),
            "requesterName": "Enf. Clara",
            "status": "APPROVED",
            "createdAt": "2024-01-15T10:30:00Z",
            "completedAt": null,
            "items": [
                { "itemId": Uuid::new_v4(), "itemName": "Gasas Estériles", "quantity": 50 }
            ]
        });

        let dto: RequestDto = serde_json::from_value(json).unwrap();
        let request = Request::try_from(dto).unwrap();

        assert_eq!(request.status, RequestStatus::Ready);
        assert_eq!(request.lines.len(), 1);
        assert_eq!(request.lines[0].quantity, 50);
    }

    #[test]
    fn test_request_dto_rejects_unknown_status() {
        let json = serde_json::json!({
            "id": Uuid::new_v4(),
            "patientId": Uuid::new_v4(),
            "patientName": "Juan Pérez",
            "requesterId": Uuid::new_v4(),
            "requesterName": "Enf. Clara",
            "status": "READY",
            "createdAt": "2024-01-15T10:30:00Z",
            "completedAt": null,
            "items": []
        });

        let dto: RequestDto = serde_json::from_value(json).unwrap();
        assert!(Request::try_from(dto).is_err());
    }

    #[test]
    fn test_status_update_body_uses_wire_vocabulary() {
        let body = StatusUpdateBody::for_status(RequestStatus::Ready);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "APPROVED" }));
    }

    #[test]
    fn test_new_request_body_shape() {
        let item_id = Uuid::new_v4();
        let new = NewRequest::new(
            Uuid::new_v4(),
            vec![RequestLine {
                item_id,
                item_name: "Jeringas 5ml".to_string(),
                quantity: 20,
            }],
        )
        .unwrap();

        let body = NewRequestBody::from(&new);
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["items"][0]["itemId"], serde_json::json!(item_id));
        assert_eq!(json["items"][0]["quantity"], 20);
        assert!(json["items"][0].get("itemName").is_none());
    }
}
