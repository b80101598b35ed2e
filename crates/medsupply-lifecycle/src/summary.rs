//! 活跃耗材汇总
//!
//! 对待处理与备妥待取申请的全部明细行做按耗材名的数量聚合

use medsupply_core::Request;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 单个耗材的汇总数量
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemTotal {
    pub name: String,
    pub quantity: u64,
}

/// 计算活跃申请的耗材汇总
///
/// 只统计活跃申请（待处理、备妥待取），按耗材名累加数量。
/// 结果按数量降序排列，数量相同的保持首次出现的顺序（稳定排序）。
/// 集合规模为几十到几百条申请，每次全量重算即可。
pub fn active_item_summary(requests: &[Request]) -> Vec<ItemTotal> {
    let mut totals: Vec<ItemTotal> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for request in requests.iter().filter(|r| r.is_active()) {
        for line in &request.lines {
            match index.get(&line.item_name) {
                Some(&i) => totals[i].quantity += u64::from(line.quantity),
                None => {
                    index.insert(line.item_name.clone(), totals.len());
                    totals.push(ItemTotal {
                        name: line.item_name.clone(),
                        quantity: u64::from(line.quantity),
                    });
                }
            }
        }
    }

    totals.sort_by(|a, b| b.quantity.cmp(&a.quantity));
    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use medsupply_core::{RequestLine, RequestStatus};
    use uuid::Uuid;

    fn request_with(status: RequestStatus, lines: Vec<(&str, u32)>) -> Request {
        Request {
            id: Uuid::new_v4(),
            patient_id: Uuid::new_v4(),
            patient_name: "Juan Pérez".to_string(),
            requester_id: Uuid::new_v4(),
            requester_name: "Enf. Clara".to_string(),
            status,
            created_at: Utc::now(),
            completed_at: None,
            lines: lines
                .into_iter()
                .map(|(name, quantity)| RequestLine {
                    item_id: Uuid::new_v4(),
                    item_name: name.to_string(),
                    quantity,
                })
                .collect(),
        }
    }

    #[test]
    fn test_summary_excludes_terminal_requests() {
        let requests = vec![
            request_with(RequestStatus::Pending, vec![("Gauze", 5)]),
            request_with(RequestStatus::Ready, vec![("Gauze", 3), ("Syringe", 2)]),
            request_with(RequestStatus::Completed, vec![("Syringe", 100)]),
        ];

        let summary = active_item_summary(&requests);
        assert_eq!(
            summary,
            vec![
                ItemTotal {
                    name: "Gauze".to_string(),
                    quantity: 8
                },
                ItemTotal {
                    name: "Syringe".to_string(),
                    quantity: 2
                },
            ]
        );
    }

    #[test]
    fn test_summary_ties_keep_discovery_order() {
        let requests = vec![
            request_with(RequestStatus::Pending, vec![("Vendas", 10), ("Alcohol", 10)]),
            request_with(RequestStatus::Ready, vec![("Mascarillas", 30)]),
        ];

        let summary = active_item_summary(&requests);
        let names: Vec<&str> = summary.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Mascarillas", "Vendas", "Alcohol"]);
    }

    #[test]
    fn test_summary_of_empty_collection() {
        assert!(active_item_summary(&[]).is_empty());

        let requests = vec![request_with(RequestStatus::Rejected, vec![("Gasas", 5)])];
        assert!(active_item_summary(&requests).is_empty());
    }
}
