//! MedSupply 终端仪表盘
//!
//! 将配置、日志、后端客户端与申请管理器装配为一个命令行仪表盘，
//! 每次调用执行一轮「加载-操作-输出」。

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use medsupply_admin::AppConfig;
use medsupply_backend::{AuthenticationConfig, BackendClient, BackendConfig};
use medsupply_core::{NewRequest, RequestLine, StockStatus};
use medsupply_lifecycle::{
    partition_by, query_requests, RequestFilter, RequestManager, RequestScope,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

/// 仪表盘命令行参数
#[derive(Parser, Debug)]
#[command(name = "medsupply-dashboard")]
#[command(about = "医院耗材领用申请仪表盘")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 后端服务地址（覆盖配置文件）
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Bearer 凭证（覆盖配置文件）
    #[arg(short, long)]
    token: Option<String>,

    /// 查看全部申请而不是自己的申请
    #[arg(long)]
    all: bool,

    /// 日志级别（覆盖配置文件）
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 申请列表
    List,
    /// 活跃耗材汇总
    Summary,
    /// 仪表盘指标
    Stats,
    /// 批准申请
    Approve { id: Uuid },
    /// 拒绝申请
    Reject { id: Uuid },
    /// 完成领取
    Complete { id: Uuid },
    /// 退回待处理
    Reopen { id: Uuid },
    /// 创建申请，--item 形如 <耗材ID>:<数量>，可重复
    Create {
        #[arg(long)]
        patient: Uuid,
        #[arg(long = "item")]
        items: Vec<String>,
    },
    /// 用户管理面板
    Users,
    /// 停用用户
    DeactivateUser { id: Uuid },
    /// 重新启用用户
    ReactivateUser { id: Uuid },
    /// 患者管理面板
    Patients,
    /// 停用患者
    DeactivatePatient { id: Uuid },
    /// 重新启用患者
    ReactivatePatient { id: Uuid },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 加载配置并应用命令行覆盖
    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(endpoint) = args.endpoint {
        config.backend.endpoint = endpoint;
    }
    if let Some(token) = args.token {
        config.auth.token = Some(token);
    }
    config.validate()?;

    // 初始化日志，命令行级别优先于配置文件
    let log_level = effective_log_level(args.log_level.as_deref(), &config.logging.level);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&log_level))
        .init();

    let authentication = match &config.auth.token {
        Some(token) => AuthenticationConfig::BearerToken {
            token: token.clone(),
        },
        None => AuthenticationConfig::None,
    };

    let mut backend_config =
        BackendConfig::new(config.backend.endpoint.clone(), authentication);
    backend_config.request_timeout = Duration::from_secs(config.backend.request_timeout_secs);

    let client = Arc::new(BackendClient::new(backend_config)?);
    let manager = RequestManager::new(client.clone());

    let scope = if args.all {
        RequestScope::All
    } else {
        RequestScope::Mine
    };

    info!("Dashboard started against {}", config.backend.endpoint);

    match args.command {
        Command::List => {
            manager.load(scope).await?;
            let filter = RequestFilter {
                limit: Some(config.dashboard.page_size),
                ..Default::default()
            };
            let requests = query_requests(&manager.requests().await, &filter);

            println!("📋 申请列表（{} 条）", requests.len());
            for request in requests {
                println!(
                    "  {}  {:?}  患者: {}  申请人: {}  {} 项耗材  {}",
                    request.id,
                    request.status,
                    request.patient_name,
                    request.requester_name,
                    request.lines.len(),
                    request.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        Command::Summary => {
            manager.load(scope).await?;
            let summary = manager.active_summary().await;

            println!("📦 活跃耗材汇总（待处理 + 备妥待取）");
            if summary.is_empty() {
                println!("  当前没有待批准或待领取的耗材");
            }
            for total in summary {
                println!("  {:<30} {}", total.name, total.quantity);
            }
        }
        Command::Stats => {
            manager.load(scope).await?;
            let stats = manager.stats().await;

            let inventory = client.fetch_inventory().await?;
            let today = chrono::Utc::now().date_naive();
            let low_stock = inventory
                .iter()
                .filter(|i| i.stock_status(today) == StockStatus::LowStock)
                .count();
            let expired = inventory
                .iter()
                .filter(|i| i.stock_status(today) == StockStatus::Expired)
                .count();

            println!("📊 仪表盘指标:");
            println!("  待处理申请: {}", stats.pending_requests);
            println!("  备妥待取申请: {}", stats.ready_requests);
            println!("  库存不足耗材: {}", low_stock);
            println!("  过期/零库存耗材: {}", expired);
        }
        Command::Approve { id } => {
            manager.load(scope).await?;
            let status = manager.approve(id).await?;
            println!("✅ 申请 {} 已批准，当前状态 {:?}", id, status);
        }
        Command::Reject { id } => {
            manager.load(scope).await?;
            manager.reject(id).await?;
            println!("❌ 申请 {} 已拒绝", id);
        }
        Command::Complete { id } => {
            manager.load(scope).await?;
            manager.complete(id).await?;
            println!("📦 申请 {} 领取完成", id);
        }
        Command::Reopen { id } => {
            manager.load(scope).await?;
            let status = manager.reopen(id).await?;
            println!("🔄 申请 {} 已退回，当前状态 {:?}", id, status);
        }
        Command::Create { patient, items } => {
            let inventory = client.fetch_inventory().await?;

            let mut lines = Vec::new();
            for spec in &items {
                let (item_id, quantity) = parse_item_spec(spec)?;
                let item = inventory
                    .iter()
                    .find(|i| i.id == item_id)
                    .ok_or_else(|| anyhow!("库存中不存在耗材 {}", item_id))?;
                lines.push(RequestLine {
                    item_id,
                    item_name: item.name.clone(),
                    quantity,
                });
            }

            let new = NewRequest::new(patient, lines)?;
            let created = manager.create(&new).await?;
            println!("📝 已创建申请 {}（状态 {:?}）", created.id, created.status);
        }
        Command::Users => {
            let users = client.fetch_users().await?;
            let (active, inactive) = partition_by(&users, |u| u.is_active);

            println!("👥 活跃用户（{} 人）", active.len());
            for user in &active {
                println!("  {}  {}  {:?}", user.name, user.email, user.role);
            }
            println!("🚫 停用用户（{} 人）", inactive.len());
            for user in &inactive {
                println!("  {}  {}  {:?}", user.name, user.email, user.role);
            }
        }
        Command::DeactivateUser { id } => {
            client.deactivate_user(id).await?;
            println!("🚫 用户 {} 已停用", id);
        }
        Command::ReactivateUser { id } => {
            client.reactivate_user(id).await?;
            println!("✅ 用户 {} 已重新启用", id);
        }
        Command::Patients => {
            let patients = client.fetch_patients().await?;
            let (active, inactive) = partition_by(&patients, |p| p.is_active);

            println!("🏥 活跃患者（{} 人）", active.len());
            for patient in &active {
                println!("  {}  病历号 {}", patient.name, patient.record_number);
            }
            println!("🚫 停用患者（{} 人）", inactive.len());
            for patient in &inactive {
                println!("  {}  病历号 {}", patient.name, patient.record_number);
            }
        }
        Command::DeactivatePatient { id } => {
            client.deactivate_patient(id).await?;
            println!("🚫 患者 {} 已停用", id);
        }
        Command::ReactivatePatient { id } => {
            client.reactivate_patient(id).await?;
            println!("✅ 患者 {} 已重新启用", id);
        }
    }

    Ok(())
}

/// 生效的日志级别，命令行覆盖配置文件
fn effective_log_level(cli: Option<&str>, configured: &str) -> String {
    cli.unwrap_or(configured).to_string()
}

/// 解析 `<耗材ID>:<数量>` 形式的参数
fn parse_item_spec(spec: &str) -> anyhow::Result<(Uuid, u32)> {
    let (id, quantity) = spec
        .split_once(':')
        .ok_or_else(|| anyhow!("耗材参数格式应为 <耗材ID>:<数量>: {}", spec))?;

    let id = Uuid::parse_str(id).with_context(|| format!("无效的耗材ID: {}", id))?;
    let quantity: u32 = quantity
        .parse()
        .with_context(|| format!("无效的数量: {}", quantity))?;

    Ok((id, quantity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_log_level_prefers_cli_over_config() {
        assert_eq!(effective_log_level(Some("debug"), "info"), "debug");
        assert_eq!(effective_log_level(None, "warn"), "warn");
    }

    #[test]
    fn test_parse_item_spec() {
        let id = Uuid::new_v4();
        let parsed = parse_item_spec(&format!("{}:25", id)).unwrap();
        assert_eq!(parsed, (id, 25));

        assert!(parse_item_spec("not-a-uuid:5").is_err());
        assert!(parse_item_spec("missing-quantity").is_err());
    }
}
