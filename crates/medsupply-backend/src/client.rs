//! REST 后端客户端
//!
//! 与记录系统的唯一通信边界。所有失败在此归类为统一错误：
//! - 传输失败 → 网络错误
//! - 401/403 → 权限错误
//! - 其余 4xx 且带 `{message}` 响应体 → 校验错误，原文透传给调用方
//! - 5xx 或响应体不可解析 → 通用后端错误

use crate::dto::{
    ErrorBody, InventoryItemDto, ListEnvelope, NewRequestBody, PatientDto, RequestDto,
    StatusUpdateBody, UserDto,
};
use async_trait::async_trait;
use medsupply_core::{
    InventoryItem, MedSupplyError, NewRequest, Patient, Request, RequestStatus, Result, User,
};
use medsupply_lifecycle::{RequestScope, RequestStore};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// 认证配置
#[derive(Debug, Clone)]
pub enum AuthenticationConfig {
    None,
    BasicAuth { username: String, password: String },
    ApiKey { key: String, header: Option<String> },
    BearerToken { token: String },
}

/// 后端连接配置
///
/// 凭证通过配置显式传入，不读取任何全局环境。
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub endpoint: String,
    pub authentication: AuthenticationConfig,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(endpoint: String, authentication: AuthenticationConfig) -> Self {
        Self {
            endpoint,
            authentication,
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// REST 后端客户端
pub struct BackendClient {
    config: BackendConfig,
    client: reqwest::Client,
}

impl BackendClient {
    /// 创建新的后端客户端
    pub fn new(config: BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| MedSupplyError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// 检查后端连通性
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/health", self.config.endpoint);
        let request = Self::add_auth_headers(self.client.get(&url), &self.config.authentication);

        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// 拉取库存耗材列表
    pub async fn fetch_inventory(&self) -> Result<Vec<InventoryItem>> {
        let dtos: Vec<InventoryItemDto> = self.get_list("/items").await?;
        Ok(dtos.into_iter().map(InventoryItem::from).collect())
    }

    /// 拉取用户列表
    pub async fn fetch_users(&self) -> Result<Vec<User>> {
        let dtos: Vec<UserDto> = self.get_list("/users").await?;
        dtos.into_iter().map(User::try_from).collect()
    }

    /// 拉取患者列表
    pub async fn fetch_patients(&self) -> Result<Vec<Patient>> {
        let dtos: Vec<PatientDto> = self.get_list("/patients/all").await?;
        Ok(dtos.into_iter().map(Patient::from).collect())
    }

    /// 停用用户
    pub async fn deactivate_user(&self, id: Uuid) -> Result<()> {
        let url = format!(
            "{}{}",
            self.config.endpoint,
            Self::activation_path("users", id, false)
        );
        self.send_command(self.client.delete(&url)).await
    }

    /// 重新启用用户
    pub async fn reactivate_user(&self, id: Uuid) -> Result<()> {
        let url = format!(
            "{}{}",
            self.config.endpoint,
            Self::activation_path("users", id, true)
        );
        self.send_command(self.client.put(&url)).await
    }

    /// 停用患者
    pub async fn deactivate_patient(&self, id: Uuid) -> Result<()> {
        let url = format!(
            "{}{}",
            self.config.endpoint,
            Self::activation_path("patients", id, false)
        );
        self.send_command(self.client.delete(&url)).await
    }

    /// 重新启用患者
    pub async fn reactivate_patient(&self, id: Uuid) -> Result<()> {
        let url = format!(
            "{}{}",
            self.config.endpoint,
            Self::activation_path("patients", id, true)
        );
        self.send_command(self.client.put(&url)).await
    }

    /// 启停接口的路径：停用为 DELETE `/{资源}/{id}`，启用为 PUT `/{资源}/{id}/reactivate`
    fn activation_path(resource: &str, id: Uuid, reactivate: bool) -> String {
        if reactivate {
            format!("/{}/{}/reactivate", resource, id)
        } else {
            format!("/{}/{}", resource, id)
        }
    }

    /// 获取 `{data: [...]}` 信封里的列表
    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let url = format!("{}{}", self.config.endpoint, path);
        debug!("GET {}", url);

        let request = Self::add_auth_headers(self.client.get(&url), &self.config.authentication);
        let response = request
            .send()
            .await
            .map_err(|e| MedSupplyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let envelope: ListEnvelope<T> = response
            .json()
            .await
            .map_err(|e| MedSupplyError::Backend(format!("Invalid response body: {}", e)))?;
        Ok(envelope.data)
    }

    /// 发送无响应体的命令请求
    async fn send_command(&self, request: reqwest::RequestBuilder) -> Result<()> {
        let request = Self::add_auth_headers(request, &self.config.authentication);
        let response = request
            .send()
            .await
            .map_err(|e| MedSupplyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        Ok(())
    }

    /// 添加认证头
    fn add_auth_headers(
        request: reqwest::RequestBuilder,
        auth: &AuthenticationConfig,
    ) -> reqwest::RequestBuilder {
        match auth {
            AuthenticationConfig::None => request,
            AuthenticationConfig::BasicAuth { username, password } => {
                request.basic_auth(username, Some(password))
            }
            AuthenticationConfig::ApiKey { key, header } => {
                let header_name = header.as_deref().unwrap_or("X-API-Key");
                request.header(header_name, key)
            }
            AuthenticationConfig::BearerToken { token } => request.bearer_auth(token),
        }
    }

    /// 将非 2xx 响应归类为统一错误
    async fn error_from_response(response: reqwest::Response) -> MedSupplyError {
        let status = response.status();
        let message = response
            .json::<ErrorBody>()
            .await
            .ok()
            .map(|body| body.message);
        Self::classify_failure(status.as_u16(), message)
    }

    /// 按状态码与可选的后端消息归类失败
    fn classify_failure(status: u16, message: Option<String>) -> MedSupplyError {
        match status {
            401 | 403 => MedSupplyError::Permission(
                message.unwrap_or_else(|| format!("Access denied with status {}", status)),
            ),
            400..=499 => MedSupplyError::Validation(
                message.unwrap_or_else(|| format!("Request rejected with status {}", status)),
            ),
            _ => MedSupplyError::Backend(format!("Backend returned status {}", status)),
        }
    }

    /// 申请列表的查询路径
    fn requests_path(scope: RequestScope) -> &'static str {
        match scope {
            RequestScope::All => "/requests/all",
            RequestScope::Mine => "/requests/my",
        }
    }
}

#[async_trait]
impl RequestStore for BackendClient {
    async fn fetch_requests(&self, scope: RequestScope) -> Result<Vec<Request>> {
        let dtos: Vec<RequestDto> = self.get_list(Self::requests_path(scope)).await?;
        dtos.into_iter().map(Request::try_from).collect()
    }

    async fn update_status(&self, id: Uuid, status: RequestStatus) -> Result<()> {
        let url = format!("{}/requests/{}/status", self.config.endpoint, id);
        debug!("PUT {} -> {}", url, status.wire_name());

        let request = self
            .client
            .put(&url)
            .json(&StatusUpdateBody::for_status(status));
        self.send_command(request).await
    }

    async fn create_request(&self, new: &NewRequest) -> Result<Request> {
        let url = format!("{}/requests", self.config.endpoint);
        let body = NewRequestBody::from(new);

        let request =
            Self::add_auth_headers(self.client.post(&url).json(&body), &self.config.authentication);
        let response = request
            .send()
            .await
            .map_err(|e| MedSupplyError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }

        let dto: RequestDto = response
            .json()
            .await
            .map_err(|e| MedSupplyError::Backend(format!("Invalid response body: {}", e)))?;

        let created = Request::try_from(dto)?;
        info!("Backend created request {}", created.id);
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_4xx_surfaces_message_verbatim() {
        let err = BackendClient::classify_failure(
            409,
            Some("La petición ya fue procesada".to_string()),
        );
        assert!(matches!(
            err,
            MedSupplyError::Validation(message) if message == "La petición ya fue procesada"
        ));
    }

    #[test]
    fn test_classify_4xx_without_body_gets_fallback() {
        let err = BackendClient::classify_failure(422, None);
        assert!(matches!(err, MedSupplyError::Validation(_)));
    }

    #[test]
    fn test_classify_5xx_is_generic_backend_error() {
        let err = BackendClient::classify_failure(500, Some("stack trace".to_string()));
        assert!(matches!(
            err,
            MedSupplyError::Backend(message) if !message.contains("stack trace")
        ));
    }

    #[test]
    fn test_classify_auth_failures_as_permission_errors() {
        let err = BackendClient::classify_failure(403, Some("Rol insuficiente".to_string()));
        assert!(matches!(
            err,
            MedSupplyError::Permission(message) if message == "Rol insuficiente"
        ));

        let err = BackendClient::classify_failure(401, None);
        assert!(matches!(err, MedSupplyError::Permission(_)));
    }

    #[test]
    fn test_activation_paths() {
        let id = Uuid::nil();
        assert_eq!(
            BackendClient::activation_path("users", id, false),
            format!("/users/{}", id)
        );
        assert_eq!(
            BackendClient::activation_path("users", id, true),
            format!("/users/{}/reactivate", id)
        );
        assert_eq!(
            BackendClient::activation_path("patients", id, false),
            format!("/patients/{}", id)
        );
        assert_eq!(
            BackendClient::activation_path("patients", id, true),
            format!("/patients/{}/reactivate", id)
        );
    }

    #[test]
    fn test_requests_path_by_scope() {
        assert_eq!(BackendClient::requests_path(RequestScope::All), "/requests/all");
        assert_eq!(BackendClient::requests_path(RequestScope::Mine), "/requests/my");
    }
}
