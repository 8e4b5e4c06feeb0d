use crate::shared::config::ApiConfig;
use async_trait::async_trait;
use contracts::domain::a001_seller_account::Account;
use contracts::usecases::u508_unarchive_ozon_products::ProductRecord;
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const PRODUCT_INFO_PATH: &str = "/v3/product/info/list";
pub const UNARCHIVE_PATH: &str = "/v1/product/unarchive";

/// Ошибка одного запроса к OZON API. Относится к одному чанку и не прерывает пакет.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {0}")]
    Network(String),

    #[error("OZON API request failed with status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("failed to parse OZON API JSON: {0}")]
    Decode(String),

    #[error("no 'items' field in response, response keys: {keys:?}")]
    MissingItems { keys: Vec<String> },
}

impl ApiError {
    fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("request timed out: {}", e))
        } else if e.is_connect() {
            Self::Network(format!("connection failed: {}", e))
        } else {
            Self::Network(e.to_string())
        }
    }
}

/// Результат теста соединения с OZON API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestConnectionResult {
    pub success: bool,
    pub status: Option<u16>,
    pub message: String,
    pub details: Option<String>,
}

impl TestConnectionResult {
    /// Интерпретация HTTP-статуса тестового запроса
    pub fn from_status(status: u16) -> Self {
        let message = match status {
            200 => "✅ API работает корректно".to_string(),
            401 => "❌ Ошибка авторизации - проверьте Client-Id и Api-Key".to_string(),
            403 => "❌ Доступ запрещен - проверьте права API ключа".to_string(),
            other => format!("⚠️ Неожиданный статус: {}", other),
        };
        Self {
            success: status == 200,
            status: Some(status),
            message,
            details: None,
        }
    }

    pub fn connection_failed(details: impl Into<String>) -> Self {
        Self {
            success: false,
            status: None,
            message: "❌ Ошибка подключения".to_string(),
            details: Some(details.into()),
        }
    }
}

/// Каталог товаров площадки: то, что нужно запуску восстановления от API.
///
/// Реальная реализация: [`OzonApiClient`]. Тесты подставляют каталог в памяти.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// POST /v3/product/info/list по списку offer_id (не больше 100)
    async fn fetch_product_info(
        &self,
        account: &Account,
        offer_ids: &[String],
    ) -> Result<Vec<ProductRecord>, ApiError>;

    /// POST /v1/product/unarchive по списку product_id (не больше 100)
    async fn unarchive_products(
        &self,
        account: &Account,
        product_ids: &[i64],
    ) -> Result<serde_json::Value, ApiError>;

    /// Проверка доступности API и валидности ключей
    async fn test_connection(&self, account: &Account) -> TestConnectionResult;
}

/// HTTP-клиент для работы с OZON Seller API
pub struct OzonApiClient {
    client: reqwest::Client,
    base_url: String,
    test_timeout: Duration,
    request_log: Option<PathBuf>,
}

impl OzonApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Network(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            test_timeout: Duration::from_secs(config.test_timeout_secs),
            request_log: config.request_log.clone(),
        })
    }

    /// Записать в лог-файл запросов (если он настроен)
    fn log_to_file(&self, message: &str) {
        let Some(path) = &self.request_log else {
            return;
        };
        if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
            let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f");
            let _ = writeln!(file, "[{}] {}", timestamp, message);
        }
    }

    /// POST с заголовками Client-Id / Api-Key. Возвращает статус и тело успешного ответа.
    async fn post(
        &self,
        account: &Account,
        path: &str,
        body: String,
        timeout: Option<Duration>,
    ) -> Result<(u16, String), ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.log_to_file(&format!(
            "=== REQUEST ===\nPOST {}\nClient-Id: {}\nApi-Key: ****\nBody: {}",
            url, account.client_id, body
        ));

        let mut request = self
            .client
            .post(&url)
            .header("Client-Id", &account.client_id)
            .header("Api-Key", &account.api_key)
            .header("Content-Type", "application/json")
            .body(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| {
            self.log_to_file(&format!("Transport error: {}", e));
            ApiError::from_transport(&e)
        })?;

        let status = response.status();
        self.log_to_file(&format!("Response status: {}", status));

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            self.log_to_file(&format!("ERROR Response body:\n{}", body));
            tracing::error!(
                "OZON API request {} failed with {}: {}",
                path,
                status,
                preview(&body)
            );
            return Err(ApiError::HttpStatus {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::from_transport(&e))?;
        self.log_to_file(&format!("=== RESPONSE BODY ===\n{}\n", body));
        tracing::debug!("OZON API response preview: {}", preview(&body));
        Ok((status.as_u16(), body))
    }
}

#[async_trait]
impl CatalogApi for OzonApiClient {
    async fn fetch_product_info(
        &self,
        account: &Account,
        offer_ids: &[String],
    ) -> Result<Vec<ProductRecord>, ApiError> {
        let request_body = OzonProductInfoRequest {
            offer_id: offer_ids,
            product_id: Vec::new(),
        };
        let body =
            serde_json::to_string(&request_body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let (_, response) = self.post(account, PRODUCT_INFO_PATH, body, None).await?;
        parse_product_info(&response)
    }

    async fn unarchive_products(
        &self,
        account: &Account,
        product_ids: &[i64],
    ) -> Result<serde_json::Value, ApiError> {
        let request_body = OzonUnarchiveRequest {
            product_id: product_ids,
        };
        let body =
            serde_json::to_string(&request_body).map_err(|e| ApiError::Decode(e.to_string()))?;
        let (_, response) = self.post(account, UNARCHIVE_PATH, body, None).await?;
        serde_json::from_str(&response).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn test_connection(&self, account: &Account) -> TestConnectionResult {
        let url = format!("{}{}", self.base_url, PRODUCT_INFO_PATH);
        tracing::info!("Testing OZON API connection: {}", url);

        let test_ids = vec!["test".to_string()];
        let request_body = OzonProductInfoRequest {
            offer_id: &test_ids,
            product_id: Vec::new(),
        };
        let body = match serde_json::to_string(&request_body) {
            Ok(body) => body,
            Err(e) => return TestConnectionResult::connection_failed(e.to_string()),
        };

        match self
            .post(account, PRODUCT_INFO_PATH, body, Some(self.test_timeout))
            .await
        {
            Ok((status, _)) => TestConnectionResult::from_status(status),
            Err(ApiError::HttpStatus { status, body }) => {
                let mut result = TestConnectionResult::from_status(status);
                if !body.is_empty() {
                    result.details = Some(body);
                }
                result
            }
            Err(e) => TestConnectionResult::connection_failed(format!(
                "URL: {}, Client-Id: {}, {}",
                url, account.client_id, e
            )),
        }
    }
}

/// Разобрать ответ /v3/product/info/list.
///
/// Список товаров ищется в `items`, затем в `result.items`.
pub fn parse_product_info(body: &str) -> Result<Vec<ProductRecord>, ApiError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    let items = value
        .get("items")
        .filter(|items| !items.is_null())
        .or_else(|| value.get("result").and_then(|result| result.get("items")))
        .filter(|items| !items.is_null());

    let Some(items) = items else {
        let keys = value
            .as_object()
            .map(|object| object.keys().cloned().collect())
            .unwrap_or_default();
        return Err(ApiError::MissingItems { keys });
    };

    let items: Vec<OzonProductInfoItem> =
        serde_json::from_value(items.clone()).map_err(|e| ApiError::Decode(e.to_string()))?;
    Ok(items.into_iter().map(OzonProductInfoItem::into_record).collect())
}

fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

// ============================================================================
// Request/Response structures
// ============================================================================

#[derive(Debug, Serialize)]
struct OzonProductInfoRequest<'a> {
    offer_id: &'a [String],
    product_id: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct OzonUnarchiveRequest<'a> {
    product_id: &'a [i64],
}

#[derive(Debug, Clone, Deserialize)]
pub struct OzonProductInfoItem {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub offer_id: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default)]
    pub is_autoarchived: Option<bool>,
    #[serde(default)]
    pub statuses: serde_json::Value,
}

impl OzonProductInfoItem {
    pub fn into_record(self) -> ProductRecord {
        let status_name = self
            .statuses
            .get("status_name")
            .and_then(|status| status.as_str())
            .unwrap_or("unknown")
            .to_string();

        ProductRecord {
            offer_id: self.offer_id,
            product_id: self.id,
            status_name,
            is_archived: self.is_archived.unwrap_or(false),
            is_autoarchived: self.is_autoarchived.unwrap_or(false),
        }
    }
}
