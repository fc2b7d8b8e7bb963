use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use thiserror::Error;

use super::config;

/// Ошибки обращения к commerce API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Запрос не дошел до сервера (сеть, таймаут)
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Сервер ответил не-2xx статусом; message берется из поля
    /// `message` тела ответа, когда оно есть
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// Тело ответа не удалось интерпретировать
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Контракт HTTP-адаптера внешнего API: авторизованные JSON-запросы,
/// сырое тело ответа отдается вызывающему слою на интерпретацию.
#[async_trait]
pub trait CommerceApi: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError>;
    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn patch_json(&self, path: &str, body: Value) -> Result<Value, ApiError>;
    async fn delete_json(&self, path: &str) -> Result<Value, ApiError>;
}

/// HTTP-клиент commerce API. Все запросы уходят с cookie-сессией
/// (credentials: include) и JSON content-type.
pub struct CommerceApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl CommerceApiClient {
    pub fn new() -> Self {
        Self::with_base_url(config::API_BASE_URL.clone())
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .cookie_store(true)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
        }
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = config::join_url(&self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await.map_err(ApiError::Network)?;
        let status = response.status();
        let text = response.text().await.map_err(ApiError::Network)?;

        if !status.is_success() {
            let message = serde_json::from_str::<Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or_else(|| format!("{} {} failed with status {}", method, path, status));
            tracing::error!("commerce API request failed: {} {} -> {}", method, url, status);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(500).collect();
            tracing::error!("Failed to parse commerce API JSON: {}. Body: {}", e, preview);
            ApiError::Malformed(e.to_string())
        })
    }
}

impl Default for CommerceApiClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommerceApi for CommerceApiClient {
    async fn get_json(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(Method::GET, path, None).await
    }

    async fn post_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(Method::POST, path, Some(body)).await
    }

    async fn put_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(Method::PUT, path, Some(body)).await
    }

    async fn patch_json(&self, path: &str, body: Value) -> Result<Value, ApiError> {
        self.execute(Method::PATCH, path, Some(body)).await
    }

    async fn delete_json(&self, path: &str) -> Result<Value, ApiError> {
        self.execute(Method::DELETE, path, None).await
    }
}
