use std::sync::{Arc, RwLock};

use contracts::domain::a003_product::aggregate::{Product, ProductDto};
use serde_json::Value;

use crate::shared::api_client::{ApiError, CommerceApi};

/// Клиентский репозиторий каталога товаров
pub struct ProductRepository {
    api: Arc<dyn CommerceApi>,
    state: RwLock<Vec<Product>>,
}

impl ProductRepository {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self {
            api,
            state: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<Product> {
        self.state.read().unwrap().clone()
    }

    /// Загрузить каталог (API отдает голый массив)
    pub async fn list(&self) -> Result<Vec<Product>, ApiError> {
        let payload = self.api.get_json("/api/products").await?;
        let products = parse_product_list(payload);
        *self.state.write().unwrap() = products.clone();
        Ok(products)
    }

    /// Карточка одного товара
    pub async fn get(&self, id: &str) -> Result<Product, ApiError> {
        let payload = self.api.get_json(&format!("/api/products/{}", id)).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Malformed(e.to_string()))
    }

    pub async fn create(&self, dto: &ProductDto) -> Result<(), ApiError> {
        let body = serde_json::to_value(dto).map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.api.post_json("/api/products", body).await?;
        tracing::info!("product created: {}", dto.title);
        Ok(())
    }

    pub async fn update(&self, id: &str, dto: &ProductDto) -> Result<(), ApiError> {
        let body = serde_json::to_value(dto).map_err(|e| ApiError::Malformed(e.to_string()))?;
        self.api
            .put_json(&format!("/api/products/{}", id), body)
            .await?;
        tracing::info!("product {} updated", id);
        Ok(())
    }

    /// Удалить товар; локальная копия чистится после
    /// подтверждения сервером
    pub async fn delete(&self, id: &str) -> Result<(), ApiError> {
        self.api
            .delete_json(&format!("/api/products/{}", id))
            .await?;
        self.state.write().unwrap().retain(|p| p.id != id);
        tracing::info!("product {} deleted", id);
        Ok(())
    }
}

fn parse_product_list(payload: Value) -> Vec<Product> {
    let records = match payload {
        Value::Array(items) => items,
        _ => {
            tracing::warn!("unrecognized products response shape, treating as empty");
            Vec::new()
        }
    };

    let mut products = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<Product>(record) {
            Ok(product) => products.push(product),
            Err(e) => tracing::warn!("skipping malformed product record: {}", e),
        }
    }
    products
}
