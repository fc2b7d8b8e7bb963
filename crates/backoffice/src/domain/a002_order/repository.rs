use std::sync::{Arc, RwLock};

use contracts::domain::a002_order::aggregate::{Order, OrderStatus};
use serde_json::Value;

use crate::shared::api_client::{ApiError, CommerceApi};

/// Клиентский репозиторий заказов: список с поиском
/// и перевод статуса.
pub struct OrderRepository {
    api: Arc<dyn CommerceApi>,
    state: RwLock<Vec<Order>>,
}

impl OrderRepository {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self {
            api,
            state: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Vec<Order> {
        self.state.read().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<Order> {
        self.state
            .read()
            .unwrap()
            .iter()
            .find(|o| o.id == id)
            .cloned()
    }

    /// Загрузить заказы, опционально отфильтрованные поиском
    /// по email, имени или номеру заказа
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Order>, ApiError> {
        let path = match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(search) => format!("/api/orders?search={}", urlencoding::encode(search)),
            None => "/api/orders".to_string(),
        };
        let payload = self.api.get_json(&path).await?;
        let orders = parse_order_list(payload);
        *self.state.write().unwrap() = orders.clone();
        Ok(orders)
    }

    /// Перевести заказ в новый статус. Локальная копия правится
    /// только после подтверждения сервером.
    pub async fn set_status(&self, id: &str, status: OrderStatus) -> Result<(), ApiError> {
        self.api
            .put_json(
                &format!("/api/orders/{}", id),
                serde_json::json!({ "status": status }),
            )
            .await?;

        let mut orders = self.state.write().unwrap();
        if let Some(order) = orders.iter_mut().find(|o| o.id == id) {
            order.status = status;
        }
        tracing::info!("order {} status set to {}", id, status);
        Ok(())
    }
}

/// Конверт ответа: {"orders": [...]} или голый массив
pub fn parse_order_list(payload: Value) -> Vec<Order> {
    let records = match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("orders") {
            Some(Value::Array(items)) => items,
            _ => {
                tracing::warn!("unrecognized orders response envelope, treating as empty");
                Vec::new()
            }
        },
        _ => Vec::new(),
    };

    let mut orders = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<Order>(record) {
            Ok(order) => orders.push(order),
            Err(e) => tracing::warn!("skipping malformed order record: {}", e),
        }
    }
    orders
}
