use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Статусы заказа, доступные админке для перевода
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Варианты для выпадающего списка статусов
    pub fn all() -> [OrderStatus; 4] {
        [
            OrderStatus::Pending,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ]
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderLineItem {
    pub name: String,
    pub image: Option<String>,
    pub price: Decimal,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    pub selected_quantity: i32,
}

/// Заказ покупателя (read-only проекция из внешнего API,
/// админка меняет только статус)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub user_id: String,
    pub shipping_info: ShippingInfo,
    pub items: Vec<OrderLineItem>,
    pub total: Decimal,
    pub tax: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl Default for Order {
    fn default() -> Self {
        Self {
            id: String::new(),
            user_id: String::new(),
            shipping_info: ShippingInfo::default(),
            items: Vec::new(),
            total: Decimal::ZERO,
            tax: Decimal::ZERO,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        }
    }
}
