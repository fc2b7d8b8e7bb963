use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Статус заявки на возврат (значения как в API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ReturnStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    Refunded,
}

impl ReturnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReturnStatus::Pending => "pending",
            ReturnStatus::Approved => "approved",
            ReturnStatus::Rejected => "rejected",
            ReturnStatus::Refunded => "refunded",
        }
    }

    /// Из терминального статуса переходы запрещены
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ReturnStatus::Approved | ReturnStatus::Rejected | ReturnStatus::Refunded
        )
    }

    pub fn is_actionable(&self) -> bool {
        matches!(self, ReturnStatus::Pending)
    }
}

impl std::fmt::Display for ReturnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// orderId приходит либо строкой-идентификатором,
/// либо вложенным объектом заказа
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderRef {
    Id(String),
    Embedded(OrderSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
}

impl OrderRef {
    /// Идентификатор заказа; нераспознанная форма дает "N/A"
    pub fn id(&self) -> &str {
        let id = match self {
            OrderRef::Id(id) => id.as_str(),
            OrderRef::Embedded(summary) => summary.id.as_str(),
        };
        if id.is_empty() {
            "N/A"
        } else {
            id
        }
    }
}

impl Default for OrderRef {
    fn default() -> Self {
        OrderRef::Id(String::new())
    }
}

/// userId приходит либо строкой-идентификатором, либо вложенной
/// карточкой пользователя (name или firstName/lastName + email)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Id(String),
    Summary(CustomerSummary),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

pub const UNKNOWN_CUSTOMER: &str = "Unknown";

impl CustomerRef {
    /// Имя для отображения; если пришел только id - сентинел "Unknown"
    pub fn display_name(&self) -> String {
        match self {
            CustomerRef::Id(_) => UNKNOWN_CUSTOMER.to_string(),
            CustomerRef::Summary(summary) => {
                if let Some(name) = summary.name.as_deref() {
                    if !name.trim().is_empty() {
                        return name.trim().to_string();
                    }
                }
                let full = format!(
                    "{} {}",
                    summary.first_name.as_deref().unwrap_or(""),
                    summary.last_name.as_deref().unwrap_or("")
                );
                let full = full.trim();
                if full.is_empty() {
                    UNKNOWN_CUSTOMER.to_string()
                } else {
                    full.to_string()
                }
            }
        }
    }

    pub fn email(&self) -> String {
        match self {
            CustomerRef::Id(_) => UNKNOWN_CUSTOMER.to_string(),
            CustomerRef::Summary(summary) => summary
                .email
                .clone()
                .filter(|e| !e.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_CUSTOMER.to_string()),
        }
    }
}

impl Default for CustomerRef {
    fn default() -> Self {
        CustomerRef::Id(String::new())
    }
}

/// Строка возврата: одна товарная позиция заявки
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnLineItem {
    pub title: String,
    /// Цена за единицу
    pub price: Decimal,
    pub selected_size: Option<String>,
    pub selected_color: Option<String>,
    /// Сколько единиц было в заказе
    pub selected_quantity: i32,
    /// Сколько единиц возвращается (0 < returnQuantity <= selectedQuantity)
    pub return_quantity: i32,
}

/// Заявка на возврат. Создается внешней системой; админка ее
/// только читает и переводит по статусам.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReturnRequest {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(rename = "orderId")]
    pub order: OrderRef,
    #[serde(rename = "userId")]
    pub customer: CustomerRef,
    pub items: Vec<ReturnLineItem>,
    pub reason: String,
    pub description: Option<String>,
    pub status: ReturnStatus,
    /// Осмысленно только после решения (или во время редактирования)
    pub refund_percentage: i32,
    /// Авторитетно только после подтверждения сервером
    pub refund_amount: Decimal,
    pub refund_reason: Option<String>,
    pub return_tracking_number: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ReturnRequest {
    /// Процент, с которого начинается ревью pending-заявки:
    /// сохраненное значение или 100 по умолчанию
    pub fn review_percentage(&self) -> i32 {
        if self.refund_percentage > 0 {
            self.refund_percentage
        } else {
            100
        }
    }
}

impl Default for ReturnRequest {
    fn default() -> Self {
        Self {
            id: String::new(),
            order: OrderRef::default(),
            customer: CustomerRef::default(),
            items: Vec::new(),
            reason: String::new(),
            description: None,
            status: ReturnStatus::Pending,
            refund_percentage: 0,
            refund_amount: Decimal::ZERO,
            refund_reason: None,
            return_tracking_number: None,
            created_at: Utc::now(),
        }
    }
}
