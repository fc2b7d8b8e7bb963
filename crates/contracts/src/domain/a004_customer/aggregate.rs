use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Покупатель из справочника пользователей
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Customer {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl Default for Customer {
    fn default() -> Self {
        Self {
            id: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            is_admin: false,
            created_at: Utc::now(),
        }
    }
}

/// Страница справочника: пользователи + общий счетчик
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPage {
    pub users: Vec<Customer>,
    pub total_users: i64,
}
