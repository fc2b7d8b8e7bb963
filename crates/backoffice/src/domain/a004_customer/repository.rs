use std::sync::Arc;

use contracts::domain::a004_customer::aggregate::{Customer, CustomerPage};
use serde_json::Value;

use crate::shared::api_client::{ApiError, CommerceApi};

/// По умолчанию справочник показывает последних 20 пользователей
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Read-only справочник покупателей
pub struct CustomerRepository {
    api: Arc<dyn CommerceApi>,
}

impl CustomerRepository {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self { api }
    }

    /// Поиск по имени или email; без поиска - последние limit записей
    pub async fn list(
        &self,
        search: Option<&str>,
        limit: Option<u32>,
    ) -> Result<CustomerPage, ApiError> {
        let mut params: Vec<String> = Vec::new();
        if let Some(search) = search.map(str::trim).filter(|s| !s.is_empty()) {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
        params.push(format!("limit={}", limit.unwrap_or(DEFAULT_PAGE_LIMIT)));

        let payload = self
            .api
            .get_json(&format!("/api/users?{}", params.join("&")))
            .await?;
        Ok(parse_customer_page(payload))
    }
}

/// Обычная форма - {"users": [...], "totalUsers": N};
/// голый массив тоже принимается
fn parse_customer_page(payload: Value) -> CustomerPage {
    match payload {
        Value::Array(_) => {
            let users: Vec<Customer> = serde_json::from_value(payload).unwrap_or_default();
            CustomerPage {
                total_users: users.len() as i64,
                users,
            }
        }
        Value::Object(_) => serde_json::from_value(payload).unwrap_or_else(|e| {
            tracing::warn!("unrecognized users response shape: {}", e);
            CustomerPage::default()
        }),
        _ => {
            tracing::warn!("users response is neither object nor array");
            CustomerPage::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::api_client::testing::FakeApi;
    use serde_json::json;

    #[tokio::test]
    async fn list_builds_query_and_parses_page() {
        let api = Arc::new(FakeApi::new());
        api.respond(
            "GET",
            "/api/users",
            Ok(json!({
                "users": [{
                    "_id": "u-1",
                    "firstName": "Anna",
                    "lastName": "Lee",
                    "email": "anna@example.com",
                    "createdAt": "2024-11-02T10:00:00.000Z"
                }],
                "totalUsers": 135
            })),
        );
        let repository = CustomerRepository::new(api.clone());
        let page = repository.list(Some("anna"), None).await.unwrap();

        assert_eq!(page.total_users, 135);
        assert_eq!(page.users[0].email, "anna@example.com");
        assert_eq!(api.recorded()[0].1, "/api/users?search=anna&limit=20");
    }

    #[tokio::test]
    async fn bare_array_degrades_to_page() {
        let api = Arc::new(FakeApi::new());
        api.respond(
            "GET",
            "/api/users",
            Ok(json!([{ "_id": "u-1", "firstName": "Anna" }])),
        );
        let repository = CustomerRepository::new(api);
        let page = repository.list(None, Some(5)).await.unwrap();
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.total_users, 1);
    }
}
