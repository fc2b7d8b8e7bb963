use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use contracts::domain::a001_return_request::aggregate::{ReturnRequest, ReturnStatus};
use contracts::usecases::u201_process_return::{ConfirmedDecision, DecisionOutcome, DecisionRequest};
use serde_json::Value;

use crate::shared::api_client::{ApiError, CommerceApi};

/// Ключи конверта, под которыми API может прислать массив заявок.
/// Порядок проверки фиксированный.
const ENVELOPE_KEYS: [&str; 5] = [
    "returns",
    "requests",
    "returnRequests",
    "return_requests",
    "data",
];

/// Вложенные объекты, в которых сервер может вернуть
/// подтвержденные поля решения
const OUTCOME_KEYS: [&str; 3] = ["request", "returnRequest", "data"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(ReturnStatus),
}

/// Фильтр списка заявок (статус + поиск по клиенту/заказу)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReturnFilter {
    pub status: StatusFilter,
    pub search: Option<String>,
}

impl ReturnFilter {
    pub fn with_status(status: ReturnStatus) -> Self {
        Self {
            status: StatusFilter::Only(status),
            search: None,
        }
    }
}

/// Клиентский репозиторий заявок на возврат.
///
/// Владеет канонической in-memory копией серверного списка: порядок
/// сервера сохраняется, мутации проходят только через `refresh`,
/// `decide` + `apply_confirmed`.
pub struct ReturnRequestRepository {
    api: Arc<dyn CommerceApi>,
    state: RwLock<Vec<ReturnRequest>>,
    fetch_seq: AtomicU64,
}

impl ReturnRequestRepository {
    pub fn new(api: Arc<dyn CommerceApi>) -> Self {
        Self {
            api,
            state: RwLock::new(Vec::new()),
            fetch_seq: AtomicU64::new(0),
        }
    }

    /// Текущий снимок кэша
    pub fn snapshot(&self) -> Vec<ReturnRequest> {
        self.state.read().unwrap().clone()
    }

    pub fn get(&self, id: &str) -> Option<ReturnRequest> {
        self.state
            .read()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// Запросить список у сервера и обновить кэш.
    ///
    /// Каждый запрос получает монотонный номер; ответ, разрешившийся
    /// после выдачи более нового запроса, отбрасывается - вместо него
    /// возвращается актуальный кэш (защита от "поздний ответ побеждает").
    pub async fn refresh(&self, filter: &ReturnFilter) -> Result<Vec<ReturnRequest>, ApiError> {
        let seq = self.fetch_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let path = list_path(filter);
        tracing::debug!("fetching return requests: {}", path);

        let payload = self.api.get_json(&path).await?;
        let requests = parse_return_list(payload);

        let mut state = self.state.write().unwrap();
        if self.fetch_seq.load(Ordering::SeqCst) != seq {
            tracing::debug!("discarding stale returns response (seq {})", seq);
            return Ok(state.clone());
        }
        *state = requests.clone();
        Ok(requests)
    }

    /// Отправить решение по заявке и вернуть подтвержденные
    /// сервером поля
    pub async fn decide(
        &self,
        id: &str,
        request: &DecisionRequest,
    ) -> Result<DecisionOutcome, ApiError> {
        let body = serde_json::to_value(request).map_err(|e| ApiError::Malformed(e.to_string()))?;
        let payload = self
            .api
            .patch_json(&format!("/api/returns/{}", id), body)
            .await?;
        parse_decision_outcome(payload)
    }

    /// Применить подтвержденное сервером решение к локальной копии.
    /// Единственная точка записи финансовых полей в кэш.
    pub fn apply_confirmed(&self, id: &str, decision: &ConfirmedDecision) {
        let mut state = self.state.write().unwrap();
        if let Some(request) = state.iter_mut().find(|r| r.id == id) {
            request.status = decision.status;
            request.refund_percentage = decision.refund_percentage;
            request.refund_amount = decision.refund_amount;
            request.refund_reason = decision.refund_reason.clone();
        }
    }
}

fn list_path(filter: &ReturnFilter) -> String {
    let mut params: Vec<String> = Vec::new();
    if let StatusFilter::Only(status) = filter.status {
        params.push(format!("status={}", status));
    }
    if let Some(search) = filter.search.as_deref() {
        let search = search.trim();
        if !search.is_empty() {
            params.push(format!("search={}", urlencoding::encode(search)));
        }
    }

    if params.is_empty() {
        "/api/returns".to_string()
    } else {
        format!("/api/returns?{}", params.join("&"))
    }
}

/// Нормализует ответ списка в плоскую последовательность заявок.
/// Неизвестная форма конверта дает пустой список, а не падение
/// страницы; нечитаемые записи пропускаются.
pub fn parse_return_list(payload: Value) -> Vec<ReturnRequest> {
    let records = extract_envelope(payload);
    let mut requests = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<ReturnRequest>(record) {
            Ok(request) => requests.push(request),
            Err(e) => tracing::warn!("skipping malformed return request record: {}", e),
        }
    }
    requests
}

fn extract_envelope(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in ENVELOPE_KEYS {
                if let Some(candidate) = map.remove(key) {
                    if let Value::Array(items) = candidate {
                        return items;
                    }
                }
            }
            tracing::warn!("unrecognized returns response envelope, treating as empty");
            Vec::new()
        }
        other => {
            tracing::warn!("returns response is not an array or object: {}", other);
            Vec::new()
        }
    }
}

/// Сервер может вернуть подтвержденные поля на верхнем уровне
/// или вложенными в request/returnRequest/data
fn parse_decision_outcome(payload: Value) -> Result<DecisionOutcome, ApiError> {
    if !payload.is_object() {
        return Err(ApiError::Malformed(
            "decision response is not a JSON object".to_string(),
        ));
    }

    let top: DecisionOutcome = serde_json::from_value(payload.clone()).unwrap_or_default();
    if top.has_confirmed_fields() {
        return Ok(top);
    }

    for key in OUTCOME_KEYS {
        if let Some(nested) = payload.get(key) {
            if nested.is_object() {
                let outcome: DecisionOutcome =
                    serde_json::from_value(nested.clone()).unwrap_or_default();
                if outcome.has_confirmed_fields() {
                    return Ok(outcome);
                }
            }
        }
    }

    Ok(top)
}
