use std::collections::HashSet;
use std::sync::{Arc, Mutex, RwLock};

use contracts::domain::a001_return_request::aggregate::{ReturnRequest, ReturnStatus};
use contracts::usecases::u201_process_return::{
    ConfirmedDecision, DecisionAction, DecisionRequest,
};
use rust_decimal::{Decimal, RoundingStrategy};
use thiserror::Error;

use crate::domain::a001_return_request::refund::{calculate_refund, RefundError};
use crate::domain::a001_return_request::repository::ReturnRequestRepository;
use crate::shared::api_client::ApiError;
use crate::shared::notification::Notification;

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("refund percentage {0} is outside 0..=100")]
    InvalidPercentage(i32),

    #[error("return request {0} is already being processed")]
    AlreadyProcessing(String),

    #[error("return request {id} is already {status}")]
    InvalidTransition { id: String, status: ReturnStatus },

    #[error("return request {0} is not in the loaded list")]
    UnknownRequest(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl From<RefundError> for ProcessError {
    fn from(e: RefundError) -> Self {
        match e {
            RefundError::InvalidPercentage(p) => ProcessError::InvalidPercentage(p),
        }
    }
}

/// Executor обработки заявки на возврат.
///
/// Единственная точка переходов pending -> refunded/rejected:
/// валидация до сети, per-id флаг "в обработке" на время запроса,
/// запись в кэш только после подтверждения сервером. Серверные
/// финансовые значения всегда приоритетнее локального предрасчета.
pub struct ProcessReturnExecutor {
    repository: Arc<ReturnRequestRepository>,
    processing: Mutex<HashSet<String>>,
    notification: RwLock<Option<Notification>>,
}

impl ProcessReturnExecutor {
    pub fn new(repository: Arc<ReturnRequestRepository>) -> Self {
        Self {
            repository,
            processing: Mutex::new(HashSet::new()),
            notification: RwLock::new(None),
        }
    }

    pub fn repository(&self) -> &Arc<ReturnRequestRepository> {
        &self.repository
    }

    /// Заявка сейчас в обработке (кнопки должны быть заблокированы)
    pub fn is_processing(&self, id: &str) -> bool {
        self.processing.lock().unwrap().contains(id)
    }

    /// Текущее уведомление, если оно еще не истекло
    pub fn current_notification(&self) -> Option<Notification> {
        let guard = self.notification.read().unwrap();
        guard.clone().filter(|n| !n.is_expired())
    }

    /// Одобрить возврат с компенсацией percentage процентов
    /// стоимости возвращаемых позиций.
    pub async fn approve(
        &self,
        id: &str,
        percentage: i32,
        note: Option<&str>,
    ) -> Result<ReturnRequest, ProcessError> {
        let request = self
            .repository
            .get(id)
            .ok_or_else(|| ProcessError::UnknownRequest(id.to_string()))?;
        // InvalidPercentage отсекается до любых сетевых вызовов
        let preview = calculate_refund(&request.items, percentage)?;
        self.ensure_actionable(&request)?;
        let _guard = self.begin_processing(id)?;

        let note = normalize_note(note);
        let decision = DecisionRequest {
            action: DecisionAction::Approve,
            refund_percentage: percentage,
            refund_reason: note.clone(),
        };

        match self.repository.decide(id, &decision).await {
            Ok(outcome) => {
                // Серверная сумма приоритетна; локальный предрасчет - только
                // если сервер ее не вернул. Канонический масштаб - центы.
                let mut amount = outcome
                    .refund_amount
                    .unwrap_or(preview)
                    .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
                amount.rescale(2);
                let confirmed = ConfirmedDecision {
                    status: outcome.status.unwrap_or(ReturnStatus::Refunded),
                    refund_percentage: outcome.refund_percentage.unwrap_or(percentage),
                    refund_amount: amount,
                    refund_reason: outcome.refund_reason.or(note),
                };
                self.repository.apply_confirmed(id, &confirmed);
                tracing::info!(
                    "return request {} approved: {}% -> {}",
                    id,
                    confirmed.refund_percentage,
                    confirmed.refund_amount
                );
                self.notify_success(format!(
                    "Return approved! Refunded ${} ({}%)",
                    confirmed.refund_amount, confirmed.refund_percentage
                ));
                self.patched(id)
            }
            Err(e) => {
                tracing::error!("failed to approve return request {}: {}", id, e);
                self.notify_error(&e);
                Err(e.into())
            }
        }
    }

    /// Отклонить заявку без компенсации
    pub async fn reject(&self, id: &str, note: Option<&str>) -> Result<ReturnRequest, ProcessError> {
        let request = self
            .repository
            .get(id)
            .ok_or_else(|| ProcessError::UnknownRequest(id.to_string()))?;
        self.ensure_actionable(&request)?;
        let _guard = self.begin_processing(id)?;

        let note = normalize_note(note);
        let decision = DecisionRequest {
            action: DecisionAction::Reject,
            refund_percentage: 0,
            refund_reason: note.clone(),
        };

        match self.repository.decide(id, &decision).await {
            Ok(outcome) => {
                let confirmed = ConfirmedDecision {
                    status: outcome.status.unwrap_or(ReturnStatus::Rejected),
                    refund_percentage: 0,
                    refund_amount: Decimal::ZERO,
                    refund_reason: note,
                };
                self.repository.apply_confirmed(id, &confirmed);
                tracing::info!("return request {} rejected", id);
                self.notify_success("Return request rejected successfully!".to_string());
                self.patched(id)
            }
            Err(e) => {
                tracing::error!("failed to reject return request {}: {}", id, e);
                self.notify_error(&e);
                Err(e.into())
            }
        }
    }

    fn ensure_actionable(&self, request: &ReturnRequest) -> Result<(), ProcessError> {
        if request.status.is_actionable() {
            Ok(())
        } else {
            Err(ProcessError::InvalidTransition {
                id: request.id.clone(),
                status: request.status,
            })
        }
    }

    fn begin_processing(&self, id: &str) -> Result<ProcessingGuard<'_>, ProcessError> {
        let mut processing = self.processing.lock().unwrap();
        if !processing.insert(id.to_string()) {
            return Err(ProcessError::AlreadyProcessing(id.to_string()));
        }
        Ok(ProcessingGuard {
            executor: self,
            id: id.to_string(),
        })
    }

    fn patched(&self, id: &str) -> Result<ReturnRequest, ProcessError> {
        self.repository
            .get(id)
            .ok_or_else(|| ProcessError::UnknownRequest(id.to_string()))
    }

    fn notify_success(&self, message: String) {
        *self.notification.write().unwrap() = Some(Notification::success(message));
    }

    fn notify_error(&self, error: &ApiError) {
        *self.notification.write().unwrap() =
            Some(Notification::error(error_notification_message(error)));
    }
}

/// Снимает флаг "в обработке" на любом пути выхода
struct ProcessingGuard<'a> {
    executor: &'a ProcessReturnExecutor,
    id: String,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        self.executor
            .processing
            .lock()
            .unwrap()
            .remove(&self.id);
    }
}

fn normalize_note(note: Option<&str>) -> Option<String> {
    note.map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
}

/// Известные сообщения backend переводятся в понятный
/// администратору текст, остальные показываются как есть
fn error_notification_message(error: &ApiError) -> String {
    let message = match error {
        ApiError::Server { message, .. } => message.clone(),
        other => other.to_string(),
    };

    if message.contains("No payment ID found") {
        "Error: No payment information found for this order".to_string()
    } else if message.contains("Invalid refund amount") {
        "Error: Invalid refund amount calculated".to_string()
    } else if message.contains("Request not found") {
        "Error: Return request not found".to_string()
    } else if message.contains("Order not found") {
        "Error: Associated order not found".to_string()
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a001_return_request::repository::ReturnFilter;
    use crate::shared::api_client::testing::FakeApi;
    use crate::shared::notification::NotificationKind;
    use serde_json::json;

    fn pending_request(id: &str, price: f64, quantity: i32) -> serde_json::Value {
        json!({
            "_id": id,
            "orderId": "ord-1",
            "userId": "u-1",
            "items": [{
                "title": "Sneakers",
                "price": price,
                "selectedQuantity": quantity,
                "returnQuantity": quantity
            }],
            "reason": "damaged",
            "status": "pending",
            "createdAt": "2025-04-01T09:00:00.000Z"
        })
    }

    async fn executor_with(api: Arc<FakeApi>, records: serde_json::Value) -> ProcessReturnExecutor {
        api.respond("GET", "/api/returns", Ok(records));
        let repository = Arc::new(ReturnRequestRepository::new(api));
        repository.refresh(&ReturnFilter::default()).await.unwrap();
        ProcessReturnExecutor::new(repository)
    }

    #[tokio::test]
    async fn approve_end_to_end() {
        let api = Arc::new(FakeApi::new());
        api.respond(
            "PATCH",
            "/api/returns/ret-1",
            Ok(json!({ "refundAmount": 75.00 })),
        );
        let executor = executor_with(api.clone(), json!([pending_request("ret-1", 100.0, 1)])).await;

        let updated = executor
            .approve("ret-1", 75, Some("partial - worn"))
            .await
            .unwrap();

        assert_eq!(updated.status, ReturnStatus::Refunded);
        assert_eq!(updated.refund_percentage, 75);
        assert_eq!(updated.refund_amount, "75.00".parse().unwrap());
        assert_eq!(updated.refund_reason.as_deref(), Some("partial - worn"));

        let calls = api.recorded();
        let patch = calls.iter().find(|(m, _, _)| m == "PATCH").unwrap();
        assert_eq!(patch.1, "/api/returns/ret-1");
        assert_eq!(
            patch.2,
            Some(json!({
                "action": "approve",
                "refundPercentage": 75,
                "refundReason": "partial - worn"
            }))
        );

        let notification = executor.current_notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Success);
        assert_eq!(notification.message, "Return approved! Refunded $75.00 (75%)");
        assert!(!executor.is_processing("ret-1"));
    }

    #[tokio::test]
    async fn approve_falls_back_to_local_preview() {
        let api = Arc::new(FakeApi::new());
        api.respond("PATCH", "/api/returns/ret-1", Ok(json!({ "message": "ok" })));
        let executor = executor_with(api, json!([pending_request("ret-1", 100.0, 1)])).await;

        let updated = executor.approve("ret-1", 75, None).await.unwrap();
        assert_eq!(updated.status, ReturnStatus::Refunded);
        assert_eq!(updated.refund_amount, "75.00".parse().unwrap());
        assert_eq!(updated.refund_reason, None);
    }

    #[tokio::test]
    async fn reject_end_to_end() {
        let api = Arc::new(FakeApi::new());
        api.respond("PATCH", "/api/returns/ret-1", Ok(json!({})));
        let executor = executor_with(api.clone(), json!([pending_request("ret-1", 40.0, 2)])).await;

        let updated = executor.reject("ret-1", Some("not eligible")).await.unwrap();

        assert_eq!(updated.status, ReturnStatus::Rejected);
        assert_eq!(updated.refund_percentage, 0);
        assert_eq!(updated.refund_amount, Decimal::ZERO);
        assert_eq!(updated.refund_reason.as_deref(), Some("not eligible"));

        let calls = api.recorded();
        let patch = calls.iter().find(|(m, _, _)| m == "PATCH").unwrap();
        assert_eq!(
            patch.2,
            Some(json!({
                "action": "reject",
                "refundPercentage": 0,
                "refundReason": "not eligible"
            }))
        );

        let notification = executor.current_notification().unwrap();
        assert_eq!(notification.message, "Return request rejected successfully!");
    }

    #[tokio::test]
    async fn terminal_request_is_immutable() {
        let api = Arc::new(FakeApi::new());
        let mut record = pending_request("ret-1", 100.0, 1);
        record["status"] = json!("refunded");
        record["refundPercentage"] = json!(100);
        record["refundAmount"] = json!(100.0);
        let executor = executor_with(api.clone(), json!([record])).await;

        let before = executor.repository().get("ret-1").unwrap();

        let approve = executor.approve("ret-1", 50, None).await.unwrap_err();
        assert!(matches!(approve, ProcessError::InvalidTransition { .. }));
        let reject = executor.reject("ret-1", None).await.unwrap_err();
        assert!(matches!(reject, ProcessError::InvalidTransition { .. }));

        // Никаких PATCH-запросов и никаких локальных изменений
        assert!(api.recorded().iter().all(|(m, _, _)| m != "PATCH"));
        assert_eq!(executor.repository().get("ret-1").unwrap(), before);
    }

    #[tokio::test]
    async fn invalid_percentage_is_rejected_before_network() {
        let api = Arc::new(FakeApi::new());
        let executor = executor_with(api.clone(), json!([pending_request("ret-1", 100.0, 1)])).await;

        let error = executor.approve("ret-1", 101, None).await.unwrap_err();
        assert!(matches!(error, ProcessError::InvalidPercentage(101)));
        let error = executor.approve("ret-1", -5, None).await.unwrap_err();
        assert!(matches!(error, ProcessError::InvalidPercentage(-5)));

        assert!(api.recorded().iter().all(|(m, _, _)| m != "PATCH"));
    }

    #[tokio::test]
    async fn unknown_request_fails_fast() {
        let api = Arc::new(FakeApi::new());
        let executor = executor_with(api, json!([])).await;
        let error = executor.approve("ghost", 50, None).await.unwrap_err();
        assert!(matches!(error, ProcessError::UnknownRequest(_)));
    }

    #[tokio::test]
    async fn second_transition_for_same_id_is_blocked() {
        let api = Arc::new(FakeApi::new());
        let gate = api.gate("/api/returns/ret-1");
        api.respond(
            "PATCH",
            "/api/returns/ret-1",
            Ok(json!({ "refundAmount": 50.0 })),
        );
        let executor = Arc::new(
            executor_with(api.clone(), json!([pending_request("ret-1", 100.0, 1)])).await,
        );

        let first = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.approve("ret-1", 50, None).await })
        };
        // Первый вызов должен дойти до сети и повиснуть на барьере
        for _ in 0..50 {
            if executor.is_processing("ret-1") {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(executor.is_processing("ret-1"));

        let second = executor.approve("ret-1", 50, None).await.unwrap_err();
        assert!(matches!(second, ProcessError::AlreadyProcessing(_)));

        gate.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status, ReturnStatus::Refunded);
        assert!(!executor.is_processing("ret-1"));
    }

    #[tokio::test]
    async fn server_failure_leaves_state_unchanged() {
        let api = Arc::new(FakeApi::new());
        api.respond(
            "PATCH",
            "/api/returns/ret-1",
            Err(ApiError::Server {
                status: 500,
                message: "No payment ID found".to_string(),
            }),
        );
        let executor = executor_with(api, json!([pending_request("ret-1", 100.0, 1)])).await;

        let before = executor.repository().get("ret-1").unwrap();
        let error = executor.approve("ret-1", 50, None).await.unwrap_err();
        assert!(matches!(error, ProcessError::Api(ApiError::Server { .. })));

        let after = executor.repository().get("ret-1").unwrap();
        assert_eq!(after, before);
        assert_eq!(after.status, ReturnStatus::Pending);

        let notification = executor.current_notification().unwrap();
        assert_eq!(notification.kind, NotificationKind::Error);
        assert_eq!(
            notification.message,
            "Error: No payment information found for this order"
        );
        // Флаг снят - можно повторить попытку
        assert!(!executor.is_processing("ret-1"));
    }
}
