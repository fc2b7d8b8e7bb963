use rust_decimal::Decimal;
use serde::Deserialize;

use crate::domain::a001_return_request::aggregate::ReturnStatus;

/// Подтвержденные сервером поля решения.
/// API не гарантирует полный состав, поэтому все поля опциональны.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DecisionOutcome {
    pub status: Option<ReturnStatus>,
    pub refund_percentage: Option<i32>,
    pub refund_amount: Option<Decimal>,
    pub refund_reason: Option<String>,
}

impl DecisionOutcome {
    pub fn has_confirmed_fields(&self) -> bool {
        self.status.is_some()
            || self.refund_percentage.is_some()
            || self.refund_amount.is_some()
            || self.refund_reason.is_some()
    }
}

/// Итоговые значения решения после слияния ответа сервера
/// с локальным предрасчетом (серверные значения приоритетны)
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmedDecision {
    pub status: ReturnStatus,
    pub refund_percentage: i32,
    pub refund_amount: Decimal,
    pub refund_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_outcome_parses() {
        let outcome: DecisionOutcome =
            serde_json::from_value(serde_json::json!({ "refundAmount": 75.0 })).unwrap();
        assert!(outcome.has_confirmed_fields());
        assert_eq!(outcome.refund_amount, Some("75".parse().unwrap()));
        assert_eq!(outcome.status, None);
    }

    #[test]
    fn unrelated_fields_are_ignored() {
        let outcome: DecisionOutcome =
            serde_json::from_value(serde_json::json!({ "message": "ok" })).unwrap();
        assert!(!outcome.has_confirmed_fields());
    }
}
