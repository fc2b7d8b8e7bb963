use serde::{Deserialize, Serialize};

/// Решение администратора по заявке
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionAction {
    Approve,
    Reject,
}

impl DecisionAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecisionAction::Approve => "approve",
            DecisionAction::Reject => "reject",
        }
    }
}

/// Тело PATCH /api/returns/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionRequest {
    pub action: DecisionAction,
    /// Для reject всегда 0
    pub refund_percentage: i32,
    /// Пустая заметка не отправляется
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refund_reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_body_shape() {
        let request = DecisionRequest {
            action: DecisionAction::Approve,
            refund_percentage: 75,
            refund_reason: Some("partial - worn".to_string()),
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({
                "action": "approve",
                "refundPercentage": 75,
                "refundReason": "partial - worn"
            })
        );
    }

    #[test]
    fn empty_note_is_omitted() {
        let request = DecisionRequest {
            action: DecisionAction::Reject,
            refund_percentage: 0,
            refund_reason: None,
        };
        let wire = serde_json::to_value(&request).unwrap();
        assert_eq!(
            wire,
            serde_json::json!({ "action": "reject", "refundPercentage": 0 })
        );
    }
}
