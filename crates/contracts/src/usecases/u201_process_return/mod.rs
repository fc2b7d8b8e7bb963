pub mod request;
pub mod response;

pub use request::{DecisionAction, DecisionRequest};
pub use response::{ConfirmedDecision, DecisionOutcome};

use crate::usecases::common::UseCaseMetadata;

pub struct ProcessReturn;

impl UseCaseMetadata for ProcessReturn {
    fn usecase_index() -> &'static str {
        "u201"
    }

    fn usecase_name() -> &'static str {
        "process_return"
    }

    fn display_name() -> &'static str {
        "Process return request"
    }

    fn description() -> &'static str {
        "Approve (with partial refund) or reject a customer return request"
    }
}
