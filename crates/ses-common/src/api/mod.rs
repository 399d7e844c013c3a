pub mod eligibility;
pub mod matching;
pub mod reconciliation;

pub use eligibility::EligibilityResponse;
pub use matching::{MatchingResultsPage, MatchingRunRequest, MatchingRunResponse};
pub use reconciliation::{
    ConfirmResponse, ManualMatchRequest, PaymentActionResponse, ReconcileRunResponse,
};
