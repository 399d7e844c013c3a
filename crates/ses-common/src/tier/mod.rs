pub mod classifier;
pub mod eligibility;

pub use classifier::{classify_tier, engineer_tier, EmploymentType, Tier};
pub use eligibility::{
    is_eligible, tier_within_limit, validate_eligibility, SubcontractingTierLimit, TierViolation,
};
