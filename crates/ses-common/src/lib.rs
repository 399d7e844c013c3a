pub mod api;
pub mod db;
pub mod logging;
pub mod matching;
pub mod reconciliation;
pub mod tier;

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

pub use reconciliation::{Invoice, InvoiceStatus, Payment, PaymentStatus};
pub use tier::{EmploymentType, SubcontractingTierLimit, Tier};

/// エンジニアの稼働状況
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AvailabilityStatus {
    #[default]
    Available,
    Assigned,
    Unavailable,
}

// Commonly used data models for tier and matching functions.
// Skill sets must be fully loaded before scoring; the core never fetches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Engineer {
    pub id: i64,
    pub full_name: String,
    pub employment_type: EmploymentType,
    pub company_id: Option<i64>,
    pub monthly_rate: Option<i64>,
    pub availability_status: AvailabilityStatus,
    pub skills: HashSet<i64>,
    pub is_active: bool,
}

impl Engineer {
    /// 商流の深さ。保存せず毎回導出する
    pub fn tier(&self) -> Tier {
        tier::engineer_tier(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub subcontracting_tier_limit: Option<SubcontractingTierLimit>,
    pub budget: Option<i64>,
    pub required_skills: HashSet<i64>,
}
