use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

use crate::Engineer;

/// 雇用区分（DB の employment_type と同じ値）
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EmploymentType {
    /// 自社正社員（プロパー）
    #[default]
    Proper,
    /// 一社先プロパー
    FirstTierProper,
    /// 個人事業主（フリーランス）
    Freelancer,
    /// 一社先個人事業主
    FirstTierFreelancer,
}

/// 商流の深さ（0=プロパー, 1=一社先, 2=二社先）
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    Proper,
    FirstTier,
    SecondTier,
}

impl Tier {
    pub fn depth(self) -> u8 {
        match self {
            Tier::Proper => 0,
            Tier::FirstTier => 1,
            Tier::SecondTier => 2,
        }
    }

    /// 画面・エラーメッセージ用の表示名
    pub fn label(self) -> &'static str {
        match self {
            Tier::Proper => "プロパー",
            Tier::FirstTier => "一社先（プロパー/直接契約フリーランス）",
            Tier::SecondTier => "二社先（パートナー企業経由/一社先個人事業主）",
        }
    }
}

impl Serialize for Tier {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.depth())
    }
}

/// 雇用区分と所属会社の有無から tier を決める
///
/// | employment_type       | company_id | tier |
/// |-----------------------|------------|------|
/// | proper                | any        | 0    |
/// | first_tier_proper     | any        | 1    |
/// | freelancer            | なし       | 1    |
/// | freelancer            | あり       | 2    |
/// | first_tier_freelancer | any        | 2    |
pub fn classify_tier(employment_type: EmploymentType, has_company: bool) -> Tier {
    match (employment_type, has_company) {
        (EmploymentType::Proper, _) => Tier::Proper,
        (EmploymentType::FirstTierProper, _) => Tier::FirstTier,
        (EmploymentType::Freelancer, false) => Tier::FirstTier,
        (EmploymentType::Freelancer, true) => Tier::SecondTier,
        (EmploymentType::FirstTierFreelancer, _) => Tier::SecondTier,
    }
}

pub fn engineer_tier(engineer: &Engineer) -> Tier {
    classify_tier(engineer.employment_type, engineer.company_id.is_some())
}
