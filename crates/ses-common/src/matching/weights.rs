/// 案件×エンジニアの総合スコア重み
/// スキル充足を主軸に、単価と稼働可否を同率で加点する
pub const MATCH_WEIGHTS: MatchWeights = MatchWeights {
    skills: 0.5,
    rate: 0.25,
    availability: 0.25,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchWeights {
    pub skills: f64,
    pub rate: f64,
    pub availability: f64,
}

impl MatchWeights {
    pub fn sum(&self) -> f64 {
        self.skills + self.rate + self.availability
    }
}

impl Default for MatchWeights {
    fn default() -> Self {
        MATCH_WEIGHTS
    }
}
