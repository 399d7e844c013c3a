pub mod pipeline;
pub mod scoring;
pub mod weights;

pub use pipeline::{run_matching, MatchingResult};
pub use scoring::{score_match, score_match_with, MatchScore};
pub use weights::{MatchWeights, MATCH_WEIGHTS};
