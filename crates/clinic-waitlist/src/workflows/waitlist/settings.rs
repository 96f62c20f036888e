use chrono::{FixedOffset, Offset, Utc};

use super::scoring::{MatchScorer, ScoringWeights};

/// Tunables for the matching service.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchingSettings {
    pub weights: ScoringWeights,
    /// Wall-clock offset of the clinic, used to read a slot's weekday and hour.
    pub clinic_offset: FixedOffset,
    /// Size of the dashboard's top-matches list when the caller does not ask for one.
    pub top_matches_limit: usize,
}

impl Default for MatchingSettings {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            clinic_offset: Utc.fix(),
            top_matches_limit: 10,
        }
    }
}

impl MatchingSettings {
    pub fn scorer(&self) -> MatchScorer {
        MatchScorer::new(self.weights.clone(), self.clinic_offset)
    }
}
