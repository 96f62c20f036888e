use serde::{Deserialize, Serialize};

use super::super::domain::Urgency;

/// Point values applied by the match scorer.
///
/// Preference penalties are subtracted from `base_score`; bonuses are tracked separately so the
/// breakdown shows both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub base_score: i32,
    pub business_bonus: i32,
    pub business_penalty: i32,
    pub practitioner_bonus: i32,
    pub practitioner_penalty: i32,
    pub time_of_day_bonus: i32,
    pub time_of_day_penalty: i32,
    pub urgency: UrgencyBonuses,
    pub wait_points_per_day: i32,
    pub max_wait_bonus: i32,
    /// Waits strictly longer than this many days are called out in the reasons.
    pub long_wait_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrgencyBonuses {
    pub low: i32,
    pub normal: i32,
    pub high: i32,
    pub urgent: i32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base_score: 100,
            business_bonus: 20,
            business_penalty: 30,
            practitioner_bonus: 25,
            practitioner_penalty: 20,
            time_of_day_bonus: 15,
            time_of_day_penalty: 15,
            urgency: UrgencyBonuses {
                low: 0,
                normal: 10,
                high: 25,
                urgent: 40,
            },
            wait_points_per_day: 2,
            max_wait_bonus: 30,
            long_wait_days: 7,
        }
    }
}

impl ScoringWeights {
    pub fn urgency_bonus(&self, urgency: Urgency) -> i32 {
        match urgency {
            Urgency::Low => self.urgency.low,
            Urgency::Normal => self.urgency.normal,
            Urgency::High => self.urgency.high,
            Urgency::Urgent => self.urgency.urgent,
        }
    }

    pub fn wait_time_bonus(&self, days_waiting: i64) -> i32 {
        let days = i32::try_from(days_waiting.max(0)).unwrap_or(i32::MAX);
        days.saturating_mul(self.wait_points_per_day).min(self.max_wait_bonus)
    }
}
