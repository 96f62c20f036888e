mod rules;
mod weights;

pub use weights::{ScoringWeights, UrgencyBonuses};

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{AvailableSlot, DayOfWeek, TimeOfDay, Urgency, WaitlistEntry};

/// Stateless scorer applying the weights to one (entry, slot) pair.
///
/// Day-of-week and time-of-day are read in the clinic's wall-clock offset. The caller is
/// responsible for pairing entries only with slots of the same appointment type.
#[derive(Debug, Clone)]
pub struct MatchScorer {
    weights: ScoringWeights,
    clinic_offset: FixedOffset,
}

impl MatchScorer {
    pub fn new(weights: ScoringWeights, clinic_offset: FixedOffset) -> Self {
        Self {
            weights,
            clinic_offset,
        }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn score(
        &self,
        entry: &WaitlistEntry,
        slot: &AvailableSlot,
        now: DateTime<Utc>,
    ) -> MatchScore {
        rules::score_pair(entry, slot, &self.weights, &self.clinic_offset, now)
    }
}

/// Every named contribution to a match score.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub base_score: i32,
    pub business_bonus: i32,
    pub practitioner_bonus: i32,
    pub time_of_day_bonus: i32,
    pub urgency_bonus: i32,
    pub wait_time_bonus: i32,
    pub total_score: i32,
}

/// Why a pairing scored the way it did, in scoring order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum MatchReason {
    DayNotAvailable,
    DayAvailable(DayOfWeek),
    PreferredLocation(String),
    PreferredPractitioner(String),
    PreferredTime(TimeOfDay),
    Priority(Urgency),
    LongWait { days: i64 },
}

impl MatchReason {
    pub fn summary(&self) -> String {
        match self {
            MatchReason::DayNotAvailable => "Day not available".to_string(),
            MatchReason::DayAvailable(day) => format!("Available on {}", day.label()),
            MatchReason::PreferredLocation(name) => format!("Preferred location: {name}"),
            MatchReason::PreferredPractitioner(name) => {
                format!("Preferred practitioner: {name}")
            }
            MatchReason::PreferredTime(time) => format!("Preferred time: {}", time.label()),
            MatchReason::Priority(Urgency::Urgent) => "Urgent priority".to_string(),
            MatchReason::Priority(Urgency::High) => "High priority".to_string(),
            MatchReason::Priority(other) => format!("{} priority", other.label()),
            MatchReason::LongWait { days } => format!("Waiting {days} days"),
        }
    }
}

/// Output of scoring a single pairing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchScore {
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<MatchReason>,
}

impl MatchScore {
    pub fn is_match(&self) -> bool {
        self.score > 0
    }

    pub fn reason_summaries(&self) -> Vec<String> {
        self.reasons.iter().map(MatchReason::summary).collect()
    }
}
