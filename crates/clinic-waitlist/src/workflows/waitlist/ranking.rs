use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{AvailableSlot, WaitlistEntry};
use super::scoring::{MatchReason, MatchScorer, ScoreBreakdown};

/// A scored pairing of one waitlist entry with one slot. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub entry: WaitlistEntry,
    pub slot: AvailableSlot,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub reasons: Vec<MatchReason>,
}

impl MatchResult {
    pub fn match_id(&self) -> String {
        format!("{}-{}", self.entry.id, self.slot.id)
    }
}

/// Whether the pair is eligible for scoring at all.
pub fn is_candidate(entry: &WaitlistEntry, slot: &AvailableSlot, now: DateTime<Utc>) -> bool {
    entry.is_matchable(now)
        && slot.is_open(now)
        && slot.appointment_type.id == entry.appointment_type.id
}

/// Enumeration order for entries: most urgent first, then longest waiting.
pub fn order_entries(entries: &mut [WaitlistEntry]) {
    entries.sort_by(|a, b| {
        b.urgency
            .cmp(&a.urgency)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

pub fn order_slots(slots: &mut [AvailableSlot]) {
    slots.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));
}

/// Scores every eligible slot for one entry, keeping positive scores in slot order.
pub fn score_entry(
    scorer: &MatchScorer,
    entry: &WaitlistEntry,
    slots: &[AvailableSlot],
    now: DateTime<Utc>,
) -> Vec<MatchResult> {
    slots
        .iter()
        .filter(|slot| is_candidate(entry, slot, now))
        .filter_map(|slot| {
            let scored = scorer.score(entry, slot, now);
            scored.is_match().then(|| MatchResult {
                entry: entry.clone(),
                slot: slot.clone(),
                score: scored.score,
                breakdown: scored.breakdown,
                reasons: scored.reasons,
            })
        })
        .collect()
}

/// Sorts by score, highest first. The sort is stable, so equal scores keep enumeration order
/// (urgency, entry age, slot start).
pub fn rank(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| b.score.cmp(&a.score));
}
