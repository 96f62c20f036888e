use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, FixedOffset, Timelike, Utc};

use super::super::domain::{AvailableSlot, DayOfWeek, TimeOfDay, Urgency, WaitlistEntry};
use super::weights::ScoringWeights;
use super::{MatchReason, MatchScore, ScoreBreakdown};

/// How a slot attribute relates to one of the entry's preference sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PreferenceFit {
    Unconstrained,
    Matched,
    Mismatched,
}

pub(crate) fn preference_fit<T: Ord>(preferred: &BTreeSet<T>, actual: &T) -> PreferenceFit {
    if preferred.is_empty() {
        PreferenceFit::Unconstrained
    } else if preferred.contains(actual) {
        PreferenceFit::Matched
    } else {
        PreferenceFit::Mismatched
    }
}

pub(crate) fn score_pair(
    entry: &WaitlistEntry,
    slot: &AvailableSlot,
    weights: &ScoringWeights,
    clinic_offset: &FixedOffset,
    now: DateTime<Utc>,
) -> MatchScore {
    let local_start = slot.starts_at.with_timezone(clinic_offset);
    let day = DayOfWeek::from(local_start.weekday());
    let preferences = &entry.preferences;

    // Day availability is a hard filter; nothing else is scored for an unavailable day.
    let day_fit = preference_fit(&preferences.available_days, &day);
    if day_fit == PreferenceFit::Mismatched {
        return MatchScore {
            score: 0,
            breakdown: ScoreBreakdown::default(),
            reasons: vec![MatchReason::DayNotAvailable],
        };
    }

    let mut reasons = Vec::new();
    let mut base_score = weights.base_score;
    let mut business_bonus = 0;
    let mut practitioner_bonus = 0;
    let mut time_of_day_bonus = 0;

    if day_fit == PreferenceFit::Matched {
        reasons.push(MatchReason::DayAvailable(day));
    }

    match preference_fit(&preferences.preferred_businesses, &slot.business.id) {
        PreferenceFit::Matched => {
            business_bonus = weights.business_bonus;
            reasons.push(MatchReason::PreferredLocation(slot.business.name.clone()));
        }
        PreferenceFit::Mismatched => base_score -= weights.business_penalty,
        PreferenceFit::Unconstrained => {}
    }

    match preference_fit(&preferences.preferred_practitioners, &slot.practitioner.id) {
        PreferenceFit::Matched => {
            practitioner_bonus = weights.practitioner_bonus;
            reasons.push(MatchReason::PreferredPractitioner(
                slot.practitioner.short_name(),
            ));
        }
        PreferenceFit::Mismatched => base_score -= weights.practitioner_penalty,
        PreferenceFit::Unconstrained => {}
    }

    let time_of_day = TimeOfDay::from_hour(local_start.hour());
    match preference_fit(&preferences.preferred_times, &time_of_day) {
        PreferenceFit::Matched => {
            time_of_day_bonus = weights.time_of_day_bonus;
            reasons.push(MatchReason::PreferredTime(time_of_day));
        }
        PreferenceFit::Mismatched => base_score -= weights.time_of_day_penalty,
        PreferenceFit::Unconstrained => {}
    }

    let urgency_bonus = weights.urgency_bonus(entry.urgency);
    if matches!(entry.urgency, Urgency::Urgent | Urgency::High) {
        reasons.push(MatchReason::Priority(entry.urgency));
    }

    let days_waiting = (now - entry.created_at).num_days().max(0);
    let wait_time_bonus = weights.wait_time_bonus(days_waiting);
    if days_waiting > weights.long_wait_days {
        reasons.push(MatchReason::LongWait { days: days_waiting });
    }

    let total_score = (base_score
        + business_bonus
        + practitioner_bonus
        + time_of_day_bonus
        + urgency_bonus
        + wait_time_bonus)
        .max(0);

    MatchScore {
        score: total_score,
        breakdown: ScoreBreakdown {
            base_score,
            business_bonus,
            practitioner_bonus,
            time_of_day_bonus,
            urgency_bonus,
            wait_time_bonus,
            total_score,
        },
        reasons,
    }
}
