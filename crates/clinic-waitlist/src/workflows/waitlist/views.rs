//! Read-only projections rendered by the HTTP router.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{
    AppointmentId, AppointmentTypeSummary, AvailableSlot, BusinessId, BusinessSummary, DayOfWeek,
    PatientId, PatientSummary, PractitionerId, PractitionerSummary, SlotId, TimeOfDay, Urgency,
    WaitlistEntry, WaitlistEntryId, WaitlistStatus,
};
use super::ranking::MatchResult;
use super::reporting::PractitionerAvailability;
use super::scoring::ScoreBreakdown;

#[derive(Debug, Clone, Serialize)]
pub struct PatientView {
    pub id: PatientId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl From<&PatientSummary> for PatientView {
    fn from(patient: &PatientSummary) -> Self {
        Self {
            id: patient.id.clone(),
            name: patient.full_name(),
            email: patient.email.clone(),
            phone: patient.phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PractitionerView {
    pub id: PractitionerId,
    pub name: String,
    pub designation: Option<String>,
}

impl From<&PractitionerSummary> for PractitionerView {
    fn from(practitioner: &PractitionerSummary) -> Self {
        Self {
            id: practitioner.id.clone(),
            name: practitioner.full_name(),
            designation: practitioner.designation.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchedEntryView {
    pub id: WaitlistEntryId,
    pub patient: PatientView,
    pub appointment_type: AppointmentTypeSummary,
    pub urgency: Urgency,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub id: SlotId,
    pub practitioner: PractitionerView,
    pub business: BusinessSummary,
    pub appointment_type: AppointmentTypeSummary,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub duration_minutes: u32,
}

impl From<&AvailableSlot> for SlotView {
    fn from(slot: &AvailableSlot) -> Self {
        Self {
            id: slot.id.clone(),
            practitioner: PractitionerView::from(&slot.practitioner),
            business: slot.business.clone(),
            appointment_type: slot.appointment_type.clone(),
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
            duration_minutes: slot.duration_minutes,
        }
    }
}

/// Ranked match as shown on the matching board.
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    pub id: String,
    pub score: i32,
    pub breakdown: ScoreBreakdown,
    pub match_reasons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waitlist_entry: Option<MatchedEntryView>,
    pub slot: SlotView,
}

impl MatchView {
    pub fn from_match(result: &MatchResult) -> Self {
        let entry = &result.entry;
        Self {
            waitlist_entry: Some(MatchedEntryView {
                id: entry.id.clone(),
                patient: PatientView::from(&entry.patient),
                appointment_type: entry.appointment_type.clone(),
                urgency: entry.urgency,
                notes: entry.notes.clone(),
                created_at: entry.created_at,
                expires_at: entry.expires_at,
            }),
            ..Self::without_entry(result)
        }
    }

    /// Variant used when the entry is already implied by the request.
    pub fn without_entry(result: &MatchResult) -> Self {
        Self {
            id: result.match_id(),
            score: result.score,
            breakdown: result.breakdown,
            match_reasons: result.reasons.iter().map(|reason| reason.summary()).collect(),
            waitlist_entry: None,
            slot: SlotView::from(&result.slot),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchListView {
    pub count: usize,
    pub matches: Vec<MatchView>,
}

impl MatchListView {
    pub fn new(matches: &[MatchResult]) -> Self {
        Self {
            count: matches.len(),
            matches: matches.iter().map(MatchView::from_match).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryMatchesView {
    pub waitlist_entry_id: WaitlistEntryId,
    pub count: usize,
    pub matches: Vec<MatchView>,
}

impl EntryMatchesView {
    pub fn new(entry_id: WaitlistEntryId, matches: &[MatchResult]) -> Self {
        Self {
            waitlist_entry_id: entry_id,
            count: matches.len(),
            matches: matches.iter().map(MatchView::without_entry).collect(),
        }
    }
}

/// Compact row for the dashboard's top-matches card.
#[derive(Debug, Clone, Serialize)]
pub struct TopMatchView {
    pub id: String,
    pub score: i32,
    pub match_reasons: Vec<String>,
    pub patient_name: String,
    pub appointment_type: String,
    pub urgency: Urgency,
    pub practitioner: String,
    pub business: String,
    pub starts_at: DateTime<Utc>,
    pub waitlist_entry_id: WaitlistEntryId,
    pub slot_id: SlotId,
}

impl From<&MatchResult> for TopMatchView {
    fn from(result: &MatchResult) -> Self {
        Self {
            id: result.match_id(),
            score: result.score,
            match_reasons: result.reasons.iter().map(|reason| reason.summary()).collect(),
            patient_name: result.entry.patient.full_name(),
            appointment_type: result.entry.appointment_type.name.clone(),
            urgency: result.entry.urgency,
            practitioner: result.slot.practitioner.short_name(),
            business: result.slot.business.name.clone(),
            starts_at: result.slot.starts_at,
            waitlist_entry_id: result.entry.id.clone(),
            slot_id: result.slot.id.clone(),
        }
    }
}

/// Waitlist row including the entry's preferences.
#[derive(Debug, Clone, Serialize)]
pub struct WaitlistEntryView {
    pub id: WaitlistEntryId,
    pub patient: PatientView,
    pub appointment_type: AppointmentTypeSummary,
    pub urgency: Urgency,
    pub status: WaitlistStatus,
    pub notes: Option<String>,
    pub available_days: Vec<DayOfWeek>,
    pub preferred_times_of_day: Vec<TimeOfDay>,
    pub preferred_practitioner_ids: Vec<PractitionerId>,
    pub preferred_business_ids: Vec<BusinessId>,
    pub outside_business_hours_only: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub booked_at: Option<DateTime<Utc>>,
}

impl From<&WaitlistEntry> for WaitlistEntryView {
    fn from(entry: &WaitlistEntry) -> Self {
        let preferences = &entry.preferences;
        Self {
            id: entry.id.clone(),
            patient: PatientView::from(&entry.patient),
            appointment_type: entry.appointment_type.clone(),
            urgency: entry.urgency,
            status: entry.status,
            notes: entry.notes.clone(),
            available_days: preferences.available_days.iter().copied().collect(),
            preferred_times_of_day: preferences.preferred_times.iter().copied().collect(),
            preferred_practitioner_ids: preferences
                .preferred_practitioners
                .iter()
                .cloned()
                .collect(),
            preferred_business_ids: preferences.preferred_businesses.iter().cloned().collect(),
            outside_business_hours_only: preferences.outside_business_hours_only,
            created_at: entry.created_at,
            expires_at: entry.expires_at,
            booked_at: entry.booked_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WaitlistListView {
    pub count: usize,
    pub entries: Vec<WaitlistEntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingConfirmationView {
    pub success: bool,
    pub appointment_id: AppointmentId,
    pub message: &'static str,
}

/// Slot listing row; unlike match rows it can include booked slots.
#[derive(Debug, Clone, Serialize)]
pub struct SlotRowView {
    #[serde(flatten)]
    pub slot: SlotView,
    pub is_booked: bool,
}

impl From<&AvailableSlot> for SlotRowView {
    fn from(slot: &AvailableSlot) -> Self {
        Self {
            slot: SlotView::from(slot),
            is_booked: slot.is_booked,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotListView {
    pub count: usize,
    pub slots: Vec<SlotRowView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PractitionerSlotsView {
    pub practitioner: PractitionerView,
    pub available_slots: usize,
}

impl From<&PractitionerAvailability> for PractitionerSlotsView {
    fn from(row: &PractitionerAvailability) -> Self {
        Self {
            practitioner: PractitionerView::from(&row.practitioner),
            available_slots: row.available_slots,
        }
    }
}
