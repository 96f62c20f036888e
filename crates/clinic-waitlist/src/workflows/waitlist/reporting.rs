use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    Appointment, AppointmentTypeId, AppointmentTypeSummary, AvailableSlot, BusinessId,
    PractitionerId, PractitionerSummary, Urgency, WaitlistEntry, WaitlistStatus,
};

/// Headline numbers for the staff dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardOverview {
    pub active_waitlist: usize,
    pub urgent_waitlist: usize,
    pub available_slots: usize,
    pub potential_matches: usize,
    pub recent_bookings_from_waitlist: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WaitlistStats {
    pub total: usize,
    pub active: usize,
    pub booked: usize,
    pub expired: usize,
    pub cancelled: usize,
    /// Active entries per urgency tier; every tier is present, zero included.
    pub by_urgency: BTreeMap<&'static str, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotStats {
    pub total: usize,
    pub available: usize,
    pub booked: usize,
    pub next_week_available: usize,
}

fn one_week() -> Duration {
    Duration::days(7)
}

pub fn overview(
    entries: &[WaitlistEntry],
    slots: &[AvailableSlot],
    appointments: &[Appointment],
    potential_matches: usize,
    now: DateTime<Utc>,
) -> DashboardOverview {
    let active: Vec<&WaitlistEntry> = entries
        .iter()
        .filter(|entry| entry.status == WaitlistStatus::Active)
        .collect();
    let recent_cutoff = now - one_week();

    DashboardOverview {
        active_waitlist: active.len(),
        urgent_waitlist: active
            .iter()
            .filter(|entry| matches!(entry.urgency, Urgency::Urgent | Urgency::High))
            .count(),
        available_slots: slots.iter().filter(|slot| slot.is_open(now)).count(),
        potential_matches,
        recent_bookings_from_waitlist: appointments
            .iter()
            .filter(|appointment| {
                appointment.booked_from_waitlist.is_some()
                    && appointment.created_at >= recent_cutoff
            })
            .count(),
    }
}

pub fn waitlist_stats(entries: &[WaitlistEntry]) -> WaitlistStats {
    let count = |status: WaitlistStatus| {
        entries
            .iter()
            .filter(|entry| entry.status == status)
            .count()
    };

    let mut by_urgency: BTreeMap<&'static str, usize> = Urgency::ALL
        .iter()
        .map(|urgency| (urgency.label(), 0))
        .collect();
    for entry in entries
        .iter()
        .filter(|entry| entry.status == WaitlistStatus::Active)
    {
        *by_urgency.entry(entry.urgency.label()).or_insert(0) += 1;
    }

    WaitlistStats {
        total: entries.len(),
        active: count(WaitlistStatus::Active),
        booked: count(WaitlistStatus::Booked),
        expired: count(WaitlistStatus::Expired),
        cancelled: count(WaitlistStatus::Cancelled),
        by_urgency,
    }
}

pub fn slot_stats(slots: &[AvailableSlot], now: DateTime<Utc>) -> SlotStats {
    let horizon = now + one_week();
    SlotStats {
        total: slots.len(),
        available: slots.iter().filter(|slot| slot.is_open(now)).count(),
        booked: slots.iter().filter(|slot| slot.is_booked).count(),
        next_week_available: slots
            .iter()
            .filter(|slot| slot.is_open(now) && slot.starts_at <= horizon)
            .count(),
    }
}

/// Open future slots held by one practitioner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PractitionerAvailability {
    #[serde(flatten)]
    pub practitioner: PractitionerSummary,
    pub available_slots: usize,
}

/// Supply and demand for one appointment type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppointmentTypeDemand {
    #[serde(flatten)]
    pub appointment_type: AppointmentTypeSummary,
    pub available_slots: usize,
    pub active_waitlist: usize,
}

/// Every practitioner seen on a slot, in id order, zero counts included.
pub fn practitioner_availability(
    slots: &[AvailableSlot],
    now: DateTime<Utc>,
) -> Vec<PractitionerAvailability> {
    let mut rows: BTreeMap<PractitionerId, PractitionerAvailability> = BTreeMap::new();
    for slot in slots {
        let row = rows
            .entry(slot.practitioner.id.clone())
            .or_insert_with(|| PractitionerAvailability {
                practitioner: slot.practitioner.clone(),
                available_slots: 0,
            });
        if slot.is_open(now) {
            row.available_slots += 1;
        }
    }
    rows.into_values().collect()
}

/// Every appointment type seen on an entry or a slot, in id order.
pub fn appointment_type_demand(
    entries: &[WaitlistEntry],
    slots: &[AvailableSlot],
    now: DateTime<Utc>,
) -> Vec<AppointmentTypeDemand> {
    let mut rows: BTreeMap<AppointmentTypeId, AppointmentTypeDemand> = BTreeMap::new();

    for slot in slots {
        let row = demand_row(&mut rows, &slot.appointment_type);
        if slot.is_open(now) {
            row.available_slots += 1;
        }
    }
    for entry in entries {
        let row = demand_row(&mut rows, &entry.appointment_type);
        if entry.status == WaitlistStatus::Active {
            row.active_waitlist += 1;
        }
    }

    rows.into_values().collect()
}

fn demand_row<'a>(
    rows: &'a mut BTreeMap<AppointmentTypeId, AppointmentTypeDemand>,
    kind: &AppointmentTypeSummary,
) -> &'a mut AppointmentTypeDemand {
    rows.entry(kind.id.clone())
        .or_insert_with(|| AppointmentTypeDemand {
            appointment_type: kind.clone(),
            available_slots: 0,
            active_waitlist: 0,
        })
}

/// Criteria for the slot listing. Unset fields do not constrain; booked slots are hidden unless
/// `include_booked` is set. `from` and `to` are inclusive bounds on the start time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SlotFilter {
    pub practitioner_id: Option<PractitionerId>,
    pub business_id: Option<BusinessId>,
    pub appointment_type_id: Option<AppointmentTypeId>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    #[serde(default)]
    pub include_booked: bool,
}

impl SlotFilter {
    pub fn matches(&self, slot: &AvailableSlot) -> bool {
        (self.include_booked || !slot.is_booked)
            && self
                .practitioner_id
                .as_ref()
                .map_or(true, |id| *id == slot.practitioner.id)
            && self
                .business_id
                .as_ref()
                .map_or(true, |id| *id == slot.business.id)
            && self
                .appointment_type_id
                .as_ref()
                .map_or(true, |id| *id == slot.appointment_type.id)
            && self.from.map_or(true, |from| slot.starts_at >= from)
            && self.to.map_or(true, |to| slot.starts_at <= to)
    }
}
