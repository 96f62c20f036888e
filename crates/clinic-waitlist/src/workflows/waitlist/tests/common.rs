use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::workflows::waitlist::clock::FixedClock;
use crate::workflows::waitlist::domain::{
    Appointment, AppointmentTypeId, AppointmentTypeSummary, AvailableSlot, BusinessId,
    BusinessSummary, PatientId, PatientSummary, PractitionerId, PractitionerSummary, SlotId,
    Urgency, WaitlistEntry, WaitlistEntryId, WaitlistPreferences, WaitlistStatus,
};
use crate::workflows::waitlist::repository::{
    BookingCommand, BookingStore, RepositoryError, WaitlistRepository,
};
use crate::workflows::waitlist::scoring::MatchScorer;
use crate::workflows::waitlist::settings::MatchingSettings;
use crate::workflows::waitlist::store::InMemoryClinicStore;
use crate::workflows::waitlist::WaitlistMatchingService;

/// Saturday 2025-03-01 08:00 UTC.
pub(super) fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap()
}

pub(super) fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, day, hour, 0, 0).unwrap()
}

/// Monday 2025-03-03 10:00 UTC.
pub(super) fn monday_morning() -> DateTime<Utc> {
    at(3, 10)
}

/// Tuesday 2025-03-04 10:00 UTC.
pub(super) fn tuesday_morning() -> DateTime<Utc> {
    at(4, 10)
}

pub(super) fn initial_consult() -> AppointmentTypeSummary {
    AppointmentTypeSummary {
        id: AppointmentTypeId::from("type-initial"),
        name: "Initial Consultation".to_string(),
        duration_minutes: 60,
        color: "#4F46E5".to_string(),
    }
}

pub(super) fn massage() -> AppointmentTypeSummary {
    AppointmentTypeSummary {
        id: AppointmentTypeId::from("type-massage"),
        name: "Massage Therapy".to_string(),
        duration_minutes: 60,
        color: "#F59E0B".to_string(),
    }
}

pub(super) fn dr_johnson() -> PractitionerSummary {
    PractitionerSummary {
        id: PractitionerId::from("prac-1"),
        first_name: "Sarah".to_string(),
        last_name: "Johnson".to_string(),
        title: Some("Dr".to_string()),
        designation: Some("Physiotherapist".to_string()),
    }
}

pub(super) fn michael_chen() -> PractitionerSummary {
    PractitionerSummary {
        id: PractitionerId::from("prac-2"),
        first_name: "Michael".to_string(),
        last_name: "Chen".to_string(),
        title: None,
        designation: Some("Massage Therapist".to_string()),
    }
}

pub(super) fn main_clinic() -> BusinessSummary {
    BusinessSummary {
        id: BusinessId::from("biz-main"),
        name: "Main Clinic".to_string(),
        city: "Melbourne".to_string(),
    }
}

pub(super) fn north_branch() -> BusinessSummary {
    BusinessSummary {
        id: BusinessId::from("biz-north"),
        name: "North Branch".to_string(),
        city: "Preston".to_string(),
    }
}

/// Active initial-consultation entry with no preferences, created `days_waiting` days before
/// [`now`].
pub(super) fn entry(id: &str, urgency: Urgency, days_waiting: i64) -> WaitlistEntry {
    WaitlistEntry {
        id: WaitlistEntryId::from(id),
        patient: PatientSummary {
            id: PatientId(format!("patient-{id}")),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: Some("john.smith@example.com".to_string()),
            phone: None,
        },
        appointment_type: initial_consult(),
        urgency,
        status: WaitlistStatus::Active,
        preferences: WaitlistPreferences::default(),
        notes: None,
        created_at: now() - Duration::days(days_waiting),
        expires_at: now() + Duration::days(14),
        booked_at: None,
    }
}

/// Unbooked initial-consultation slot with Dr Johnson at the main clinic.
pub(super) fn slot(id: &str, starts_at: DateTime<Utc>) -> AvailableSlot {
    AvailableSlot {
        id: SlotId::from(id),
        practitioner: dr_johnson(),
        business: main_clinic(),
        appointment_type: initial_consult(),
        starts_at,
        ends_at: starts_at + Duration::minutes(60),
        duration_minutes: 60,
        is_booked: false,
    }
}

pub(super) fn scorer() -> MatchScorer {
    MatchingSettings::default().scorer()
}

pub(super) fn build_service(
    entries: Vec<WaitlistEntry>,
    slots: Vec<AvailableSlot>,
) -> (
    WaitlistMatchingService<InMemoryClinicStore, InMemoryClinicStore>,
    Arc<InMemoryClinicStore>,
) {
    let store = Arc::new(InMemoryClinicStore::with_records(entries, slots));
    let service = WaitlistMatchingService::with_clock(
        store.clone(),
        store.clone(),
        MatchingSettings::default(),
        Arc::new(FixedClock(now())),
    );
    (service, store)
}

/// Store whose commit always loses the race for the slot.
#[derive(Default, Clone)]
pub(super) struct ConflictBookings {
    pub(super) attempts: Arc<Mutex<Vec<BookingCommand>>>,
}

impl BookingStore for ConflictBookings {
    fn commit_booking(&self, command: BookingCommand) -> Result<Appointment, RepositoryError> {
        let slot_id = command.slot_id.clone();
        self.attempts
            .lock()
            .expect("attempts mutex poisoned")
            .push(command);
        Err(RepositoryError::Conflict(format!(
            "slot {slot_id} claimed concurrently"
        )))
    }

    fn appointments(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableBookings;

impl BookingStore for UnavailableBookings {
    fn commit_booking(&self, _command: BookingCommand) -> Result<Appointment, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn appointments(&self) -> Result<Vec<Appointment>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct UnavailableRepository;

impl WaitlistRepository for UnavailableRepository {
    fn active_entries(&self, _now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn entries(
        &self,
        _status: Option<WaitlistStatus>,
    ) -> Result<Vec<WaitlistEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_entry(
        &self,
        _id: &WaitlistEntryId,
    ) -> Result<Option<WaitlistEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn open_slots(
        &self,
        _appointment_type: &AppointmentTypeId,
        _now: DateTime<Utc>,
    ) -> Result<Vec<AvailableSlot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn slots(&self) -> Result<Vec<AvailableSlot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch_slot(&self, _id: &SlotId) -> Result<Option<AvailableSlot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
