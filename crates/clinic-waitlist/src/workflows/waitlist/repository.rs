use chrono::{DateTime, Utc};

use super::domain::{
    Appointment, AppointmentTypeId, AvailableSlot, BusinessId, PatientId, PractitionerId, SlotId,
    WaitlistEntry, WaitlistEntryId, WaitlistStatus,
};

/// Read side of the data store consumed by the ranking and booking components.
pub trait WaitlistRepository: Send + Sync {
    /// Active, unexpired entries ordered by urgency (highest first), then oldest first.
    fn active_entries(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>, RepositoryError>;
    /// All entries, optionally restricted to one status, in the same order as `active_entries`.
    fn entries(
        &self,
        status: Option<WaitlistStatus>,
    ) -> Result<Vec<WaitlistEntry>, RepositoryError>;
    fn fetch_entry(&self, id: &WaitlistEntryId) -> Result<Option<WaitlistEntry>, RepositoryError>;
    /// Unbooked slots of the given type starting after `now`, earliest first.
    fn open_slots(
        &self,
        appointment_type: &AppointmentTypeId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AvailableSlot>, RepositoryError>;
    fn slots(&self) -> Result<Vec<AvailableSlot>, RepositoryError>;
    fn fetch_slot(&self, id: &SlotId) -> Result<Option<AvailableSlot>, RepositoryError>;
}

/// Transactional write side. `commit_booking` must apply the appointment insert, the slot's
/// booked flag, and the entry transition as one unit, refusing with `Conflict` when the slot
/// has already been claimed.
pub trait BookingStore: Send + Sync {
    fn commit_booking(&self, command: BookingCommand) -> Result<Appointment, RepositoryError>;
    fn appointments(&self) -> Result<Vec<Appointment>, RepositoryError>;
}

/// Fully resolved booking write handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingCommand {
    pub entry_id: WaitlistEntryId,
    pub slot_id: SlotId,
    pub patient_id: PatientId,
    pub practitioner_id: PractitionerId,
    pub business_id: BusinessId,
    pub appointment_type_id: AppointmentTypeId,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub booked_at: DateTime<Utc>,
}

impl BookingCommand {
    pub fn new(entry: &WaitlistEntry, slot: &AvailableSlot, booked_at: DateTime<Utc>) -> Self {
        Self {
            entry_id: entry.id.clone(),
            slot_id: slot.id.clone(),
            patient_id: entry.patient.id.clone(),
            practitioner_id: slot.practitioner.id.clone(),
            business_id: slot.business.id.clone(),
            appointment_type_id: slot.appointment_type.id.clone(),
            starts_at: slot.starts_at,
            ends_at: slot.ends_at,
            booked_at,
        }
    }
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("conflicting write: {0}")]
    Conflict(String),
    #[error("record not found: {0}")]
    NotFound(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
