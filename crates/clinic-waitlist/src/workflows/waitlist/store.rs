use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTypeId, AvailableSlot, SlotId,
    WaitlistEntry, WaitlistEntryId, WaitlistStatus,
};
use super::ranking::{order_entries, order_slots};
use super::repository::{BookingCommand, BookingStore, RepositoryError, WaitlistRepository};

#[derive(Debug, Default)]
struct StoreState {
    entries: BTreeMap<WaitlistEntryId, WaitlistEntry>,
    slots: BTreeMap<SlotId, AvailableSlot>,
    appointments: Vec<Appointment>,
    appointment_sequence: u64,
}

/// In-process store backing both collaborator traits behind one lock.
///
/// A booking checks the slot and the entry under the lock before touching either, then applies
/// the slot claim, the entry transition, and the appointment insert under that same guard.
#[derive(Debug, Default)]
pub struct InMemoryClinicStore {
    state: Mutex<StoreState>,
}

impl InMemoryClinicStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(entries: Vec<WaitlistEntry>, slots: Vec<AvailableSlot>) -> Self {
        let state = StoreState {
            entries: entries
                .into_iter()
                .map(|entry| (entry.id.clone(), entry))
                .collect(),
            slots: slots.into_iter().map(|slot| (slot.id.clone(), slot)).collect(),
            ..StoreState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    pub fn insert_entry(&self, entry: WaitlistEntry) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.entries.contains_key(&entry.id) {
            return Err(RepositoryError::Conflict(format!(
                "waitlist entry {} already exists",
                entry.id
            )));
        }
        state.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn insert_slot(&self, slot: AvailableSlot) -> Result<(), RepositoryError> {
        let mut state = self.lock()?;
        if state.slots.contains_key(&slot.id) {
            return Err(RepositoryError::Conflict(format!(
                "slot {} already exists",
                slot.id
            )));
        }
        state.slots.insert(slot.id.clone(), slot);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store lock poisoned".to_string()))
    }
}

impl WaitlistRepository for InMemoryClinicStore {
    fn active_entries(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>, RepositoryError> {
        let state = self.lock()?;
        let mut entries: Vec<WaitlistEntry> = state
            .entries
            .values()
            .filter(|entry| entry.is_matchable(now))
            .cloned()
            .collect();
        order_entries(&mut entries);
        Ok(entries)
    }

    fn entries(
        &self,
        status: Option<WaitlistStatus>,
    ) -> Result<Vec<WaitlistEntry>, RepositoryError> {
        let state = self.lock()?;
        let mut entries: Vec<WaitlistEntry> = state
            .entries
            .values()
            .filter(|entry| status.map_or(true, |status| entry.status == status))
            .cloned()
            .collect();
        order_entries(&mut entries);
        Ok(entries)
    }

    fn fetch_entry(&self, id: &WaitlistEntryId) -> Result<Option<WaitlistEntry>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.entries.get(id).cloned())
    }

    fn open_slots(
        &self,
        appointment_type: &AppointmentTypeId,
        now: DateTime<Utc>,
    ) -> Result<Vec<AvailableSlot>, RepositoryError> {
        let state = self.lock()?;
        let mut slots: Vec<AvailableSlot> = state
            .slots
            .values()
            .filter(|slot| &slot.appointment_type.id == appointment_type && slot.is_open(now))
            .cloned()
            .collect();
        order_slots(&mut slots);
        Ok(slots)
    }

    fn slots(&self) -> Result<Vec<AvailableSlot>, RepositoryError> {
        let state = self.lock()?;
        let mut slots: Vec<AvailableSlot> = state.slots.values().cloned().collect();
        order_slots(&mut slots);
        Ok(slots)
    }

    fn fetch_slot(&self, id: &SlotId) -> Result<Option<AvailableSlot>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.slots.get(id).cloned())
    }
}

impl BookingStore for InMemoryClinicStore {
    fn commit_booking(&self, command: BookingCommand) -> Result<Appointment, RepositoryError> {
        let mut state = self.lock()?;
        state.book(command)
    }

    fn appointments(&self) -> Result<Vec<Appointment>, RepositoryError> {
        let state = self.lock()?;
        Ok(state.appointments.clone())
    }
}

impl StoreState {
    fn book(&mut self, command: BookingCommand) -> Result<Appointment, RepositoryError> {
        let slot = self
            .slots
            .get_mut(&command.slot_id)
            .ok_or_else(|| RepositoryError::NotFound(format!("slot {}", command.slot_id)))?;
        if slot.is_booked {
            return Err(RepositoryError::Conflict(format!(
                "slot {} is already booked",
                command.slot_id
            )));
        }

        let entry = self.entries.get_mut(&command.entry_id).ok_or_else(|| {
            RepositoryError::NotFound(format!("waitlist entry {}", command.entry_id))
        })?;
        if entry.status != WaitlistStatus::Active {
            return Err(RepositoryError::Conflict(format!(
                "waitlist entry {} is {}",
                command.entry_id, entry.status
            )));
        }

        // Every check has passed; none of the writes below can fail.
        slot.is_booked = true;
        entry.status = WaitlistStatus::Booked;
        entry.booked_at = Some(command.booked_at);

        self.appointment_sequence += 1;
        let appointment = Appointment {
            id: AppointmentId(format!("apt-{:06}", self.appointment_sequence)),
            patient_id: command.patient_id,
            practitioner_id: command.practitioner_id,
            business_id: command.business_id,
            appointment_type_id: command.appointment_type_id,
            starts_at: command.starts_at,
            ends_at: command.ends_at,
            status: AppointmentStatus::Scheduled,
            booked_from_waitlist: Some(command.entry_id),
            created_at: command.booked_at,
        };
        self.appointments.push(appointment.clone());
        Ok(appointment)
    }
}
