use std::sync::Arc;

use tracing::{debug, info, warn};

use super::booking::BookingError;
use super::clock::{Clock, SystemClock};
use super::domain::{
    Appointment, AvailableSlot, SlotId, WaitlistEntry, WaitlistEntryId, WaitlistStatus,
};
use super::ranking::{self, MatchResult};
use super::reporting::{
    self, AppointmentTypeDemand, DashboardOverview, PractitionerAvailability, SlotFilter,
    SlotStats, WaitlistStats,
};
use super::repository::{BookingCommand, BookingStore, RepositoryError, WaitlistRepository};
use super::scoring::MatchScorer;
use super::settings::MatchingSettings;

/// Service composing the data store collaborators, the scorer, and the booking transaction.
pub struct WaitlistMatchingService<R, B> {
    repository: Arc<R>,
    bookings: Arc<B>,
    scorer: Arc<MatchScorer>,
    clock: Arc<dyn Clock>,
    top_matches_limit: usize,
}

impl<R, B> WaitlistMatchingService<R, B>
where
    R: WaitlistRepository + 'static,
    B: BookingStore + 'static,
{
    pub fn new(repository: Arc<R>, bookings: Arc<B>, settings: MatchingSettings) -> Self {
        Self::with_clock(repository, bookings, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        repository: Arc<R>,
        bookings: Arc<B>,
        settings: MatchingSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            bookings,
            scorer: Arc::new(settings.scorer()),
            clock,
            top_matches_limit: settings.top_matches_limit.max(1),
        }
    }

    pub fn top_matches_limit(&self) -> usize {
        self.top_matches_limit
    }

    /// Rank every positive-scoring pairing across the active waitlist.
    pub fn find_matches(&self) -> Result<Vec<MatchResult>, MatchingServiceError> {
        let now = self.clock.now();
        let mut entries = self.repository.active_entries(now)?;
        ranking::order_entries(&mut entries);

        let mut matches = Vec::new();
        for entry in &entries {
            let mut slots = self
                .repository
                .open_slots(&entry.appointment_type.id, now)?;
            ranking::order_slots(&mut slots);
            matches.extend(ranking::score_entry(&self.scorer, entry, &slots, now));
        }
        ranking::rank(&mut matches);

        debug!(
            entries = entries.len(),
            matches = matches.len(),
            "ranked waitlist matches"
        );
        Ok(matches)
    }

    /// Rank slots for a single entry. A missing entry is an error; an entry that is no longer
    /// active simply has no matches.
    pub fn find_matches_for_entry(
        &self,
        entry_id: &WaitlistEntryId,
    ) -> Result<Vec<MatchResult>, MatchingServiceError> {
        let now = self.clock.now();
        let entry = self
            .repository
            .fetch_entry(entry_id)?
            .ok_or_else(|| MatchingServiceError::EntryNotFound(entry_id.clone()))?;

        if !entry.is_matchable(now) {
            return Ok(Vec::new());
        }

        let mut slots = self
            .repository
            .open_slots(&entry.appointment_type.id, now)?;
        ranking::order_slots(&mut slots);
        let mut matches = ranking::score_entry(&self.scorer, &entry, &slots, now);
        ranking::rank(&mut matches);
        Ok(matches)
    }

    pub fn top_matches(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<MatchResult>, MatchingServiceError> {
        let limit = limit.unwrap_or(self.top_matches_limit);
        let mut matches = self.find_matches()?;
        matches.truncate(limit);
        Ok(matches)
    }

    /// Convert a match into an appointment, consuming the slot and closing the entry.
    pub fn book_match(
        &self,
        entry_id: &WaitlistEntryId,
        slot_id: &SlotId,
    ) -> Result<Appointment, BookingError> {
        let result = self.try_book(entry_id, slot_id);
        match &result {
            Ok(appointment) => info!(
                entry_id = %entry_id,
                slot_id = %slot_id,
                appointment_id = %appointment.id,
                "booked waitlist match"
            ),
            Err(error) => warn!(
                entry_id = %entry_id,
                slot_id = %slot_id,
                kind = ?error.kind(),
                %error,
                "booking rejected"
            ),
        }
        result
    }

    fn try_book(
        &self,
        entry_id: &WaitlistEntryId,
        slot_id: &SlotId,
    ) -> Result<Appointment, BookingError> {
        let entry = self
            .repository
            .fetch_entry(entry_id)?
            .ok_or_else(|| BookingError::EntryNotFound(entry_id.clone()))?;
        let slot = self
            .repository
            .fetch_slot(slot_id)?
            .ok_or_else(|| BookingError::SlotNotFound(slot_id.clone()))?;

        if slot.is_booked {
            return Err(BookingError::SlotAlreadyBooked(slot_id.clone()));
        }
        if entry.status != WaitlistStatus::Active {
            return Err(BookingError::EntryNotActive {
                id: entry.id,
                status: entry.status,
            });
        }

        let command = BookingCommand::new(&entry, &slot, self.clock.now());
        let appointment = self.bookings.commit_booking(command)?;
        Ok(appointment)
    }

    pub fn waitlist(
        &self,
        status: Option<WaitlistStatus>,
    ) -> Result<Vec<WaitlistEntry>, MatchingServiceError> {
        Ok(self.repository.entries(status)?)
    }

    pub fn entry(
        &self,
        entry_id: &WaitlistEntryId,
    ) -> Result<WaitlistEntry, MatchingServiceError> {
        self.repository
            .fetch_entry(entry_id)?
            .ok_or_else(|| MatchingServiceError::EntryNotFound(entry_id.clone()))
    }

    /// Slots passing `filter`, earliest first.
    pub fn slots(
        &self,
        filter: &SlotFilter,
    ) -> Result<Vec<AvailableSlot>, MatchingServiceError> {
        let mut slots = self.repository.slots()?;
        slots.retain(|slot| filter.matches(slot));
        ranking::order_slots(&mut slots);
        Ok(slots)
    }

    pub fn practitioner_availability(
        &self,
    ) -> Result<Vec<PractitionerAvailability>, MatchingServiceError> {
        let slots = self.repository.slots()?;
        Ok(reporting::practitioner_availability(
            &slots,
            self.clock.now(),
        ))
    }

    pub fn appointment_type_demand(
        &self,
    ) -> Result<Vec<AppointmentTypeDemand>, MatchingServiceError> {
        let entries = self.repository.entries(None)?;
        let slots = self.repository.slots()?;
        Ok(reporting::appointment_type_demand(
            &entries,
            &slots,
            self.clock.now(),
        ))
    }

    pub fn waitlist_stats(&self) -> Result<WaitlistStats, MatchingServiceError> {
        let entries = self.repository.entries(None)?;
        Ok(reporting::waitlist_stats(&entries))
    }

    pub fn slot_stats(&self) -> Result<SlotStats, MatchingServiceError> {
        let slots = self.repository.slots()?;
        Ok(reporting::slot_stats(&slots, self.clock.now()))
    }

    pub fn overview(&self) -> Result<DashboardOverview, MatchingServiceError> {
        let now = self.clock.now();
        let entries = self.repository.entries(None)?;
        let slots = self.repository.slots()?;
        let appointments = self.bookings.appointments()?;
        let potential_matches = self.find_matches()?.len();
        Ok(reporting::overview(
            &entries,
            &slots,
            &appointments,
            potential_matches,
            now,
        ))
    }
}

/// Error raised by the read side of the matching service.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error("waitlist entry {0} not found")]
    EntryNotFound(WaitlistEntryId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
