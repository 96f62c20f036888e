//! Waitlist-to-appointment matching: scoring, ranking, and the booking transaction.
//!
//! The service pairs active waitlist entries with open slots of the same appointment type,
//! scores each pairing against the patient's preferences, and turns a chosen pairing into a
//! scheduled appointment through the `BookingStore` collaborator.

pub mod booking;
pub mod clock;
pub mod domain;
pub mod ranking;
pub mod reporting;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod settings;
pub mod store;
pub mod views;

#[cfg(test)]
mod tests;

pub use booking::{BookingError, BookingErrorKind, BookingOutcome};
pub use clock::{Clock, FixedClock, SystemClock};
pub use domain::{
    Appointment, AppointmentId, AppointmentStatus, AppointmentTypeId, AppointmentTypeSummary,
    AvailableSlot, BusinessId, BusinessSummary, DayOfWeek, PatientId, PatientSummary,
    PractitionerId, PractitionerSummary, SlotId, TimeOfDay, Urgency, WaitlistEntry,
    WaitlistEntryId, WaitlistPreferences, WaitlistStatus,
};
pub use ranking::MatchResult;
pub use reporting::{
    AppointmentTypeDemand, DashboardOverview, PractitionerAvailability, SlotFilter, SlotStats,
    WaitlistStats,
};
pub use repository::{BookingCommand, BookingStore, RepositoryError, WaitlistRepository};
pub use router::matching_router;
pub use scoring::{
    MatchReason, MatchScore, MatchScorer, ScoreBreakdown, ScoringWeights, UrgencyBonuses,
};
pub use service::{MatchingServiceError, WaitlistMatchingService};
pub use settings::MatchingSettings;
pub use store::InMemoryClinicStore;
