use serde::{Deserialize, Serialize};

use super::domain::{Appointment, AppointmentId, SlotId, WaitlistEntryId, WaitlistStatus};
use super::repository::RepositoryError;

/// Failure channel of the booking transaction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("waitlist entry {0} not found")]
    EntryNotFound(WaitlistEntryId),
    #[error("slot {0} not found")]
    SlotNotFound(SlotId),
    #[error("slot {0} is already booked")]
    SlotAlreadyBooked(SlotId),
    #[error("waitlist entry {id} is {status}, not active")]
    EntryNotActive {
        id: WaitlistEntryId,
        status: WaitlistStatus,
    },
    #[error("booking conflict: {0}")]
    Conflict(String),
    #[error("booking failed: {0}")]
    Storage(String),
}

/// Coarse classification callers use to decide how to react to a failed booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingErrorKind {
    NotFound,
    Conflict,
    Unexpected,
}

impl BookingError {
    pub fn kind(&self) -> BookingErrorKind {
        match self {
            BookingError::EntryNotFound(_) | BookingError::SlotNotFound(_) => {
                BookingErrorKind::NotFound
            }
            BookingError::SlotAlreadyBooked(_)
            | BookingError::EntryNotActive { .. }
            | BookingError::Conflict(_) => BookingErrorKind::Conflict,
            BookingError::Storage(_) => BookingErrorKind::Unexpected,
        }
    }
}

impl From<RepositoryError> for BookingError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict(detail) => BookingError::Conflict(detail),
            other => BookingError::Storage(other.to_string()),
        }
    }
}

/// Structured booking result handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_id: Option<AppointmentId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BookingOutcome {
    pub fn succeeded(appointment: &Appointment) -> Self {
        Self {
            success: true,
            appointment_id: Some(appointment.id.clone()),
            error: None,
        }
    }

    pub fn failed(error: &BookingError) -> Self {
        Self {
            success: false,
            appointment_id: None,
            error: Some(error.to_string()),
        }
    }

    /// A request that never reached the booking transaction.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            appointment_id: None,
            error: Some(message.into()),
        }
    }
}

impl From<&Result<Appointment, BookingError>> for BookingOutcome {
    fn from(result: &Result<Appointment, BookingError>) -> Self {
        match result {
            Ok(appointment) => Self::succeeded(appointment),
            Err(error) => Self::failed(error),
        }
    }
}
