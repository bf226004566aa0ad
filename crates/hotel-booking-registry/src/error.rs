//! Errors reported by the booking registry

use chrono::NaiveDate;
use thiserror::Error;

/// Result type of the booking registry
pub type Result<T, E = BookingError> = std::result::Result<T, E>;

/// Failure of a booking registry operation
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum BookingError {
    /// Malformed input, e.g. an unparsable date or a missing field
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The room number is outside `1..=number_of_rooms`
    #[error("Room {room} does not exist")]
    InvalidRoom {
        /// The requested room number
        room: i64,
    },

    /// The room is already booked on that date
    #[error("Booking already exists for room {room} on date {date}")]
    DuplicateBooking {
        /// The requested room
        room: u32,
        /// The requested date
        date: NaiveDate,
    },

    /// Unexpected failure, e.g. while reading the request
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BookingError {
    /// HTTP status for this error
    ///
    /// Without `rest_status`, every failure is answered with 500.
    pub fn status(&self, rest_status: bool) -> u16 {
        if !rest_status {
            return 500;
        }
        match self {
            BookingError::InvalidArgument(_) | BookingError::InvalidRoom { .. } => 400,
            BookingError::DuplicateBooking { .. } => 409,
            BookingError::Internal(_) => 500,
        }
    }
}

impl From<std::io::Error> for BookingError {
    fn from(err: std::io::Error) -> Self {
        BookingError::Internal(err.to_string())
    }
}
