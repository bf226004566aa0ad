//! A single booking

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A room booked by a guest for one date
///
/// Bookings are created once when they are stored and never change.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    guest_name: String,
    room_number: u32,
    date: NaiveDate,
}

impl Booking {
    /// Create a new [`Booking`]
    pub fn new(guest_name: impl Into<String>, room_number: u32, date: NaiveDate) -> Self {
        Self {
            guest_name: guest_name.into(),
            room_number,
            date,
        }
    }

    /// Name of the guest
    #[inline]
    pub fn guest_name(&self) -> &str {
        &self.guest_name
    }

    /// The booked room
    #[inline]
    pub fn room_number(&self) -> u32 {
        self.room_number
    }

    /// The booked date
    #[inline]
    pub fn date(&self) -> NaiveDate {
        self.date
    }
}
