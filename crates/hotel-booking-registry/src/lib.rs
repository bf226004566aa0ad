//! 🏨 The booking registry: an in-memory booking store and the request
//! handler exposing it.
//!
//! The [store] holds all [bookings][booking] indexed by room and by guest.
//! The [registry] translates requests into store calls and answers them.

#![warn(missing_docs)]
#![allow(rustdoc::private_intra_doc_links)]
use std::sync::Arc;

use hotel_booking_core::Config;

mod booking;
mod error;
mod registry;
mod store;

pub use booking::Booking;
pub use error::{BookingError, Result};
pub use registry::{Registry, BOOKING_STORED, METHOD_NOT_ALLOWED};
pub use store::BookingStore;

/// Entrypoint of the booking registry
///
/// Constructs the store for `config.rooms` rooms and a [`Registry`] serving
/// requests against it. Fails if `config.rooms` is zero.
pub fn launch(config: &Config) -> Result<Registry> {
    let store = Arc::new(BookingStore::new(config.rooms)?);
    Ok(Registry::new(store, config.rest_status))
}
