//! Implementation of the in-memory booking store
use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::booking::Booking;
use crate::error::{BookingError, Result};

/// In-memory store for all bookings, indexed by room and by guest
///
/// Every booking is shared between the two indices. Each room has its own
/// lock, so stores for different rooms do not block each other, while the
/// duplicate check and both appends for one room happen under that room's
/// lock.
pub struct BookingStore {
    /// Bookings per room in insertion order, room `n` at index `n - 1`
    rooms: Vec<Mutex<Vec<Arc<Booking>>>>,
    /// Bookings per guest in insertion order, created on the first booking
    guests: DashMap<String, Vec<Arc<Booking>>>,
}

impl BookingStore {
    /// Create a new [`BookingStore`] with rooms `1..=number_of_rooms`
    pub fn new(number_of_rooms: u32) -> Result<Self> {
        if number_of_rooms == 0 {
            return Err(BookingError::InvalidArgument(
                "the number of rooms must be positive".into(),
            ));
        }
        let rooms = (0..number_of_rooms).map(|_| Mutex::new(Vec::new())).collect();
        Ok(Self {
            rooms,
            guests: DashMap::new(),
        })
    }

    /// Get the number of rooms
    #[inline]
    pub fn number_of_rooms(&self) -> u32 {
        self.rooms.len() as u32
    }

    fn room(&self, room_number: u32) -> Result<&Mutex<Vec<Arc<Booking>>>> {
        room_number
            .checked_sub(1)
            .and_then(|i| self.rooms.get(i as usize))
            .ok_or(BookingError::InvalidRoom {
                room: room_number.into(),
            })
    }

    /// Book `room_number` on `date` for `guest_name`
    ///
    /// Fails with [`BookingError::InvalidRoom`] if the room does not exist
    /// and with [`BookingError::DuplicateBooking`] if the room is already
    /// booked on that date. A failed call leaves the store unchanged.
    pub fn store_booking(
        &self,
        guest_name: &str,
        room_number: u32,
        date: NaiveDate,
    ) -> Result<Arc<Booking>> {
        let mut bookings = self.room(room_number)?.lock();
        if bookings.iter().any(|b| b.date() == date) {
            return Err(BookingError::DuplicateBooking {
                room: room_number,
                date,
            });
        }

        let booking = Arc::new(Booking::new(guest_name, room_number, date));
        bookings.push(booking.clone());
        // still holding the room lock: nobody sees the room entry without
        // the guest entry
        self.guests
            .entry(guest_name.to_owned())
            .or_default()
            .push(booking.clone());
        Ok(booking)
    }

    /// Get the rooms without a booking on `date`, in ascending order
    pub fn find_available_rooms(&self, date: NaiveDate) -> Vec<u32> {
        (1..)
            .zip(&self.rooms)
            .filter(|(_, bookings)| !bookings.lock().iter().any(|b| b.date() == date))
            .map(|(room, _)| room)
            .collect()
    }

    /// Get the bookings of `guest_name` in the order they were stored
    ///
    /// Unknown guests have no bookings.
    pub fn find_bookings_by_guest(&self, guest_name: &str) -> Vec<Arc<Booking>> {
        self.guests
            .get(guest_name)
            .map(|bookings| bookings.value().clone())
            .unwrap_or_default()
    }

    /// Check whether `room_number` is free on `date`
    pub fn is_available(&self, room_number: u32, date: NaiveDate) -> Result<bool> {
        let bookings = self.room(room_number)?.lock();
        Ok(!bookings.iter().any(|b| b.date() == date))
    }

    /// Get the total number of bookings
    pub fn len(&self) -> usize {
        self.rooms.iter().map(|bookings| bookings.lock().len()).sum()
    }

    /// Check whether no booking has been stored yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
