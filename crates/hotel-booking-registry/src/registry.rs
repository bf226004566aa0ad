//! Implementation of the request handler
use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use hotel_booking_core::{Request, RequestHandler, RequestKind};
use tracing::{error, info, info_span, warn};

use crate::booking::Booking;
use crate::error::{BookingError, Result};
use crate::store::BookingStore;

/// Message sent after a booking was stored
pub const BOOKING_STORED: &str = "Booking stored successfully";
/// Error message for requests with the wrong method
pub const METHOD_NOT_ALLOWED: &str = "Method not allow";

/// Prefix of errors raised by the store while storing a booking
const STORE_FAILED: &str = "Failed to store booking: ";

/// Date format accepted in requests (ISO-8601 calendar date)
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Request handler answering requests from the [`BookingStore`]
///
/// This struct implements the [`RequestHandler`] trait and is shared by all
/// handler threads.
pub struct Registry {
    store: Arc<BookingStore>,
    /// Answer with 400/409/500 depending on the error instead of always 500
    rest_status: bool,
}

/// Successful outcome of a request
enum Reply {
    Message(&'static str),
    Body(String),
}

impl Registry {
    /// Create a new [`Registry`]
    pub fn new(store: Arc<BookingStore>, rest_status: bool) -> Self {
        Self { store, rest_status }
    }

    /// Get the underlying store
    #[inline]
    pub fn store(&self) -> &Arc<BookingStore> {
        &self.store
    }

    /// `POST /bookings` with form fields `guestName`, `roomNumber` and `date`
    fn store_booking(&self, rq: &mut Request) -> Result<Reply> {
        let form = rq.read_form()?;
        let guest_name = field(&form, "guestName")?;
        let room_number = parse_room(field(&form, "roomNumber")?)?;
        let date = parse_date(field(&form, "date")?)?;

        let booking = self.store.store_booking(guest_name, room_number, date)?;
        info!(
            guest = booking.guest_name(),
            room = booking.room_number(),
            date = %booking.date(),
            "booking stored"
        );
        Ok(Reply::Message(BOOKING_STORED))
    }

    /// `GET /available-rooms?date=..`, answered with a comma separated list
    fn available_rooms(&self, rq: &Request) -> Result<Reply> {
        let query = rq.query_params();
        let date = parse_date(field(&query, "date")?)?;

        let rooms = self.store.find_available_rooms(date);
        let list: Vec<String> = rooms.iter().map(u32::to_string).collect();
        Ok(Reply::Body(list.join(",")))
    }

    /// `GET /bookings-for-guest?guestName=..`, answered with a JSON array
    fn bookings_for_guest(&self, rq: &Request) -> Result<Reply> {
        let query = rq.query_params();
        let guest_name = field(&query, "guestName")?;

        let bookings = self.store.find_bookings_by_guest(guest_name);
        let bookings: Vec<&Booking> = bookings.iter().map(Arc::as_ref).collect();
        let body = serde_json::to_string(&bookings)
            .map_err(|e| BookingError::Internal(format!("serializing bookings failed: {e}")))?;
        Ok(Reply::Body(body))
    }
}

impl RequestHandler for Registry {
    fn handle(&self, mut rq: Request) {
        let kind = rq.kind();
        let method = rq.method();
        let span = info_span!("request", id = %rq.id(), ?kind);
        let _guard = span.enter();
        info!(?method, path = rq.path(), "handling request");

        if method != kind.allowed_method() {
            error!(?method, "method not allowed");
            rq.respond_with_err(405, METHOD_NOT_ALLOWED);
            return;
        }

        let result = match kind {
            RequestKind::StoreBooking => self.store_booking(&mut rq),
            RequestKind::AvailableRooms => self.available_rooms(&rq),
            RequestKind::BookingsForGuest => self.bookings_for_guest(&rq),
        };

        match result {
            Ok(Reply::Message(msg)) => rq.respond_with_message(msg),
            Ok(Reply::Body(body)) => rq.respond_with_string(body),
            Err(err) => {
                if let BookingError::DuplicateBooking { .. } = err {
                    warn!(%err, "booking rejected");
                } else {
                    error!(%err, "request failed");
                }
                rq.respond_with_err(err.status(self.rest_status), error_message(kind, &err));
            }
        }
    }

    fn shutdown(self) {
        // nothing to do
    }
}

/// Message sent to the client for `err`
fn error_message(kind: RequestKind, err: &BookingError) -> String {
    match (kind, err) {
        (
            RequestKind::StoreBooking,
            BookingError::InvalidRoom { .. } | BookingError::DuplicateBooking { .. },
        ) => format!("{STORE_FAILED}{err}"),
        _ => err.to_string(),
    }
}

/// Look up a required field
fn field<'a>(params: &'a HashMap<String, String>, name: &str) -> Result<&'a str> {
    params
        .get(name)
        .map(String::as_str)
        .ok_or_else(|| BookingError::InvalidArgument(format!("missing field `{name}`")))
}

/// Parse a `YYYY-MM-DD` date
///
/// Only the zero-padded `YYYY-MM-DD` form is accepted; chrono alone would also
/// take `2024-3-5`, leading whitespace or a signed year.
fn parse_date(s: &str) -> Result<NaiveDate> {
    let date = NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| BookingError::InvalidArgument(format!("invalid date `{s}`: {e}")))?;
    if date.format(DATE_FORMAT).to_string() != s {
        return Err(BookingError::InvalidArgument(format!(
            "invalid date `{s}`: expected YYYY-MM-DD"
        )));
    }
    Ok(date)
}

/// Parse a room number, rejecting numbers no room can have
fn parse_room(s: &str) -> Result<u32> {
    let room: i64 = s
        .parse()
        .map_err(|e| BookingError::InvalidArgument(format!("invalid room number `{s}`: {e}")))?;
    u32::try_from(room).map_err(|_| BookingError::InvalidRoom { room })
}
