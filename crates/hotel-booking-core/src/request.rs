use std::collections::HashMap;
use std::io;

use serde_json::json;
use uuid::Uuid;

use crate::query::parse_query;

/// Kind of the request, determined by its path
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[repr(u8)]
pub enum RequestKind {
    /// Store a booking (`/bookings`)
    ///
    /// Only `POST` is allowed. The form-encoded body carries `guestName`,
    /// `roomNumber` and `date`.
    StoreBooking,

    /// List the rooms available on a date (`/available-rooms`)
    ///
    /// Only `GET` is allowed. The query string carries `date`.
    AvailableRooms,

    /// List the bookings of a guest (`/bookings-for-guest`)
    ///
    /// Only `GET` is allowed. The query string carries `guestName`.
    BookingsForGuest,
}

impl RequestKind {
    /// All request kinds
    pub const ALL: [RequestKind; 3] = [
        RequestKind::StoreBooking,
        RequestKind::AvailableRooms,
        RequestKind::BookingsForGuest,
    ];

    /// Look up the request kind served at `path`
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.path() == path)
    }

    /// Path at which requests of this kind are served
    pub const fn path(self) -> &'static str {
        match self {
            RequestKind::StoreBooking => "/bookings",
            RequestKind::AvailableRooms => "/available-rooms",
            RequestKind::BookingsForGuest => "/bookings-for-guest",
        }
    }

    /// The only method accepted for this kind
    pub const fn allowed_method(self) -> RequestMethod {
        match self {
            RequestKind::StoreBooking => RequestMethod::Post,
            RequestKind::AvailableRooms | RequestKind::BookingsForGuest => RequestMethod::Get,
        }
    }
}

/// HTTP request method
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum RequestMethod {
    /// GET request
    Get,
    /// POST request, may have a payload
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
    /// Any other method
    Other,
}

/// Request sent by a client
pub struct Request {
    kind: RequestKind,
    id: Uuid,
    raw: Box<dyn RawRequest + Send>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .field("raw", &format_args!(".."))
            .finish()
    }
}

/// Interface for handling requests
pub trait RequestHandler {
    /// Handle a request
    ///
    /// This method may be called concurrently from different threads.
    fn handle(&self, request: Request);

    /// Shut the handler down
    ///
    /// Waits for any threads spawned by the handler to have terminated.
    fn shutdown(self);
}

/// A raw request, implemented by the transport (HTTP server or test harness)
pub trait RawRequest {
    /// Get the URL path, without the query string
    fn path(&self) -> &str;
    /// Get the raw query string (the part after `?`), empty if absent
    fn query(&self) -> &str;
    /// Get the request method
    fn method(&self) -> RequestMethod;

    /// Read the request body as string
    fn read_string(&mut self) -> io::Result<String>;

    /// Send the response
    ///
    /// `body` is sent as is with content type `application/json`, the
    /// request id goes into the `X-Request-Id` header.
    fn respond(self: Box<Self>, status: u16, body: String, id: Uuid);
}

impl Request {
    /// Get the request's kind
    #[inline]
    pub fn kind(&self) -> RequestKind {
        self.kind
    }

    /// Get the request id
    ///
    /// If the client did not send a valid `X-Request-Id` header, it is
    /// randomly generated.
    #[inline]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Get the request path
    #[inline]
    pub fn path(&self) -> &str {
        self.raw.path()
    }

    /// Get the request method
    #[inline]
    pub fn method(&self) -> RequestMethod {
        self.raw.method()
    }

    /// Parse the query string into a map, see [`parse_query()`]
    #[inline]
    pub fn query_params(&self) -> HashMap<String, String> {
        parse_query(self.raw.query())
    }

    /// Read the body and parse it as a form, see [`parse_query()`]
    ///
    /// Line breaks in the body are ignored. This method has side effects and
    /// should be called only once per request.
    pub fn read_form(&mut self) -> io::Result<HashMap<String, String>> {
        let body = self.raw.read_string()?;
        Ok(parse_query(body.trim_end_matches(['\r', '\n'])))
    }

    /// Respond with `{"message": <msg>}` and status 200
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_message(self, msg: impl Into<String>) {
        let body = json!({ "message": msg.into() }).to_string();
        self.raw.respond(200, body, self.id);
    }

    /// Respond with an arbitrary body and status 200
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_string(self, s: impl Into<String>) {
        self.raw.respond(200, s.into(), self.id);
    }

    /// Respond with `{"error": <err>}` and the given status
    ///
    /// This method blocks until the response has been sent.
    #[inline]
    pub fn respond_with_err(self, status: u16, err: impl Into<String>) {
        let body = error_body(&err.into());
        self.raw.respond(status, body, self.id);
    }

    /// Create a new request from a [`RawRequest`]
    #[inline]
    pub fn from_raw(kind: RequestKind, id: Uuid, raw: Box<dyn RawRequest + Send>) -> Self {
        Self { kind, id, raw }
    }
}

/// Render `{"error": <err>}`
pub fn error_body(err: &str) -> String {
    json!({ "error": err }).to_string()
}
