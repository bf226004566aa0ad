//! 🏗 Infrastructure for handling requests, etc.
#![warn(missing_docs)]

mod query;
mod request;

pub use query::parse_query;
pub use request::{error_body, RawRequest, Request, RequestHandler, RequestKind, RequestMethod};

/// Configuration of the booking registry
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Number of rooms, numbered `1..=rooms`
    pub rooms: u32,

    /// Map error kinds to 400/409/500 instead of answering every failure
    /// with 500
    pub rest_status: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            rooms: 10,
            rest_status: false,
        }
    }
}
