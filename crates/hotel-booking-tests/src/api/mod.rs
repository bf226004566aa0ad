use std::sync::Arc;

use chrono::NaiveDate;
use eyre::{eyre, Result};
use flume::Sender;
use hotel_booking_core::{RequestKind, RequestMethod};
use hotel_booking_registry::Booking;
use nanorand::Rng;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::oneshot;
use uuid::Uuid;

pub mod mock;

/// Error response sent by the booking registry
#[derive(Debug, Error)]
#[error("Error {status}: {msg}")]
pub struct ApiError {
    pub status: u16,
    pub msg: String,
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Response exactly as the transport would deliver it
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
    pub request_id: Uuid,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct MessageBody {
    message: String,
}

impl RawResponse {
    /// Split into success body or [`ApiError`]
    fn into_api_response(self) -> Result<ApiResponse<String>> {
        let result = if self.status == 200 {
            Ok(self.body)
        } else {
            let body: ErrorBody = serde_json::from_str(&self.body)
                .map_err(|e| eyre!("malformed error body {:?}: {e}", self.body))?;
            Err(ApiError {
                status: self.status,
                msg: body.error,
            })
        };
        Ok(ApiResponse {
            request_id: self.request_id,
            result,
        })
    }
}

struct RequestMsg {
    kind: RequestKind,
    method: RequestMethod,
    query: String,
    body: String,
    request_id: Uuid,
    response_channel: oneshot::Sender<RawResponse>,
}

pub struct Api {
    /// One channel per handler thread
    channels: Arc<Vec<Sender<RequestMsg>>>,

    my_channel: Sender<RequestMsg>,
    my_index: usize,
}

impl Api {
    fn new(channels: Vec<Sender<RequestMsg>>) -> Self {
        let my_channel = channels[0].clone();
        Self {
            channels: Arc::new(channels),
            my_channel,
            my_index: 0,
        }
    }
}

impl Clone for Api {
    fn clone(&self) -> Self {
        let my_index = (self.my_index + 1) % self.channels.len();
        Self {
            channels: self.channels.clone(),
            my_channel: self.channels[my_index].clone(),
            my_index,
        }
    }
}

impl Api {
    /// Send a request with arbitrary method, query string and body
    pub async fn send(
        &self,
        method: RequestMethod,
        kind: RequestKind,
        query: &str,
        body: &str,
    ) -> Result<RawResponse> {
        self.send_with_id(Uuid::new_v4(), method, kind, query, body)
            .await
    }

    /// Like [`Self::send`], but with a caller chosen request id
    pub async fn send_with_id(
        &self,
        request_id: Uuid,
        method: RequestMethod,
        kind: RequestKind,
        query: &str,
        body: &str,
    ) -> Result<RawResponse> {
        let (sender, receiver) = oneshot::channel();
        let msg = RequestMsg {
            kind,
            method,
            query: query.to_owned(),
            body: body.to_owned(),
            request_id,
            response_channel: sender,
        };
        self.my_channel.send_async(msg).await?;
        Ok(receiver.await?)
    }

    /// `POST /bookings` with a raw form body
    pub async fn post_booking_form(&self, form: &str) -> Result<ApiResponse<String>> {
        let kind = RequestKind::StoreBooking;
        self.send(RequestMethod::Post, kind, "", form)
            .await?
            .into_api_response()
    }

    pub async fn store_booking(
        &self,
        guest_name: &str,
        room_number: u32,
        date: NaiveDate,
    ) -> Result<ApiResponse<String>> {
        let form = format!("guestName={guest_name}&roomNumber={room_number}&date={date}");
        self.post_booking_form(&form)
            .await?
            .map_response(|body| {
                let body: MessageBody = serde_json::from_str(&body)?;
                Ok(body.message)
            })
    }

    pub async fn get_available_rooms(&self, date: NaiveDate) -> Result<ApiResponse<Vec<u32>>> {
        let kind = RequestKind::AvailableRooms;
        self.send(RequestMethod::Get, kind, &format!("date={date}"), "")
            .await?
            .into_api_response()?
            .map_response(|body| {
                if body.is_empty() {
                    return Ok(Vec::new());
                }
                let rooms: Result<Vec<u32>, _> = body.split(',').map(str::parse).collect();
                Ok(rooms?)
            })
    }

    pub async fn get_bookings_for_guest(
        &self,
        guest_name: &str,
    ) -> Result<ApiResponse<Vec<Booking>>> {
        let kind = RequestKind::BookingsForGuest;
        self.send(RequestMethod::Get, kind, &format!("guestName={guest_name}"), "")
            .await?
            .into_api_response()?
            .map_response(|body| Ok(serde_json::from_str(&body)?))
    }

    /// Create a session for the given guest, or for a random one
    pub fn create_guest_session(&self, guest_name: Option<String>) -> GuestSession {
        let guest_name = guest_name.unwrap_or_else(|| {
            let mut rng = nanorand::tls_rng();
            format!("guest_{:08x}", rng.generate::<u32>())
        });
        GuestSession {
            api: self,
            guest_name,
        }
    }
}

pub struct ApiResponse<T> {
    pub request_id: Uuid,
    pub result: ApiResult<T>,
}

impl<T> ApiResponse<T> {
    pub fn map_response<R, F: FnOnce(T) -> Result<R>>(self, func: F) -> Result<ApiResponse<R>> {
        let result = match self.result.map(func) {
            Ok(result) => Ok(result?),
            Err(err) => Err(err),
        };
        Ok(ApiResponse {
            request_id: self.request_id,
            result,
        })
    }
}

/// A guest making bookings under a fixed name
pub struct GuestSession<'a> {
    pub api: &'a Api,
    pub guest_name: String,
}

impl<'a> GuestSession<'a> {
    pub async fn book(&self, room_number: u32, date: NaiveDate) -> Result<ApiResponse<String>> {
        self.api
            .store_booking(&self.guest_name, room_number, date)
            .await
    }

    pub async fn bookings(&self) -> Result<ApiResponse<Vec<Booking>>> {
        self.api.get_bookings_for_guest(&self.guest_name).await
    }
}
