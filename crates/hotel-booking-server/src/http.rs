//! 🏗 HTTP request implementation

use std::io;
use std::io::{Cursor, Read};

use hotel_booking_core::{error_body, RequestKind, RequestMethod};
use tiny_http::{Header, Response};
use tracing::warn;
use uuid::Uuid;

struct HTTPRequest(tiny_http::Request);

impl hotel_booking_core::RawRequest for HTTPRequest {
    fn path(&self) -> &str {
        split_url(self.0.url()).0
    }

    fn query(&self) -> &str {
        split_url(self.0.url()).1
    }

    fn method(&self) -> RequestMethod {
        match self.0.method() {
            tiny_http::Method::Get => RequestMethod::Get,
            tiny_http::Method::Post => RequestMethod::Post,
            tiny_http::Method::Put => RequestMethod::Put,
            tiny_http::Method::Delete => RequestMethod::Delete,
            _ => RequestMethod::Other,
        }
    }

    fn read_string(&mut self) -> io::Result<String> {
        let mut s = String::with_capacity(self.0.body_length().unwrap_or(0));
        self.0.as_reader().read_to_string(&mut s)?;
        Ok(s)
    }

    fn respond(self: Box<Self>, status: u16, body: String, id: Uuid) {
        let mut res = json_response(status, body);
        add_header(&mut res, "X-Request-Id", &id.hyphenated().to_string());
        send(self.0, res);
    }
}

/// Split a URL into path and query string
fn split_url(url: &str) -> (&str, &str) {
    url.split_once('?').unwrap_or((url, ""))
}

/// Parse the given HTTP request
///
/// If [`None`] is returned, the request was already answered: `OPTIONS` on
/// an unknown path with 204, anything else on an unknown path with 404.
/// Requests to known paths are always passed on, whatever their method.
pub fn parse(rq: tiny_http::Request) -> Option<hotel_booking_core::Request> {
    let Some(kind) = RequestKind::from_path(split_url(rq.url()).0) else {
        if *rq.method() == tiny_http::Method::Options {
            send(rq, with_cors(Response::empty(204)));
        } else {
            send(rq, not_found());
        }
        return None;
    };

    let id = request_id(rq.headers());
    Some(hotel_booking_core::Request::from_raw(
        kind,
        id,
        Box::new(HTTPRequest(rq)),
    ))
}

/// The id from a valid `X-Request-Id` header, or a fresh one
fn request_id(headers: &[Header]) -> Uuid {
    headers
        .iter()
        .find(|hdr| hdr.field.equiv("x-request-id"))
        .and_then(|hdr| Uuid::parse_str(hdr.value.as_str()).ok())
        .unwrap_or_else(Uuid::new_v4)
}

/// JSON response with CORS headers
fn json_response(status: u16, body: String) -> Response<Cursor<Vec<u8>>> {
    let mut res = Response::from_string(body).with_status_code(status);
    add_header(&mut res, "Content-Type", "application/json");
    with_cors(res)
}

/// 404 listing the valid requests
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let routes: Vec<String> = RequestKind::ALL
        .iter()
        .map(|kind| format!("{:?} {}", kind.allowed_method(), kind.path()))
        .collect();
    let body = error_body(&format!(
        "could not find the service you are looking for, valid requests are: {}",
        routes.join(", ")
    ));
    json_response(404, body)
}

/// Add CORS headers to `res`
fn with_cors<R: Read>(mut res: Response<R>) -> Response<R> {
    add_header(&mut res, "Access-Control-Request-Method", "*");
    add_header(&mut res, "Access-Control-Allow-Origin", "*");
    add_header(&mut res, "Access-Control-Allow-Headers", "*");
    add_header(&mut res, "Access-Control-Expose-Headers", "*");
    res
}

fn send<R: Read>(rq: tiny_http::Request, res: Response<R>) {
    if let Err(err) = rq.respond(res) {
        warn!(%err, "HTTP response failed");
    }
}

fn add_header<R: Read>(res: &mut Response<R>, field: &str, value: &str) {
    // only fails for non-ASCII input
    if let Ok(header) = Header::from_bytes(field.as_bytes(), value.as_bytes()) {
        res.add_header(header);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use hotel_booking_core::{RequestKind, RequestMethod};
    use tiny_http::{Header, Method, Response, TestRequest};
    use uuid::Uuid;

    use super::{json_response, not_found, parse, request_id, split_url, with_cors};

    fn header<'a, R: Read>(res: &'a Response<R>, field: &'static str) -> Option<&'a str> {
        res.headers()
            .iter()
            .find(|hdr| hdr.field.equiv(field))
            .map(|hdr| hdr.value.as_str())
    }

    fn id_header(value: &str) -> Header {
        Header::from_bytes(&b"X-Request-Id"[..], value.as_bytes()).unwrap()
    }

    #[test]
    fn urls_are_split_at_the_first_question_mark() {
        assert_eq!(split_url("/bookings"), ("/bookings", ""));
        assert_eq!(
            split_url("/available-rooms?date=2024-03-15"),
            ("/available-rooms", "date=2024-03-15")
        );
        assert_eq!(split_url("/a?b=1?c=2"), ("/a", "b=1?c=2"));
        assert_eq!(split_url("/a?"), ("/a", ""));
    }

    #[test]
    fn known_paths_are_routed_with_any_method() {
        use RequestKind::{AvailableRooms, BookingsForGuest, StoreBooking};

        let cases = [
            (Method::Post, "/bookings", StoreBooking, RequestMethod::Post),
            (Method::Get, "/bookings", StoreBooking, RequestMethod::Get),
            (Method::Options, "/bookings", StoreBooking, RequestMethod::Other),
            (Method::Get, "/available-rooms?date=2024-03-15", AvailableRooms, RequestMethod::Get),
            (Method::Options, "/available-rooms", AvailableRooms, RequestMethod::Other),
            (Method::Put, "/bookings-for-guest", BookingsForGuest, RequestMethod::Put),
            (Method::Delete, "/bookings-for-guest", BookingsForGuest, RequestMethod::Delete),
            (Method::Options, "/bookings-for-guest", BookingsForGuest, RequestMethod::Other),
        ];
        for (method, path, kind, expected_method) in cases {
            let rq = TestRequest::new().with_method(method).with_path(path);
            let request = parse(rq.into()).expect(path);
            assert_eq!(request.kind(), kind, "{path}");
            assert_eq!(request.method(), expected_method, "{path}");
        }
    }

    #[test]
    fn query_string_is_passed_through() {
        let rq = TestRequest::new().with_path("/bookings-for-guest?guestName=John%20Doe&x");
        let request = parse(rq.into()).unwrap();
        assert_eq!(request.path(), "/bookings-for-guest");
        let params = request.query_params();
        assert_eq!(params.len(), 1);
        assert_eq!(params["guestName"], "John%20Doe");
    }

    #[test]
    fn form_body_is_readable() {
        let rq = TestRequest::new()
            .with_method(Method::Post)
            .with_path("/bookings")
            .with_body("guestName=alice&roomNumber=1&date=2024-03-15");
        let mut request = parse(rq.into()).unwrap();
        let form = request.read_form().unwrap();
        assert_eq!(form["guestName"], "alice");
        assert_eq!(form["roomNumber"], "1");
        assert_eq!(form["date"], "2024-03-15");
    }

    #[test]
    fn unknown_paths_are_answered() {
        for (method, path) in [
            (Method::Get, "/"),
            (Method::Post, "/booking"),
            (Method::Options, "/"),
            (Method::Options, "/preflight"),
            (Method::Get, "/bookings/"),
        ] {
            let rq = TestRequest::new().with_method(method).with_path(path);
            assert!(parse(rq.into()).is_none(), "{path}");
        }
    }

    #[test]
    fn valid_request_ids_are_kept() {
        let id = Uuid::new_v4();
        let rq = TestRequest::new()
            .with_path("/available-rooms")
            .with_header(id_header(&id.hyphenated().to_string()));
        assert_eq!(parse(rq.into()).unwrap().id(), id);

        assert_eq!(request_id(&[id_header(&id.simple().to_string())]), id);
    }

    #[test]
    fn invalid_request_ids_are_replaced() {
        let first = request_id(&[id_header("not-a-uuid")]);
        let second = request_id(&[id_header("not-a-uuid")]);
        assert_ne!(first, second);
        assert_ne!(request_id(&[]), Uuid::nil());
    }

    #[test]
    fn not_found_lists_routes() {
        let res = not_found();
        assert_eq!(res.status_code(), 404);
        assert_eq!(header(&res, "Content-Type"), Some("application/json"));
        assert_eq!(header(&res, "Access-Control-Allow-Origin"), Some("*"));

        let mut body = String::new();
        res.into_reader().read_to_string(&mut body).unwrap();
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        let msg = body["error"].as_str().unwrap();
        for route in ["Post /bookings", "Get /available-rooms", "Get /bookings-for-guest"] {
            assert!(msg.contains(route), "{msg}");
        }
    }

    #[test]
    fn responses_carry_cors_headers() {
        let res = json_response(405, r#"{"error":"Method not allow"}"#.to_owned());
        assert_eq!(res.status_code(), 405);
        for field in [
            "Access-Control-Request-Method",
            "Access-Control-Allow-Origin",
            "Access-Control-Allow-Headers",
            "Access-Control-Expose-Headers",
        ] {
            assert_eq!(header(&res, field), Some("*"), "{field}");
        }

        let res = with_cors(Response::empty(204));
        assert_eq!(res.status_code(), 204);
        assert_eq!(header(&res, "Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(header(&res, "Content-Type"), None);
    }
}
