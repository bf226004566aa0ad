use chrono::{Days, Local, NaiveDate};
use hotel_booking_tests::{Api, ApiResponse};

/// Today's date in the local time zone
#[allow(unused)]
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// The date `days` days after today
#[allow(unused)]
pub fn days_from_today(days: u64) -> NaiveDate {
    today() + Days::new(days)
}

/// `n` API handles spread over the handler threads
#[allow(unused)]
pub fn spread(api: &Api, n: usize) -> Vec<Api> {
    std::iter::successors(Some(api.clone()), |api| Some(api.clone()))
        .take(n)
        .collect()
}

/// Asserts that the request failed with `status` and returns the message
#[allow(unused)]
pub fn expect_err<T>(response: ApiResponse<T>, status: u16) -> String {
    match response.result {
        Ok(_) => panic!("The request must fail with status {status}."),
        Err(err) => {
            assert_eq!(err.status, status, "unexpected status, message: {}", err.msg);
            err.msg
        }
    }
}
