use std::{fmt, time::SystemTime};

use crate::request::{Request, RequestResult, RequestStatus};

/// Completion value of a request: a [`RequestResult`] plus an optional typed
/// payload. Succeeded iff the result status is [`RequestStatus::Success`].
#[derive(Clone, Debug)]
pub struct Response<T> {
    result: RequestResult,
    payload: Option<T>,
    received: SystemTime,
}

impl<T> Response<T> {
    /// A successful response carrying `payload`.
    pub fn ok(request: Request, payload: T) -> Self {
        Self {
            result: RequestResult::ok(request),
            payload: Some(payload),
            received: SystemTime::now(),
        }
    }

    /// A response completed with a non-success `status` and no payload.
    pub fn failed(request: Request, status: RequestStatus) -> Self {
        Self::from_result(RequestResult::new(request, status))
    }

    /// Like [`Response::failed`] with supporting message text.
    pub fn failed_with(request: Request, status: RequestStatus, message: impl Into<String>) -> Self {
        Self::from_result(RequestResult::with_message(request, status, message))
    }

    /// Wrap an already-built result.
    pub fn from_result(result: RequestResult) -> Self {
        Self {
            result,
            payload: None,
            received: SystemTime::now(),
        }
    }

    pub fn succeeded(&self) -> bool {
        self.result.succeeded()
    }

    pub fn status(&self) -> RequestStatus {
        self.result.status
    }

    pub fn result(&self) -> &RequestResult {
        &self.result
    }

    pub fn request(&self) -> &Request {
        &self.result.request
    }

    pub fn received(&self) -> SystemTime {
        self.received
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn into_payload(self) -> Option<T> {
        self.payload
    }

    /// Split into result and payload.
    pub fn into_parts(self) -> (RequestResult, Option<T>) {
        (self.result, self.payload)
    }

    /// Carry the failure over to a response of another payload type.
    ///
    /// Panics in debug builds if called on a successful response, since the
    /// payload cannot be converted.
    pub fn cast_failure<U>(self) -> Response<U> {
        debug_assert!(self.result.failed());
        Response {
            result: self.result,
            payload: None,
            received: self.received,
        }
    }
}

impl<T> fmt::Display for Response<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Request={}, Result={}, Succeeded={}",
            self.result.request,
            self.result,
            self.succeeded()
        )
    }
}
