use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};

/// Process-wide request sequence. Initialized once, never reset.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// A request sent to or received from a service.
///
/// Each request carries a process-wide monotonic id so that responses can be
/// correlated with the operation that produced them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Request {
    /// The unique id for this request.
    pub id: u64,
    /// When the request was created.
    pub created: SystemTime,
    /// When the request was processed by the server, if it was mirrored back.
    pub serviced: Option<SystemTime>,
}

impl Request {
    /// Make a request client-side to send to a server.
    pub fn new() -> Self {
        Self {
            id: NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed),
            created: SystemTime::now(),
            serviced: None,
        }
    }

    /// Make a request server-side from a client-originated request, stamping
    /// the time it was serviced.
    pub fn serviced(received: &Request) -> Self {
        Self {
            id: received.id,
            created: received.created,
            serviced: Some(SystemTime::now()),
        }
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Possible return status for remote requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    NotFound,
    TimedOut,
    BadRequest,
    Unauthorised,
    Success,
    UnknownResourceId,
    UnknownResourceUri,
    Failed,
    DuplicateId,
    FailedToConvert,
    NetworkError,
    InternalServerError,
}

impl RequestStatus {
    /// Classify an HTTP status code.
    ///
    /// Codes with no specific mapping collapse to [`RequestStatus::Failed`].
    pub fn from_http(code: u16) -> Self {
        match code {
            200 | 201 | 202 => Self::Success,
            400 => Self::BadRequest,
            401 => Self::Unauthorised,
            404 => Self::NotFound,
            408 => Self::TimedOut,
            500 => Self::InternalServerError,
            _ => Self::Failed,
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// The result of a request made to a server.
#[derive(Clone, Debug)]
pub struct RequestResult {
    /// The original request that was made.
    pub request: Request,
    /// The returned status of the request.
    pub status: RequestStatus,
    /// Supporting text to go with the status.
    pub message: String,
}

impl RequestResult {
    pub fn new(request: Request, status: RequestStatus) -> Self {
        Self {
            request,
            status,
            message: String::new(),
        }
    }

    pub fn with_message(request: Request, status: RequestStatus, message: impl Into<String>) -> Self {
        Self {
            request,
            status,
            message: message.into(),
        }
    }

    /// A successful result for `request`.
    pub fn ok(request: Request) -> Self {
        Self::new(request, RequestStatus::Success)
    }

    pub fn succeeded(&self) -> bool {
        self.status.is_success()
    }

    pub fn failed(&self) -> bool {
        !self.succeeded()
    }
}

impl fmt::Display for RequestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status={} Msg='{}'", self.status, self.message)
    }
}
