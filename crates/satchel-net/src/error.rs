use satchel_core::RequestStatus;
use thiserror::Error;

/// Centralized error type for satchel-net.
#[derive(Debug, Error, Clone)]
pub enum NetError {
    /// Transport-level failure before or without an HTTP status (unreachable
    /// host, connection reset, malformed URL).
    #[error("HTTP request failed: {0}")]
    Http(String),
    /// The server answered with a non-success HTTP status.
    #[error("HTTP {status} for URL: {url}")]
    HttpStatus { status: u16, url: String },
    /// The call did not complete within its deadline.
    #[error("Timeout")]
    Timeout,
    /// The body arrived but could not be decoded as the expected structure.
    /// Distinct from transport failure.
    #[error("Malformed response body: {0}")]
    Decode(String),
}

impl NetError {
    /// Creates an HTTP status error.
    pub fn http_status(status: u16, url: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            url: url.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout() -> Self {
        Self::Timeout
    }

    /// Creates a transport error from a generic string.
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, NetError::Timeout)
    }

    /// Gets the HTTP status code if this is an HTTP status error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            NetError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify this failure in protocol terms.
    pub fn request_status(&self) -> RequestStatus {
        match self {
            NetError::HttpStatus { status, .. } => RequestStatus::from_http(*status),
            NetError::Timeout => RequestStatus::TimedOut,
            NetError::Http(_) => RequestStatus::NetworkError,
            NetError::Decode(_) => RequestStatus::Failed,
        }
    }
}

impl From<reqwest::Error> for NetError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(error.to_string())
        }
    }
}

pub type NetResult<T> = Result<T, NetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_errors_classify_by_code() {
        assert_eq!(
            NetError::http_status(404, "http://x/").request_status(),
            RequestStatus::NotFound
        );
        assert_eq!(
            NetError::http_status(401, "http://x/").request_status(),
            RequestStatus::Unauthorised
        );
        assert_eq!(
            NetError::http_status(500, "http://x/").request_status(),
            RequestStatus::InternalServerError
        );
        assert_eq!(
            NetError::http_status(418, "http://x/").request_status(),
            RequestStatus::Failed
        );
    }

    #[test]
    fn transport_failures_are_network_errors() {
        assert_eq!(
            NetError::http("connection refused").request_status(),
            RequestStatus::NetworkError
        );
    }

    #[test]
    fn timeouts_and_decodes_are_distinct() {
        assert_eq!(NetError::timeout().request_status(), RequestStatus::TimedOut);
        assert!(NetError::timeout().is_timeout());
        assert_eq!(
            NetError::Decode("expected value".into()).request_status(),
            RequestStatus::Failed
        );
    }

    #[test]
    fn status_code_accessor() {
        assert_eq!(NetError::http_status(404, "http://x/").status_code(), Some(404));
        assert_eq!(NetError::timeout().status_code(), None);
    }
}
