use bytes::Bytes;
use thiserror::Error;

/// Decode failure, distinct from any transport-status failure.
#[derive(Debug, Error, Clone)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidText(String),
    #[error("codec failed: {0}")]
    Codec(String),
}

/// Decode capability of a payload kind: a pure function from raw bytes to a
/// typed value.
///
/// Decoding must be deterministic, must not mutate the bytes, and is invoked
/// at most once per successful fetch. Concrete binary codecs (audio frames,
/// image pixels) live outside this crate; they plug in by implementing this
/// trait. [`BytesPayload`] and [`TextPayload`] cover the built-in kinds.
pub trait Payload: Send + Sync + 'static {
    /// The decoded in-memory value.
    type Value: Send + Sync + 'static;

    /// Kind tag, embedded in cache data file names.
    const KIND: &'static str;

    fn decode(bytes: &Bytes) -> Result<Self::Value, DecodeError>;
}

/// A raw sequence of bytes; decoding is the identity.
pub struct BytesPayload;

impl Payload for BytesPayload {
    type Value = Bytes;

    const KIND: &'static str = "bytes";

    fn decode(bytes: &Bytes) -> Result<Self::Value, DecodeError> {
        Ok(bytes.clone())
    }
}

/// A UTF-8 text payload.
pub struct TextPayload;

impl Payload for TextPayload {
    type Value = String;

    const KIND: &'static str = "text";

    fn decode(bytes: &Bytes) -> Result<Self::Value, DecodeError> {
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|e| DecodeError::InvalidText(e.to_string()))
    }
}
