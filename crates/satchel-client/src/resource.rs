use bytes::Bytes;
use satchel_core::{Request, RequestResult, RequestStatus, ResourceMetadata};
use satchel_net::{Net, NetError, NetOptions};
use satchel_store::StoredEntry;
use url::Url;

use crate::payload::Payload;

/// Lifecycle of a single fetch attempt.
///
/// `Ready`, `FetchFailed`, and `ConvertFailed` are terminal for the attempt;
/// a fresh [`Resource::fetch`] call starts a new attempt under the same
/// identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchState {
    /// Constructed, no transfer started.
    Idle,
    /// Transport operation in flight.
    AwaitingBytes,
    /// Bytes landed, decode in progress.
    Converting,
    /// Decoded value available.
    Ready,
    FetchFailed,
    ConvertFailed,
}

/// A typed remote resource: descriptor, raw bytes once fetched, and the
/// decoded value derived from them.
pub struct Resource<P: Payload> {
    metadata: ResourceMetadata,
    bytes: Option<Bytes>,
    value: Option<P::Value>,
    result: RequestResult,
    state: FetchState,
}

impl<P: Payload> Resource<P> {
    /// Construct a resource that will be fetched from its remote location.
    ///
    /// Returns `None` on malformed input: a nil identity or a descriptor with
    /// no location to fetch from.
    pub fn from_metadata(metadata: ResourceMetadata) -> Option<Self> {
        if metadata.id.is_nil() || metadata.location.is_none() {
            tracing::warn!(%metadata, "refusing to construct resource from malformed metadata");
            return None;
        }

        Some(Self {
            metadata,
            bytes: None,
            value: None,
            result: RequestResult::new(Request::new(), RequestStatus::Failed),
            state: FetchState::Idle,
        })
    }

    /// Construct directly from raw bytes (cache reconstruction), attempting
    /// conversion immediately.
    ///
    /// Returns `None` on malformed input or when the bytes do not decode.
    pub fn from_bytes(metadata: ResourceMetadata, bytes: Bytes) -> Option<Self> {
        if metadata.id.is_nil() {
            tracing::warn!(%metadata, "refusing to construct resource from malformed metadata");
            return None;
        }

        let mut resource = Self {
            metadata,
            bytes: Some(bytes),
            value: None,
            result: RequestResult::new(Request::new(), RequestStatus::Failed),
            state: FetchState::Converting,
        };
        resource.convert().then_some(resource)
    }

    /// Reconstruct from a persisted cache entry.
    pub fn from_entry(entry: &StoredEntry) -> Option<Self> {
        Self::from_bytes(entry.metadata.clone(), entry.bytes.clone())
    }

    pub fn metadata(&self) -> &ResourceMetadata {
        &self.metadata
    }

    pub fn bytes(&self) -> Option<&Bytes> {
        self.bytes.as_ref()
    }

    pub fn value(&self) -> Option<&P::Value> {
        self.value.as_ref()
    }

    /// Outcome of the last fetch or convert attempt.
    pub fn result(&self) -> &RequestResult {
        &self.result
    }

    pub fn state(&self) -> FetchState {
        self.state
    }

    /// View this resource as a persistable cache entry. `None` until bytes
    /// have been fetched.
    pub fn to_entry(&self) -> Option<StoredEntry> {
        let bytes = self.bytes.clone()?;
        Some(StoredEntry::new(self.metadata.clone(), P::KIND, bytes))
    }

    /// Fetch and convert the resource payload.
    ///
    /// The transport operation runs detached, bounded by
    /// `options.transfer_timeout`; this task re-checks it on the
    /// `options.poll_interval` cadence until `options.request_timeout`
    /// elapses, at which point the attempt is `TimedOut` and the in-flight
    /// transfer is abandoned (detached, never force-cancelled). The returned
    /// future resolves exactly once; there is no automatic retry.
    ///
    /// Returns `true` when the decoded value is [`FetchState::Ready`].
    pub async fn fetch<N>(&mut self, net: &N, options: &NetOptions) -> bool
    where
        N: Net + Clone + 'static,
    {
        let request = Request::new();
        self.bytes = None;
        self.value = None;
        self.result = RequestResult::new(request.clone(), RequestStatus::Failed);

        let Some(location) = self.metadata.location.clone() else {
            self.state = FetchState::FetchFailed;
            self.result = RequestResult::with_message(
                request,
                RequestStatus::UnknownResourceUri,
                "resource has no location",
            );
            return false;
        };

        self.state = FetchState::AwaitingBytes;
        match poll_transfer(net, location.clone(), options).await {
            Ok(bytes) if bytes.is_empty() => {
                tracing::warn!(%location, "no data fetching resource");
                self.state = FetchState::FetchFailed;
                self.result =
                    RequestResult::with_message(request, RequestStatus::Failed, "empty payload");
                false
            }
            Ok(bytes) => {
                self.bytes = Some(bytes);
                self.state = FetchState::Converting;
                self.result = RequestResult::ok(request);
                self.convert()
            }
            Err(error) => {
                let status = error.request_status();
                tracing::warn!(%location, %error, %status, "fetch failed");
                self.state = FetchState::FetchFailed;
                self.result = RequestResult::with_message(request, status, error.to_string());
                false
            }
        }
    }

    /// Decode held bytes into the typed value.
    ///
    /// Pure over the bytes and guarded so repeated calls after success do not
    /// re-decode. Returns `true` when the value is available.
    pub fn convert(&mut self) -> bool {
        if self.state == FetchState::Ready {
            return true;
        }

        let Some(bytes) = self.bytes.as_ref() else {
            return false;
        };

        match P::decode(bytes) {
            Ok(value) => {
                self.value = Some(value);
                self.state = FetchState::Ready;
                true
            }
            Err(error) => {
                tracing::error!(metadata = %self.metadata, %error, "failed to convert resource");
                self.state = FetchState::ConvertFailed;
                self.result = RequestResult::with_message(
                    self.result.request.clone(),
                    RequestStatus::FailedToConvert,
                    error.to_string(),
                );
                false
            }
        }
    }
}

/// Drive a detached transfer to completion under the overall deadline.
///
/// The transfer itself is bounded by `transfer_timeout`; this loop re-checks
/// the detached task every `poll_interval` and gives up at `request_timeout`,
/// leaving the task to finish (or fail) on its own.
async fn poll_transfer<N>(net: &N, url: Url, options: &NetOptions) -> Result<Bytes, NetError>
where
    N: Net + Clone + 'static,
{
    let transfer_timeout = options.transfer_timeout;
    let handle = tokio::spawn({
        let net = net.clone();
        let url = url.clone();
        async move { tokio::time::timeout(transfer_timeout, net.get_bytes(url, None)).await }
    });

    let deadline = tokio::time::Instant::now() + options.request_timeout;
    let mut cadence = tokio::time::interval(options.poll_interval);
    cadence.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        if handle.is_finished() {
            return match handle.await {
                Ok(Ok(result)) => result,
                Ok(Err(_elapsed)) => Err(NetError::timeout()),
                Err(join_error) => Err(NetError::http(join_error.to_string())),
            };
        }

        if tokio::time::Instant::now() >= deadline {
            // Abandon best-effort: the detached task keeps running but nobody
            // observes its outcome, so this attempt resolves exactly once.
            drop(handle);
            return Err(NetError::timeout());
        }

        cadence.tick().await;
    }
}
