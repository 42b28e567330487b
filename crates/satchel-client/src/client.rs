use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use satchel_core::{Request, RequestStatus, Response, ResourceId, ResourceMetadata};
use satchel_net::{Headers, HttpClient};
use satchel_store::StoredEntry;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    connection::Connection,
    payload::{Payload, TextPayload},
    resource::Resource,
};

/// Orchestrator configuration.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    /// Bearer token attached to API calls when present.
    pub token: Option<String>,
    /// Time a memoized resource stays servable without consulting caches.
    pub memo_ttl: Duration,
    /// Deadline for the health probe.
    pub health_timeout: Duration,
    /// Deadline for POST roundtrips.
    pub post_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            token: None,
            memo_ttl: Duration::from_secs(5 * 60),
            health_timeout: Duration::from_secs(5),
            post_timeout: Duration::from_secs(3),
        }
    }
}

impl ClientOptions {
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_memo_ttl(mut self, ttl: Duration) -> Self {
        self.memo_ttl = ttl;
        self
    }
}

#[derive(Deserialize)]
struct HealthResult {
    health: String,
}

struct MemoEntry {
    entry: StoredEntry,
    last_accessed: Instant,
}

/// Top-level entry point for fetching remote resources.
///
/// Applies the read-through, version-aware policy over a short-TTL memo
/// cache, the persistent disk cache, and the network. Every operation
/// resolves to a populated [`Response`]; failures are reported through the
/// response status, never through a panic or a hung future.
pub struct ResourceClient {
    connection: Arc<Connection>,
    net: HttpClient,
    options: ClientOptions,
    memo: Mutex<HashMap<ResourceId, MemoEntry>>,
}

impl ResourceClient {
    pub fn new(connection: Arc<Connection>, net: HttpClient, options: ClientOptions) -> Self {
        Self {
            connection,
            net,
            options,
            memo: Mutex::new(HashMap::new()),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Probe `GET health` and publish the result to the connection's
    /// connectivity flag.
    pub async fn get_health(&self) -> bool {
        let probe = self.get::<HealthResult>("health");
        let healthy = match tokio::time::timeout(self.options.health_timeout, probe).await {
            Ok(response) => match response.into_payload() {
                Some(health) => health.health == "ok",
                None => false,
            },
            Err(_) => false,
        };

        if !healthy {
            tracing::warn!(endpoint = %self.connection.endpoint(), "failed to connect to server");
        }
        self.connection.set_connected(healthy);
        healthy
    }

    /// Single GET roundtrip against the API, deserializing a JSON body.
    ///
    /// Malformed bodies report `Failed` with the parse error attached,
    /// distinct from transport failures which keep their own status.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Response<T> {
        let request = Request::new();
        let Ok(url) = self.connection.api_url(path) else {
            return Response::failed_with(request, RequestStatus::Failed, "invalid API path");
        };

        tracing::debug!(%url, %request, "GET");
        let headers = Headers::json(self.options.token.as_deref());
        let call = self.net.get_json::<T>(url, Some(headers));
        match tokio::time::timeout(self.connection.default_timeout(), call).await {
            Ok(Ok(value)) => Response::ok(request, value),
            Ok(Err(error)) => {
                tracing::warn!(%error, %request, "GET failed");
                Response::failed_with(request, error.request_status(), error.to_string())
            }
            Err(_) => Response::failed_with(request, RequestStatus::TimedOut, "timed out"),
        }
    }

    /// Single POST roundtrip against the API with a JSON body.
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Response<T> {
        let request = Request::new();
        let Ok(url) = self.connection.api_url(path) else {
            return Response::failed_with(request, RequestStatus::Failed, "invalid API path");
        };

        tracing::debug!(%url, %request, "POST");
        let headers = Headers::json(self.options.token.as_deref());
        let call = self.net.post_json::<T, B>(url, body, Some(headers));
        match tokio::time::timeout(self.options.post_timeout, call).await {
            Ok(Ok(value)) => Response::ok(request, value),
            Ok(Err(error)) => {
                tracing::warn!(%error, %request, "POST failed");
                Response::failed_with(request, error.request_status(), error.to_string())
            }
            Err(_) => Response::failed_with(request, RequestStatus::TimedOut, "timed out"),
        }
    }

    /// Resolve a resource by identity, preferring the memo cache, then the
    /// persistent cache when it is current against the server, then a fresh
    /// download. See the crate docs for the full decision policy.
    pub async fn get_resource<P: Payload>(&self, id: ResourceId) -> Response<Resource<P>> {
        let request = Request::new();
        let work = self.get_resource_inner::<P>(request.clone(), id);
        let response = match tokio::time::timeout(self.connection.default_timeout(), work).await {
            Ok(response) => response,
            Err(_) => Response::failed_with(
                request,
                RequestStatus::TimedOut,
                "resource request timed out",
            ),
        };

        if response.succeeded() {
            if let Some(entry) = response.payload().and_then(|resource| resource.to_entry()) {
                self.memo_insert(entry);
            }
        }
        response
    }

    /// Fetch a resource through the text path and deserialize it as JSON.
    ///
    /// Deserialization failure maps to `FailedToConvert` while preserving
    /// the original request identity; upstream failures collapse to `Failed`.
    pub async fn get_json_resource<T: DeserializeOwned>(&self, id: ResourceId) -> Response<T> {
        let request = Request::new();
        let response = self.get_resource::<TextPayload>(id).await;
        if !response.succeeded() {
            return Response::failed(request, RequestStatus::Failed);
        }

        let text = response
            .into_payload()
            .and_then(|resource| resource.value().cloned());
        let Some(text) = text else {
            return Response::failed(request, RequestStatus::Failed);
        };

        match serde_json::from_str::<T>(&text) {
            Ok(value) => Response::ok(request, value),
            Err(error) => {
                tracing::warn!(%id, %error, "failed to deserialize JSON resource");
                Response::failed_with(request, RequestStatus::FailedToConvert, error.to_string())
            }
        }
    }

    async fn get_resource_inner<P: Payload>(
        &self,
        request: Request,
        id: ResourceId,
    ) -> Response<Resource<P>> {
        if id.is_nil() {
            tracing::warn!("won't get an empty resource id");
            return Response::failed(request, RequestStatus::Failed);
        }

        if let Some(entry) = self.memo_lookup(id) {
            tracing::debug!(%id, "using memoized resource");
            if let Some(resource) = Resource::<P>::from_entry(&entry) {
                return Response::ok(request, resource);
            }
        }

        // Remote metadata and the local descriptor race; the decision below
        // needs both sides.
        let remote_path = format!("resource/guid/{id}");
        let (remote, local) = tokio::join!(
            self.get::<ResourceMetadata>(&remote_path),
            async { self.local_metadata(id) }
        );
        let remote = if remote.succeeded() {
            remote.into_payload()
        } else {
            None
        };

        match (remote, local) {
            (None, Some(local_meta)) => {
                // Server unreachable or ignorant of the id; cached bytes are
                // the best we have.
                if let Some(resource) = self.from_cache::<P>(&local_meta) {
                    return Response::ok(request, resource);
                }
                tracing::debug!(
                    %id,
                    "found metadata but no resource, attempting download from server"
                );
                self.download(request, local_meta).await
            }
            (Some(remote_meta), Some(local_meta)) => {
                if local_meta.is_current_against(&remote_meta) {
                    tracing::debug!(
                        name = %local_meta.name,
                        %id,
                        version = %local_meta.version,
                        remote_version = %remote_meta.version,
                        "resource up-to-date"
                    );
                    if let Some(resource) = self.from_cache::<P>(&local_meta) {
                        return Response::ok(request, resource);
                    }
                    // Descriptor without bytes while the server agrees on the
                    // version: a cache-consistency anomaly, surfaced rather
                    // than silently re-downloaded.
                    tracing::warn!(%id, "cached metadata has no matching bytes");
                    return Response::failed(request, RequestStatus::Failed);
                }

                tracing::debug!(
                    name = %remote_meta.name,
                    %id,
                    "cached version is out of date, downloading"
                );
                self.download(request, remote_meta).await
            }
            (Some(remote_meta), None) => self.download(request, remote_meta).await,
            (None, None) => Response::failed_with(
                request,
                RequestStatus::UnknownResourceId,
                format!("unknown resource: {id}"),
            ),
        }
    }

    async fn download<P: Payload>(
        &self,
        request: Request,
        metadata: ResourceMetadata,
    ) -> Response<Resource<P>> {
        let id = metadata.id;
        let Some(mut resource) = Resource::<P>::from_metadata(metadata) else {
            return Response::failed_with(request, RequestStatus::Failed, "malformed metadata");
        };

        if !resource.fetch(&self.net, self.net.options()).await {
            let result = resource.result();
            return Response::failed_with(request, result.status, result.message.clone());
        }

        if let Some(entry) = resource.to_entry() {
            if let Err(error) = self.connection.add_entry(entry) {
                tracing::warn!(%id, %error, "failed to store resource");
            }
        }

        Response::ok(request, resource)
    }

    fn local_metadata(&self, id: ResourceId) -> Option<ResourceMetadata> {
        match self.connection.try_get_metadata(id) {
            Ok(found) => found,
            Err(error) => {
                tracing::warn!(%id, %error, "local metadata lookup failed");
                None
            }
        }
    }

    fn from_cache<P: Payload>(&self, metadata: &ResourceMetadata) -> Option<Resource<P>> {
        match self.connection.try_get_entry(metadata) {
            Ok(Some(entry)) => Resource::from_entry(&entry),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(id = %metadata.id, %error, "cache lookup failed");
                None
            }
        }
    }

    fn memo_lookup(&self, id: ResourceId) -> Option<StoredEntry> {
        let memo = self.memo.lock().expect("memo cache poisoned");
        let memoized = memo.get(&id)?;
        if memoized.last_accessed.elapsed() < self.options.memo_ttl {
            Some(memoized.entry.clone())
        } else {
            None
        }
    }

    fn memo_insert(&self, entry: StoredEntry) {
        self.memo.lock().expect("memo cache poisoned").insert(
            entry.id(),
            MemoEntry {
                entry,
                last_accessed: Instant::now(),
            },
        );
    }
}
