use std::{
    net::{IpAddr, Ipv6Addr, SocketAddr},
    time::Duration,
};

use satchel_core::{ResourceId, ResourceMetadata};
use satchel_store::{CacheStore, StoreOptions, StoreResult, StoredEntry};
use tokio::sync::watch;
use url::Url;

const URI_SCHEME: &str = "http";
const API_ROOT: &str = "api";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Connection façade: connectivity state, default timeout, base-URL
/// construction, and delegation to the persistent cache store.
///
/// The store's in-process index doubles as the session mirror of what is
/// durably cached, so repeated lookups avoid redundant disk reads.
pub struct Connection {
    endpoint: SocketAddr,
    default_timeout: Duration,
    connected: watch::Sender<bool>,
    store: CacheStore,
}

impl Connection {
    /// Open a connection façade against `endpoint`, creating the cache
    /// directory if needed.
    pub fn new(endpoint: SocketAddr, store_options: StoreOptions) -> StoreResult<Self> {
        tracing::debug!(%endpoint, "using server");
        let (connected, _) = watch::channel(false);
        Ok(Self {
            endpoint,
            default_timeout: DEFAULT_TIMEOUT,
            connected,
            store: CacheStore::open(store_options)?,
        })
    }

    pub fn endpoint(&self) -> SocketAddr {
        self.endpoint
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// The API base for this server, e.g. `http://staging.example.com/api/`.
    ///
    /// A zero port is elided and the IPv6 loopback form is rewritten to
    /// `localhost`.
    pub fn endpoint_base(&self) -> String {
        let host = match self.endpoint.ip() {
            IpAddr::V6(ip) if ip == Ipv6Addr::LOCALHOST => "localhost".to_string(),
            IpAddr::V6(ip) => format!("[{ip}]"),
            IpAddr::V4(ip) => ip.to_string(),
        };

        match self.endpoint.port() {
            0 => format!("{URI_SCHEME}://{host}/{API_ROOT}/"),
            port => format!("{URI_SCHEME}://{host}:{port}/{API_ROOT}/"),
        }
    }

    /// Absolute URL for an API call path.
    pub fn api_url(&self, path: &str) -> Result<Url, url::ParseError> {
        Url::parse(&format!("{}{path}", self.endpoint_base()))
    }

    /// Publish the connectivity flag.
    pub fn set_connected(&self, connected: bool) {
        self.connected.send_replace(connected);
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Subscribe to connectivity changes.
    pub fn connectivity(&self) -> watch::Receiver<bool> {
        self.connected.subscribe()
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn try_get_metadata(&self, id: ResourceId) -> StoreResult<Option<ResourceMetadata>> {
        self.store.try_get_metadata(id)
    }

    pub fn try_get_entry(&self, metadata: &ResourceMetadata) -> StoreResult<Option<StoredEntry>> {
        self.store.try_get_entry(metadata)
    }

    pub fn add_entry(&self, entry: StoredEntry) -> StoreResult<()> {
        self.store.add(entry)
    }
}
