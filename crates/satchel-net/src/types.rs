use std::{collections::HashMap, time::Duration};

/// Flat, case-sensitive request header map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Headers {
    inner: HashMap<String, String>,
}

impl Headers {
    pub fn new() -> Self {
        Self {
            inner: HashMap::new(),
        }
    }

    /// Headers for a JSON roundtrip: content negotiation plus an optional
    /// bearer token.
    pub fn json(token: Option<&str>) -> Self {
        let mut headers = Self::new();
        headers.insert("Content-Type", "application/json");
        headers.insert("Accept", "application/json");
        if let Some(token) = token {
            if !token.is_empty() {
                headers.insert("Authorization", format!("Bearer {token}"));
            }
        }
        headers
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.inner.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner.get(key).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl From<HashMap<String, String>> for Headers {
    fn from(map: HashMap<String, String>) -> Self {
        Self { inner: map }
    }
}

/// Transport configuration.
#[derive(Clone, Debug)]
pub struct NetOptions {
    /// Per-request timeout for metadata and API roundtrips.
    pub request_timeout: Duration,
    /// Timeout for a single payload transfer, nested inside a resource's
    /// overall fetch deadline.
    pub transfer_timeout: Duration,
    /// Cadence at which an in-flight transfer is re-checked.
    pub poll_interval: Duration,
    /// Max idle connections per host. Set to 0 to disable pooling and reduce memory.
    pub pool_max_idle_per_host: usize,
}

impl Default for NetOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(300),
            transfer_timeout: Duration::from_secs(200),
            poll_interval: Duration::from_millis(200),
            pool_max_idle_per_host: 0,
        }
    }
}

impl NetOptions {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_transfer_timeout(mut self, timeout: Duration) -> Self {
        self.transfer_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }
}
