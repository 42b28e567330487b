use std::{cmp::Ordering, fmt, str::FromStr, time::SystemTime};

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::CoreError;

/// Globally unique identity of a resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Mint a fresh random identity (client-side resources, tests).
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// The empty identity. Never a valid resource.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }

    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ResourceId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

impl FromStr for ResourceId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| CoreError::InvalidId(e.to_string()))
    }
}

/// Resource version token.
///
/// "Newer" is defined by ordinal (byte-wise) comparison of the token, not by
/// date parsing. Servers happen to issue timestamp-shaped tokens
/// (`YYYY-MM-DDThh-mm-ss`), which sort correctly under this rule.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Version {
    fn from(token: &str) -> Self {
        Self::new(token)
    }
}

/// Default advisory size for resources whose real size is unknown.
const DEFAULT_SIZE_HINT: u64 = 1000;

/// Descriptor record for a fetchable asset, shared with the server.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMetadata {
    /// Globally unique id for the resource.
    pub id: ResourceId,
    /// Human-readable name. Optional, used for inspectable cache file names.
    #[serde(default)]
    pub name: String,
    /// Optional description.
    #[serde(default)]
    pub description: String,
    /// The remote location of the resource payload.
    #[serde(default)]
    pub location: Option<Url>,
    /// Advisory payload size in bytes, used to estimate download time.
    #[serde(default = "default_size_hint")]
    pub size_hint: u64,
    /// Version token, ordinally ordered.
    #[serde(default)]
    pub version: Version,
    /// When this resource was last accessed in the cache. Local bookkeeping,
    /// never serialized.
    #[serde(skip)]
    pub last_access_time: Option<SystemTime>,
}

fn default_size_hint() -> u64 {
    DEFAULT_SIZE_HINT
}

impl ResourceMetadata {
    pub fn new(id: ResourceId) -> Self {
        Self {
            id,
            name: String::new(),
            description: String::new(),
            location: None,
            size_hint: DEFAULT_SIZE_HINT,
            version: Version::default(),
            last_access_time: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_location(mut self, location: Url) -> Self {
        self.location = Some(location);
        self
    }

    pub fn with_version(mut self, version: impl Into<Version>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_size_hint(mut self, size_hint: u64) -> Self {
        self.size_hint = size_hint;
        self
    }

    /// True when this (local) descriptor is at least as new as `remote`.
    pub fn is_current_against(&self, remote: &ResourceMetadata) -> bool {
        self.version >= remote.version
    }
}

impl fmt::Display for ResourceMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Name={}, Id={}, Version={}, SizeHint={}",
            self.name, self.id, self.version, self.size_hint
        )
    }
}
