#![forbid(unsafe_code)]

//! # Satchel
//!
//! Facade crate for the satchel resource layer: fetch remotely-hosted,
//! versioned binary assets and cache them durably on disk, preferring local
//! copies over the network while staying consistent with the server's notion
//! of "latest version".
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use satchel::prelude::*;
//!
//! let connection = Arc::new(Connection::new(
//!     "10.0.0.5:8080".parse()?,
//!     StoreOptions::new("/var/cache/satchel"),
//! )?);
//! let client = ResourceClient::new(
//!     connection,
//!     HttpClient::new(NetOptions::default()),
//!     ClientOptions::default(),
//! );
//!
//! let response = client.get_resource::<TextPayload>(id).await;
//! if let Some(resource) = response.into_payload() {
//!     println!("{}", resource.value().unwrap());
//! }
//! ```

// ── Re-export sub-crates ────────────────────────────────────────────────

pub mod core {
    pub use satchel_core::*;
}

pub mod net {
    pub use satchel_net::*;
}

pub mod store {
    pub use satchel_store::*;
}

pub mod client {
    pub use satchel_client::*;
}

/// Commonly used types, importable in one line.
pub mod prelude {
    pub use satchel_client::{
        BytesPayload, ClientOptions, Connection, Payload, Resource, ResourceClient, TextPayload,
    };
    pub use satchel_core::{
        Request, RequestResult, RequestStatus, ResourceId, ResourceMetadata, Response, Version,
    };
    pub use satchel_net::{HttpClient, NetOptions};
    pub use satchel_store::{CacheStore, StoreOptions};
}
