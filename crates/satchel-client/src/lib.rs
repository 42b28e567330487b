#![forbid(unsafe_code)]

//! # satchel-client
//!
//! The client side of the satchel resource layer: a typed per-resource
//! fetch/convert state machine ([`Resource`]), the read-through,
//! version-aware orchestration policy ([`ResourceClient`]), and the
//! connection façade tying connectivity state, URL construction, and the
//! persistent cache together ([`Connection`]).
//!
//! ## Read-through policy
//!
//! `get_resource` prefers, in order: a short-TTL memo cache, the persistent
//! disk cache (when its version is at least the server's), and finally a
//! fresh download. The memo cache is an optimization only and never
//! authoritative; the server's metadata decides what "latest" means.

mod client;
mod connection;
mod payload;
mod resource;

pub use client::{ClientOptions, ResourceClient};
pub use connection::Connection;
pub use payload::{BytesPayload, DecodeError, Payload, TextPayload};
pub use resource::{FetchState, Resource};
