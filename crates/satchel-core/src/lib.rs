#![forbid(unsafe_code)]

//! # satchel-core
//!
//! Shared protocol and result types for the satchel resource layer.
//!
//! Everything a server and client exchange lives here: request identity and
//! sequencing ([`Request`]), outcome classification ([`RequestStatus`],
//! [`RequestResult`]), typed completion values ([`Response`]), and the
//! descriptor record for fetchable assets ([`ResourceMetadata`]).

mod error;
mod metadata;
mod request;
mod response;

pub use error::{CoreError, CoreResult};
pub use metadata::{ResourceId, ResourceMetadata, Version};
pub use request::{Request, RequestResult, RequestStatus};
pub use response::Response;
