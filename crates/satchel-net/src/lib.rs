#![forbid(unsafe_code)]

//! # satchel-net
//!
//! Transport surface for the satchel resource layer: the [`Net`] trait over
//! raw byte roundtrips, an [`HttpClient`] implementation on `reqwest`, a
//! [`TimeoutNet`] decorator, and JSON helpers with content negotiation and
//! optional bearer-token authorization.
//!
//! There is deliberately no retry layer here: retries are a caller decision.

mod client;
mod error;
mod timeout;
mod traits;
mod types;

pub use crate::{
    client::HttpClient,
    error::{NetError, NetResult},
    timeout::TimeoutNet,
    traits::{Net, NetExt},
    types::{Headers, NetOptions},
};
