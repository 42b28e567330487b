#![forbid(unsafe_code)]

//! Shared test utilities for the satchel workspace.

pub mod http_server;
pub mod resource_server;

pub use http_server::TestHttpServer;
pub use resource_server::{resource_router, ResourceServerState};
