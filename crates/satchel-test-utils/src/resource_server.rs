//! In-memory fake of the resource server API.
//!
//! Serves the routes the satchel client consumes: `GET /api/health`,
//! `GET /api/resource/guid/{id}`, and registered payload files under
//! `/files/{name}`. Payload hits are counted so tests can assert whether a
//! download actually happened.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use bytes::Bytes;
use satchel_core::{ResourceId, ResourceMetadata};

#[derive(Default)]
struct Inner {
    metadata: Mutex<HashMap<ResourceId, ResourceMetadata>>,
    payloads: Mutex<HashMap<String, Bytes>>,
    payload_hits: AtomicUsize,
    healthy: AtomicBool,
}

/// Shared, clonable state backing [`resource_router`].
#[derive(Clone, Default)]
pub struct ResourceServerState {
    inner: Arc<Inner>,
}

impl ResourceServerState {
    pub fn new() -> Self {
        let state = Self::default();
        state.inner.healthy.store(true, Ordering::Relaxed);
        state
    }

    /// Register metadata served from `GET /api/resource/guid/{id}`.
    pub fn insert_metadata(&self, metadata: ResourceMetadata) {
        self.inner
            .metadata
            .lock()
            .unwrap()
            .insert(metadata.id, metadata);
    }

    pub fn remove_metadata(&self, id: ResourceId) {
        self.inner.metadata.lock().unwrap().remove(&id);
    }

    /// Register a payload served from `GET /files/{name}`.
    pub fn insert_payload(&self, name: impl Into<String>, bytes: impl Into<Bytes>) {
        self.inner
            .payloads
            .lock()
            .unwrap()
            .insert(name.into(), bytes.into());
    }

    /// Number of payload downloads served so far.
    pub fn payload_hits(&self) -> usize {
        self.inner.payload_hits.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.inner.healthy.store(healthy, Ordering::Relaxed);
    }
}

async fn health(State(state): State<ResourceServerState>) -> impl IntoResponse {
    let health = if state.inner.healthy.load(Ordering::Relaxed) {
        "ok"
    } else {
        "degraded"
    };
    Json(serde_json::json!({ "health": health }))
}

async fn metadata(
    State(state): State<ResourceServerState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let Ok(id) = id.parse::<ResourceId>() else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let found = state.inner.metadata.lock().unwrap().get(&id).cloned();
    match found {
        Some(meta) => Json(meta).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn payload(
    State(state): State<ResourceServerState>,
    Path(name): Path<String>,
) -> impl IntoResponse {
    let found = state.inner.payloads.lock().unwrap().get(&name).cloned();
    match found {
        Some(bytes) => {
            state.inner.payload_hits.fetch_add(1, Ordering::Relaxed);
            bytes.into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Router exposing the fake resource server over `state`.
pub fn resource_router(state: ResourceServerState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/resource/guid/{id}", get(metadata))
        .route("/files/{name}", get(payload))
        .with_state(state)
}
