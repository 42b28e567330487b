use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use satchel_client::{ClientOptions, Connection, ResourceClient, TextPayload};
use satchel_core::{RequestStatus, ResourceId, ResourceMetadata};
use satchel_net::{HttpClient, NetOptions};
use satchel_store::StoreOptions;
use satchel_test_utils::{resource_router, ResourceServerState, TestHttpServer};
use serde::Deserialize;
use tempfile::TempDir;

struct Fixture {
    server: TestHttpServer,
    state: ResourceServerState,
    cache_dir: TempDir,
}

impl Fixture {
    async fn new() -> Self {
        let state = ResourceServerState::new();
        let server = TestHttpServer::new(resource_router(state.clone())).await;
        Self {
            server,
            state,
            cache_dir: TempDir::new().unwrap(),
        }
    }

    /// A client with a fresh memo cache and store index over the shared
    /// cache directory.
    fn client(&self) -> ResourceClient {
        let connection = Connection::new(
            self.server.addr(),
            StoreOptions::new(self.cache_dir.path().join("cache")),
        )
        .unwrap();
        let net = HttpClient::new(
            NetOptions::default()
                .with_request_timeout(Duration::from_secs(5))
                .with_transfer_timeout(Duration::from_secs(5))
                .with_poll_interval(Duration::from_millis(20)),
        );
        ResourceClient::new(Arc::new(connection), net, ClientOptions::default())
    }

    /// Register a resource on the fake server and return its identity.
    fn publish(&self, name: &str, version: &str, file: &str, body: &str) -> ResourceId {
        let id = ResourceId::random();
        self.state.insert_payload(file, Bytes::from(body.to_string()));
        self.state.insert_metadata(
            ResourceMetadata::new(id)
                .with_name(name)
                .with_location(self.server.url(&format!("/files/{file}")))
                .with_version(version),
        );
        id
    }
}

#[tokio::test]
async fn fetches_decodes_and_memoizes_a_fresh_resource() {
    let fx = Fixture::new().await;
    let id = fx.publish("greeting", "2021-01-01T00-00-00", "greeting", "hello satchel");
    let client = fx.client();

    let response = client.get_resource::<TextPayload>(id).await;
    assert!(response.succeeded(), "got {:?}", response.result());
    let resource = response.into_payload().unwrap();
    assert_eq!(resource.value().map(String::as_str), Some("hello satchel"));
    assert_eq!(fx.state.payload_hits(), 1);

    // Persisted for later sessions.
    let stored = client.connection().try_get_metadata(id).unwrap().unwrap();
    assert_eq!(stored.name, "greeting");

    // Second call within the memo TTL does not touch the network again.
    let again = client.get_resource::<TextPayload>(id).await;
    assert!(again.succeeded());
    assert_eq!(fx.state.payload_hits(), 1);
}

#[tokio::test]
async fn current_version_is_served_from_disk_without_redownload() {
    let fx = Fixture::new().await;
    let id = fx.publish("track", "2021-06-01T00-00-00", "track", "cached bytes");

    assert!(fx.client().get_resource::<TextPayload>(id).await.succeeded());
    assert_eq!(fx.state.payload_hits(), 1);

    // A later session: empty memo and index, same cache directory, same
    // server version. The payload must come from disk.
    let response = fx.client().get_resource::<TextPayload>(id).await;
    assert!(response.succeeded());
    assert_eq!(
        response.into_payload().unwrap().value().map(String::as_str),
        Some("cached bytes")
    );
    assert_eq!(fx.state.payload_hits(), 1);
}

#[tokio::test]
async fn stale_version_triggers_redownload() {
    let fx = Fixture::new().await;
    let id = fx.publish("level", "2021-01-01T00-00-00", "level", "old bytes");

    assert!(fx.client().get_resource::<TextPayload>(id).await.succeeded());
    assert_eq!(fx.state.payload_hits(), 1);

    // The server moves on to a newer version.
    fx.state.insert_payload("level", Bytes::from_static(b"new bytes"));
    fx.state.insert_metadata(
        ResourceMetadata::new(id)
            .with_name("level")
            .with_location(fx.server.url("/files/level"))
            .with_version("2021-02-01T00-00-00"),
    );

    let response = fx.client().get_resource::<TextPayload>(id).await;
    assert!(response.succeeded());
    assert_eq!(
        response.into_payload().unwrap().value().map(String::as_str),
        Some("new bytes")
    );
    assert_eq!(fx.state.payload_hits(), 2);

    let stored = fx.client().connection().try_get_metadata(id).unwrap().unwrap();
    assert_eq!(stored.version.as_str(), "2021-02-01T00-00-00");
}

#[tokio::test]
async fn remote_failure_falls_back_to_cached_bytes() {
    let fx = Fixture::new().await;
    let id = fx.publish("offline", "2021-01-01T00-00-00", "offline", "kept bytes");

    assert!(fx.client().get_resource::<TextPayload>(id).await.succeeded());

    // The server forgets the resource; the cached copy still serves.
    fx.state.remove_metadata(id);
    let response = fx.client().get_resource::<TextPayload>(id).await;
    assert!(response.succeeded());
    assert_eq!(
        response.into_payload().unwrap().value().map(String::as_str),
        Some("kept bytes")
    );
}

#[tokio::test]
async fn current_version_with_missing_bytes_is_a_reported_anomaly() {
    let fx = Fixture::new().await;
    let id = fx.publish("anomaly", "2021-01-01T00-00-00", "anomaly", "vanishing");

    assert!(fx.client().get_resource::<TextPayload>(id).await.succeeded());

    // Lose the data file but keep the descriptor.
    let cache = fx.cache_dir.path().join("cache");
    for file in std::fs::read_dir(&cache).unwrap() {
        let path = file.unwrap().path();
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        if name.starts_with(&id.to_string()) && !name.ends_with(".json") {
            std::fs::remove_file(path).unwrap();
        }
    }

    let client = fx.client();
    let response = client.get_resource::<TextPayload>(id).await;
    assert!(!response.succeeded());
    assert_eq!(response.status(), RequestStatus::Failed);

    // The orphaned descriptor was healed away.
    assert!(client.connection().try_get_metadata(id).unwrap().is_none());
}

#[tokio::test]
async fn nil_identity_fails_immediately() {
    let fx = Fixture::new().await;
    let response = fx
        .client()
        .get_resource::<TextPayload>(ResourceId::nil())
        .await;
    assert!(!response.succeeded());
    assert_eq!(response.status(), RequestStatus::Failed);
}

#[tokio::test]
async fn unknown_identity_everywhere_reports_unknown_resource_id() {
    let fx = Fixture::new().await;
    let response = fx
        .client()
        .get_resource::<TextPayload>(ResourceId::random())
        .await;
    assert!(!response.succeeded());
    assert_eq!(response.status(), RequestStatus::UnknownResourceId);
}

#[tokio::test]
async fn unreachable_server_with_empty_cache_reports_unknown_resource_id() {
    let cache_dir = TempDir::new().unwrap();
    let connection = Connection::new(
        "127.0.0.1:9".parse().unwrap(),
        StoreOptions::new(cache_dir.path().join("cache")),
    )
    .unwrap();
    let net = HttpClient::new(NetOptions::default().with_request_timeout(Duration::from_secs(2)));
    let client = ResourceClient::new(Arc::new(connection), net, ClientOptions::default());

    let response = client.get_resource::<TextPayload>(ResourceId::random()).await;
    assert!(!response.succeeded());
    assert_eq!(response.status(), RequestStatus::UnknownResourceId);
}

#[tokio::test]
async fn json_resources_deserialize_through_the_text_path() {
    #[derive(Deserialize)]
    struct LevelConfig {
        difficulty: u32,
        title: String,
    }

    let fx = Fixture::new().await;
    let id = fx.publish(
        "config",
        "2021-01-01T00-00-00",
        "config",
        r#"{"difficulty":3,"title":"caves"}"#,
    );

    let response = fx.client().get_json_resource::<LevelConfig>(id).await;
    assert!(response.succeeded());
    let config = response.into_payload().unwrap();
    assert_eq!(config.difficulty, 3);
    assert_eq!(config.title, "caves");
}

#[tokio::test]
async fn malformed_json_resource_reports_failed_to_convert() {
    #[derive(Deserialize)]
    struct LevelConfig {
        #[allow(dead_code)]
        difficulty: u32,
    }

    let fx = Fixture::new().await;
    let id = fx.publish("broken", "2021-01-01T00-00-00", "broken", "not json at all");

    let response = fx.client().get_json_resource::<LevelConfig>(id).await;
    assert!(!response.succeeded());
    assert_eq!(response.status(), RequestStatus::FailedToConvert);
}

#[tokio::test]
async fn health_probe_drives_the_connectivity_flag() {
    let fx = Fixture::new().await;
    let client = fx.client();

    assert!(client.get_health().await);
    assert!(client.connection().is_connected());

    fx.state.set_healthy(false);
    assert!(!client.get_health().await);
    assert!(!client.connection().is_connected());
}
