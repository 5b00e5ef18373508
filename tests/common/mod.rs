//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use ip2country::{AppConfig, HttpServer, LookupStore, Shutdown};

/// Path to the bundled fixture database.
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/ipdb.csv")
}

/// A server bound to an ephemeral local port.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<LookupStore>,
    pub shutdown: Shutdown,
    pub handle: tokio::task::JoinHandle<Result<(), std::io::Error>>,
}

impl TestServer {
    pub fn url(&self, path_and_query: &str) -> String {
        format!("http://{}{}", self.addr, path_and_query)
    }
}

/// Start a server over `store` admitting `rate_limit` requests per second.
pub async fn start_server(store: Arc<LookupStore>, rate_limit: i64) -> TestServer {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.rate_limit.requests_per_second = rate_limit;

    let listener = tokio::net::TcpListener::bind(&config.listener.bind_address)
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, store.clone());
    let server_shutdown = shutdown.subscribe();
    let handle = tokio::spawn(async move { server.run(listener, server_shutdown).await });

    TestServer {
        addr,
        store,
        shutdown,
        handle,
    }
}

/// Start a server over the fixture database.
pub async fn start_fixture_server(rate_limit: i64) -> TestServer {
    let store = Arc::new(LookupStore::open(fixture_path()).unwrap());
    start_server(store, rate_limit).await
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
