//! Startup orchestration.
//!
//! Order: metrics → IP database (fatal on error) → watcher → listener → serve.
//! Traffic is accepted only once the database is loaded.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use notify::RecommendedWatcher;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use crate::config::AppConfig;
use crate::http::HttpServer;
use crate::ipdb::{DatabaseWatcher, LoadError, LookupStore};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not load IP database: {0}")]
    Database(#[from] LoadError),

    #[error("Could not watch IP database: {0}")]
    Watcher(#[from] notify::Error),

    #[error("Could not start server: {0}")]
    Io(#[from] std::io::Error),
}

/// A fully started service whose listener is bound but not yet serving.
pub struct Started {
    server: HttpServer,
    listener: TcpListener,
    store: Arc<LookupStore>,
    // Dropping the watcher stops it.
    watcher: Option<RecommendedWatcher>,
}

impl Started {
    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// The store the server answers from.
    pub fn store(&self) -> Arc<LookupStore> {
        self.store.clone()
    }

    /// Serve until a value arrives on `shutdown`. The watcher runs until then.
    pub async fn serve(self, shutdown: broadcast::Receiver<()>) -> Result<(), StartupError> {
        let Self {
            server,
            listener,
            watcher,
            ..
        } = self;

        server.run(listener, shutdown).await?;
        drop(watcher);
        Ok(())
    }
}

/// Bring up every subsystem up to a bound listener.
pub async fn start(config: AppConfig) -> Result<Started, StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse::<SocketAddr>() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let store = Arc::new(LookupStore::open(&config.database.path)?);

    let watcher = if config.database.watch {
        let watcher = DatabaseWatcher::new(Path::new(&config.database.path), store.clone());
        Some(watcher.run()?)
    } else {
        None
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, store.clone());

    Ok(Started {
        server,
        listener,
        store,
        watcher,
    })
}

/// Bring up every subsystem and serve until `shutdown` fires.
pub async fn run(config: AppConfig, shutdown: &Shutdown) -> Result<(), StartupError> {
    start(config).await?.serve(shutdown.subscribe()).await
}
