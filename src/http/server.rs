//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the lookup routes
//! - Wire up middleware (request ID, tracing, timeout)
//! - Serve on a listener until the shutdown signal fires

use std::sync::Arc;
use std::time::Duration;

use axum::{body::Body, http::Request, routing::get, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::http::handlers::find_country;
use crate::ipdb::IpDatabase;
use crate::pipeline::RequestPipeline;
use crate::security::AdmissionGate;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: RequestPipeline,
}

/// HTTP server for the lookup API.
pub struct HttpServer {
    router: Router,
    config: AppConfig,
}

impl HttpServer {
    /// Create a new HTTP server over `database`.
    ///
    /// The admission gate is created here, so each server owns one global limit.
    pub fn new(config: AppConfig, database: Arc<dyn IpDatabase>) -> Self {
        let gate = Arc::new(AdmissionGate::new(config.rate_limit.requests_per_second));
        let state = AppState {
            pipeline: RequestPipeline::new(gate, database),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &AppConfig, state: AppState) -> Router {
        Router::new()
            .route("/api/v1/find-country", get(find_country))
            .route("/v1/find-country", get(find_country))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        let request_id = request
                            .headers()
                            .get("x-request-id")
                            .and_then(|v| v.to_str().ok())
                            .unwrap_or("unknown");
                        tracing::info_span!(
                            "request",
                            request_id = %request_id,
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.timeouts.request_secs,
                    ))),
            )
    }

    /// The router, for serving or for driving requests directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until a value arrives on `shutdown`.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limit = self.config.rate_limit.requests_per_second,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
