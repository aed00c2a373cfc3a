//! HTTP server with graceful shutdown

use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};

use crate::{config::Config, error::Result, middleware::request_tracking};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the server with the given router until SIGINT or SIGTERM
    pub async fn serve(self, app: Router) -> Result<()> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.service.port));
        tracing::info!("Starting {} on {}", self.config.service.name, addr);

        let listener = TcpListener::bind(&addr).await?;
        self.serve_with_shutdown(listener, app, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// In-flight requests are drained before this returns.
    pub async fn serve_with_shutdown<F>(
        self,
        listener: TcpListener,
        app: Router,
        shutdown: F,
    ) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.log_middleware_config();
        let app = self.layered(app)?;

        tracing::info!("Server listening on {}", listener.local_addr()?);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }

    /// Wrap `app` in the configured middleware stack
    ///
    /// The last layer added is the outermost, so the request ID is assigned
    /// before tracing starts and panics are caught closest to the handlers.
    pub fn layered(&self, app: Router) -> Result<Router> {
        let middleware = &self.config.middleware;

        let mut app = app;
        if middleware.catch_panic {
            app = app.layer(CatchPanicLayer::new());
        }

        app = app.layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        );
        app = request_tracking::apply(app, &middleware.request_tracking)?;

        app = app
            .layer(RequestBodyLimitLayer::new(middleware.body_limit_bytes()))
            .layer(TimeoutLayer::with_status_code(
                http::StatusCode::REQUEST_TIMEOUT,
                self.config.service.timeout(),
            ));

        if middleware.compression {
            app = app.layer(CompressionLayer::new());
        }

        if let Some(cors) = self.build_cors_layer() {
            app = app.layer(cors);
        }

        Ok(app)
    }

    /// Log middleware configuration for debugging
    fn log_middleware_config(&self) {
        let middleware = &self.config.middleware;
        tracing::info!("Middleware configuration:");
        tracing::info!("  - Panic recovery: {}", enabled(middleware.catch_panic));
        tracing::info!(
            "  - Request ID tracking: {} (header: {})",
            enabled(middleware.request_tracking.request_id_enabled),
            middleware.request_tracking.request_id_header
        );
        tracing::info!(
            "  - Sensitive header masking: {}",
            enabled(middleware.request_tracking.mask_sensitive_headers)
        );
        tracing::info!("  - Request body limit: {} MB", middleware.body_limit_mb);
        tracing::info!("  - Compression: {}", enabled(middleware.compression));
        tracing::info!("  - CORS mode: {}", middleware.cors_mode);
        tracing::info!(
            "  - Request timeout: {} seconds",
            self.config.service.timeout_secs
        );
    }

    /// Build CORS layer based on configuration
    fn build_cors_layer(&self) -> Option<CorsLayer> {
        match self.config.middleware.cors_mode.as_str() {
            "permissive" => {
                tracing::debug!("Enabling permissive CORS");
                Some(CorsLayer::permissive())
            }
            "restrictive" => {
                tracing::debug!("Enabling restrictive CORS (default deny)");
                Some(CorsLayer::new())
            }
            "disabled" => {
                tracing::debug!("CORS disabled");
                None
            }
            _ => {
                tracing::warn!(
                    "Unknown CORS mode: {}, defaulting to permissive",
                    self.config.middleware.cors_mode
                );
                Some(CorsLayer::permissive())
            }
        }
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        },
    }

    tracing::info!("Shutdown signal received, draining requests...");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, routing::post};
    use tower::ServiceExt;

    fn echo() -> Router {
        Router::new().route("/echo", post(|body: String| async move { body }))
    }

    #[test]
    fn test_server_creation() {
        let config = Config::default();
        let server = Server::new(config.clone());
        assert_eq!(server.config().service.port, config.service.port);
    }

    #[tokio::test]
    async fn test_body_limit_applied() {
        let mut config = Config::default();
        config.middleware.body_limit_mb = 0;
        let app = Server::new(config).layered(echo()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .header("content-length", "9")
                    .body(Body::from("too large"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_layered_router_sets_request_id() {
        let app = Server::new(Config::default()).layered(echo()).unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/echo")
                    .body(Body::from("hi"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), http::StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_graceful_shutdown() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let server = Server::new(Config::default());

        server
            .serve_with_shutdown(listener, echo(), async {})
            .await
            .unwrap();
    }
}
