//! # HTTP Server
//!
//! Binds the TLE router, serves until ctrl-c, then closes the store.

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use super::config::ServerConfig;
use super::routes::{tle_routes, AppState};
use crate::observability::{log_event, log_event_with_fields, Event, Logger};
use crate::store::RecordStore;

pub struct HttpServer {
    config: ServerConfig,
    store: Arc<RecordStore>,
    router: Router,
}

impl HttpServer {
    pub fn with_config(config: ServerConfig, store: Arc<RecordStore>) -> Self {
        let router = Self::build_router(&config, Arc::clone(&store));
        Self {
            config,
            store,
            router,
        }
    }

    fn build_router(config: &ServerConfig, store: Arc<RecordStore>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        tle_routes(AppState::new(store, config.writable)).layer(cors)
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    pub async fn start(self) -> io::Result<()> {
        let addr: SocketAddr = self.config.socket_addr().parse().map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid listen address {}: {}", self.config.socket_addr(), err),
            )
        })?;

        log_event_with_fields(
            Event::ServerStarting,
            &[
                ("addr", &addr.to_string()),
                ("writable", if self.config.writable { "true" } else { "false" }),
            ],
        );

        let listener = TcpListener::bind(addr).await?;
        log_event_with_fields(Event::Serving, &[("addr", &addr.to_string())]);
        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        // the router and its state clones are gone once serve returns
        if let Ok(store) = Arc::try_unwrap(self.store) {
            if let Err(err) = store.close() {
                log_event_with_fields(Event::StoreUnavailable, &[("reason", &err.to_string())]);
            }
        }
        log_event(Event::ShutdownComplete);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        Logger::error("SIGNAL_HANDLER_FAILED", &[("reason", &err.to_string())]);
        std::future::pending::<()>().await;
    }
    log_event(Event::ShutdownStart);
}
