//! HTTP server setup for the push listener.
//!
//! Routes:
//! - `GET /` liveness message
//! - `POST /receive_push` payload intake
//! - anything else: 404 with a `detail` body
//!
//! # Graceful Shutdown
//!
//! On CTRL+C or SIGTERM the server stops accepting connections and lets
//! in-flight requests finish before [`serve`] returns.

use std::future::{pending, Future};
use std::io;
use std::net::SocketAddr;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::constants::{
    BANNER_RULE, MAX_BODY_BYTES, RECEIVE_PUSH_PATH, ROOT_PATH, SERVICE_NAME,
};
use crate::error::{ListenerError, Result};
use crate::handlers::{self, AppState};
use crate::logger::Console;

/// Creates the router with both endpoints, the not-found fallback and
/// request tracing.
///
/// Peer addresses are read through `ConnectInfo`, so the router must be
/// served with `into_make_service_with_connect_info::<SocketAddr>()` (as
/// [`serve_with_shutdown`] does) or wrapped in `MockConnectInfo` in tests.
pub fn create_router(console: Console) -> Router {
    Router::new()
        .route(ROOT_PATH, get(handlers::root))
        .route(RECEIVE_PUSH_PATH, post(handlers::receive_push))
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { console })
}

/// Binds the listening socket described by `config`.
///
/// # Errors
///
/// Returns `ListenerError::Bind` if the host does not resolve, the port is
/// already in use, or the address is otherwise unavailable.
pub async fn bind(config: &Config) -> Result<TcpListener> {
    let addr = config.bind_address();

    TcpListener::bind((config.host.as_str(), config.port))
        .await
        .map_err(|source| ListenerError::Bind { addr, source })
}

/// Prints the startup banner: rules on the console, the rest as log lines.
pub fn announce(config: &Config, console: &Console) {
    let rule = || {
        if let Err(e) = console.line(BANNER_RULE) {
            warn!(error = %e, "Failed to write banner to console");
        }
    };

    rule();
    info!("🚀 Starting {SERVICE_NAME}...");
    info!("👂 Listening on: http://{}:{}", config.host, config.port);
    info!(
        "👉 Send POST requests to: http://<listener_ip>:{}{RECEIVE_PUSH_PATH}",
        config.port
    );
    info!("   (Use localhost or 127.0.0.1 if running agent on the same machine)");
    info!("   (Use machine's local IP if agent is on another machine/container)");
    rule();
}

/// Binds, announces and serves until a shutdown signal arrives.
///
/// # Errors
///
/// Returns the bind error if the socket cannot be opened, or a serve error
/// if the accept loop fails.
pub async fn run(config: &Config, console: Console) -> Result<()> {
    let listener = bind(config).await?;
    announce(config, &console);

    serve(listener, create_router(console)).await
}

/// Serves `router` on `listener` until CTRL+C or SIGTERM.
///
/// # Errors
///
/// Returns `ListenerError::Serve` if the accept loop fails.
pub async fn serve(listener: TcpListener, router: Router) -> Result<()> {
    serve_with_shutdown(listener, router, shutdown_signal()).await
}

/// Serves `router` on `listener` until `signal` resolves, then drains
/// in-flight requests.
///
/// # Errors
///
/// Returns `ListenerError::Serve` if the accept loop fails.
pub async fn serve_with_shutdown<F>(listener: TcpListener, router: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let local_addr = listener.local_addr().map_err(ListenerError::Serve)?;
    info!("HTTP server listening on {}", local_addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(signal)
    .await
    .map_err(ListenerError::Serve)?;

    info!("HTTP server stopped gracefully");
    Ok(())
}

/// Resolves on the first CTRL+C or SIGTERM.
async fn shutdown_signal() {
    let interrupt = wait_for("CTRL+C", tokio::signal::ctrl_c());

    #[cfg(unix)]
    let terminate = wait_for("SIGTERM", async {
        use tokio::signal::unix::{signal, SignalKind};

        signal(SignalKind::terminate())?.recv().await;
        Ok::<(), io::Error>(())
    });

    #[cfg(not(unix))]
    let terminate = pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}

/// Waits for one signal. A listener that cannot be installed never
/// resolves, so it cannot trigger shutdown on its own.
async fn wait_for<F>(name: &str, signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => info!("Received {name}, starting graceful shutdown"),
        Err(e) => {
            error!(error = %e, "Failed to listen for {name}");
            pending::<()>().await;
        }
    }
}
