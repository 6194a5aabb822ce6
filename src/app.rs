//! Pipeline assembly and server startup.

use crate::antiforgery::AntiforgeryKey;
use crate::config::{Settings, ANTIFORGERY_KEY_VAR};
use crate::error::{AppError, ConfigError};
use crate::middleware::{add_hsts, panic_response, redirect_to_https, render_error_page};
use crate::routes::{canonical_route_case, common_routes_with_ready, home_routes, product_routes};
use crate::service::PgProductStore;
use crate::state::AppState;
use crate::store::{connect_lazy, ensure_database_exists, ensure_products_table};
use axum::{
    middleware::{from_fn_with_state, map_request},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    normalize_path::NormalizePathLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Routes plus the middleware pipeline. Paths are normalized (trailing slash trimmed,
/// controller and action lowercased) before routing; unmatched paths fall through to
/// static files under `static_root`.
pub fn build_router(state: AppState, static_root: &Path) -> Router {
    let routes = Router::new()
        .merge(home_routes(state.clone()))
        .merge(product_routes(state.clone()))
        .merge(common_routes_with_ready(state.clone()))
        .fallback_service(ServeDir::new(static_root));
    let normalized = ServiceBuilder::new()
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(map_request(canonical_route_case))
        .service(routes);

    Router::new()
        .fallback_service(normalized)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn_with_state(state.clone(), render_error_page))
        .layer(from_fn_with_state(state.clone(), redirect_to_https))
        .layer(from_fn_with_state(state, add_hsts))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Bootstrap the store, bind, and serve until Ctrl-C or SIGTERM.
pub async fn run(settings: Settings) -> Result<(), AppError> {
    tracing::info!(environment = %settings.environment.name(), "starting product catalog");
    if settings.https_port.is_none() {
        tracing::warn!("failed to determine the https port for redirect; HTTPS redirection is disabled");
    }

    if settings.ensure_schema {
        ensure_database_exists(&settings.connection_string).await?;
    }
    let pool = connect_lazy(&settings)?;
    if settings.ensure_schema {
        ensure_products_table(&pool).await?;
        tracing::info!("products table ready");
    }

    let antiforgery = match &settings.antiforgery_key {
        Some(bytes) => AntiforgeryKey::from_bytes(bytes),
        None => {
            tracing::info!("no anti-forgery key configured; using a per-process key");
            AntiforgeryKey::generate()
        }
    }
    .map_err(|e| ConfigError::Invalid {
        key: ANTIFORGERY_KEY_VAR,
        message: e.to_string(),
    })?;
    let state = AppState {
        store: Arc::new(PgProductStore::new(pool.clone())),
        antiforgery,
        environment: settings.environment.clone(),
        https_port: settings.https_port,
    };
    let app = build_router(state, &settings.static_root);

    let listener = TcpListener::bind(settings.bind_address).await?;
    tracing::info!("listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("closing database connections");
    pool.close().await;
    Ok(())
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
