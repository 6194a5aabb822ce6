//! Request pipeline middleware: HTTPS redirection, HSTS, and the exception handler pages.

use crate::error::ErrorReport;
use crate::response::render;
use crate::state::AppState;
use crate::views::{DeveloperErrorView, ErrorView};
use axum::{
    extract::{Request, State},
    http::{
        header::{HOST, LOCATION, STRICT_TRANSPORT_SECURITY},
        HeaderValue, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::any::Any;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

/// 30 days.
const HSTS_VALUE: &str = "max-age=2592000";

/// 307 plain-HTTP requests to the configured HTTPS port. A no-op when no port is set.
pub async fn redirect_to_https(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let Some(port) = state.https_port else {
        return next.run(request).await;
    };
    if is_https(&request) {
        return next.run(request).await;
    }
    let Some(host) = request_host(&request) else {
        return next.run(request).await;
    };
    let path_and_query = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let location = https_location(&host, port, path_and_query);
    tracing::debug!(location = %location, "redirecting to https");
    (StatusCode::TEMPORARY_REDIRECT, [(LOCATION, location)]).into_response()
}

/// `Strict-Transport-Security` on HTTPS responses outside Development, except to loopback hosts.
pub async fn add_hsts(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let eligible = !state.environment.is_development()
        && is_https(&request)
        && request_host(&request)
            .map(|host| !is_loopback(host_without_port(&host)))
            .unwrap_or(false);
    let mut response = next.run(request).await;
    if eligible && !response.headers().contains_key(STRICT_TRANSPORT_SECURITY) {
        response
            .headers_mut()
            .insert(STRICT_TRANSPORT_SECURITY, HeaderValue::from_static(HSTS_VALUE));
    }
    response
}

/// Secure by scheme or by the proxy's `X-Forwarded-Proto`.
fn is_https(request: &Request) -> bool {
    let forwarded_https = request
        .headers()
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .map(|proto| proto.trim().eq_ignore_ascii_case("https"))
        .unwrap_or(false);
    forwarded_https || request.uri().scheme_str() == Some("https")
}

fn request_host(request: &Request) -> Option<String> {
    request
        .headers()
        .get(HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| request.uri().authority().map(|a| a.to_string()))
}

fn is_loopback(host: &str) -> bool {
    host.eq_ignore_ascii_case("localhost") || host == "127.0.0.1" || host == "[::1]"
}

fn https_location(host: &str, port: u16, path_and_query: &str) -> String {
    let host = host_without_port(host);
    if port == 443 {
        format!("https://{}{}", host, path_and_query)
    } else {
        format!("https://{}:{}{}", host, port, path_and_query)
    }
}

/// `example.com:80` -> `example.com`, `[::1]:80` -> `[::1]`.
fn host_without_port(host: &str) -> &str {
    if host.starts_with('[') {
        return match host.find(']') {
            Some(end) => &host[..=end],
            None => host,
        };
    }
    match host.rsplit_once(':') {
        Some((name, port)) if port.chars().all(|c| c.is_ascii_digit()) => name,
        _ => host,
    }
}

/// Replace 500 responses marked with an [`ErrorReport`] by an error page: the detailed
/// developer page in Development, the generic page otherwise.
pub async fn render_error_page(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let response = next.run(request).await;

    let Some(report) = response.extensions().get::<ErrorReport>().cloned() else {
        return response;
    };
    let request_id = uuid::Uuid::new_v4().to_string();
    tracing::error!(
        request_id = %request_id,
        method = %method,
        path = %path,
        error = %report.message,
        "unhandled error"
    );

    let page = if state.environment.is_development() {
        render(&DeveloperErrorView {
            request_id,
            method,
            path,
            message: report.message,
            causes: report.causes,
        })
    } else {
        render(&ErrorView { request_id })
    };
    match page {
        Ok(html) => (StatusCode::INTERNAL_SERVER_ERROR, html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "error page failed to render");
            response
        }
    }
}

/// Handler for `CatchPanicLayer`: a marked 500 that `render_error_page` picks up.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "handler panicked".to_string()
    };
    tracing::error!(panic = %message, "handler panicked");
    ErrorReport {
        message,
        causes: Vec::new(),
    }
    .into_server_error()
}
