//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "SQL connection string not configured. Set SQL_CONNECTION_STRING environment variable \
         or configure ConnectionStrings:DefaultConnection."
    )]
    MissingConnectionString,
    #[error("reading settings file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing settings file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("anti-forgery validation failed: {0}")]
    Antiforgery(&'static str),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("rendering view: {0}")]
    Render(#[from] askama::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Attached to 500 responses so the error-page middleware can render them.
#[derive(Clone, Debug)]
pub struct ErrorReport {
    pub message: String,
    pub causes: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut causes = Vec::new();
        let mut source = err.source();
        while let Some(cause) = source {
            causes.push(cause.to_string());
            source = cause.source();
        }
        ErrorReport {
            message: err.to_string(),
            causes,
        }
    }

    pub fn into_server_error(self) -> Response {
        let mut response = (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        response.extensions_mut().insert(self);
        response
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::NotFound(what) => {
                tracing::debug!(what = %what, "not found");
                StatusCode::NOT_FOUND.into_response()
            }
            AppError::Antiforgery(reason) => {
                tracing::warn!(reason = %reason, "rejected form submission");
                (StatusCode::BAD_REQUEST, "Bad Request").into_response()
            }
            AppError::Config(_) | AppError::Db(_) | AppError::Render(_) | AppError::Io(_) => {
                tracing::error!(error = %self, "request failed");
                ErrorReport::from_error(&self).into_server_error()
            }
        }
    }
}
