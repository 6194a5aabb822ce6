//! Shared application state for all routes.

use crate::antiforgery::AntiforgeryKey;
use crate::config::HostEnvironment;
use crate::service::ProductStore;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProductStore>,
    pub antiforgery: AntiforgeryKey,
    pub environment: HostEnvironment,
    /// Redirect plain-HTTP requests to this port when set.
    pub https_port: Option<u16>,
}

impl FromRef<AppState> for AntiforgeryKey {
    fn from_ref(state: &AppState) -> Self {
        state.antiforgery.clone()
    }
}
