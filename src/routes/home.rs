//! Home routes: `/` and `/home/{action}`.

use crate::handlers::home::{error, index};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn home_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/home", get(index))
        .route("/home/index", get(index))
        .route("/home/error", get(error))
        .with_state(state)
}
