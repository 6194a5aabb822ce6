//! Product routes: `/products/{action}/{id?}`.

use crate::handlers::products::{
    create, create_form, delete_confirmed, delete_form, edit, edit_form, index,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn product_routes(state: AppState) -> Router {
    Router::new()
        .route("/products", get(index))
        .route("/products/index", get(index))
        .route("/products/create", get(create_form).post(create))
        .route("/products/edit/:id", get(edit_form).post(edit))
        .route("/products/delete/:id", get(delete_form).post(delete_confirmed))
        .with_state(state)
}
