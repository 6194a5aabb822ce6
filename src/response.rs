//! Page and redirect helpers.

use crate::error::AppError;
use askama::Template;
use axum::{
    http::{header::LOCATION, StatusCode},
    response::{Html, IntoResponse, Response},
};

/// Location of the product list; every successful form post lands here.
pub const PRODUCTS_INDEX: &str = "/Products";

pub fn render<T: Template>(view: &T) -> Result<Html<String>, AppError> {
    Ok(Html(view.render()?))
}

/// 302 Found to `location`.
pub fn redirect_to(location: &'static str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

pub fn redirect_to_index() -> Response {
    redirect_to(PRODUCTS_INDEX)
}
