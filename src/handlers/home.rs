//! Home pages: root redirect and the generic error page.

use crate::error::AppError;
use crate::response::{redirect_to_index, render};
use crate::views::ErrorView;
use axum::response::{Html, Response};

pub async fn index() -> Response {
    redirect_to_index()
}

pub async fn error() -> Result<Html<String>, AppError> {
    render(&ErrorView {
        request_id: uuid::Uuid::new_v4().to_string(),
    })
}
