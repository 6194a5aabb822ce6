//! Product pages: list, create, edit, delete.

use crate::antiforgery::Antiforgery;
use crate::error::AppError;
use crate::response::{redirect_to_index, render};
use crate::service::{ProductForm, ProductValidator};
use crate::state::AppState;
use crate::views::{ProductCreateView, ProductDeleteView, ProductEditView, ProductFormView, ProductIndexView};
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

/// Body of the delete confirmation form.
#[derive(Debug, Default, Deserialize)]
pub struct DeleteForm {
    #[serde(rename = "__RequestVerificationToken", default)]
    pub verification_token: Option<String>,
}

/// Route ids that do not parse as integers cannot name a stored row.
fn parse_id(raw: &str) -> Option<i32> {
    raw.trim().parse().ok()
}

fn require_id(raw: &str) -> Result<i32, AppError> {
    parse_id(raw).ok_or_else(|| AppError::NotFound(format!("product {}", raw)))
}

pub async fn index(State(state): State<AppState>) -> Result<Response, AppError> {
    let products = state.store.list().await?;
    Ok(render(&ProductIndexView { products })?.into_response())
}

pub async fn create_form(csrf: Antiforgery) -> Result<Response, AppError> {
    let view = ProductCreateView {
        form: ProductFormView::empty(csrf.request_token()),
    };
    let page = render(&view)?;
    Ok((csrf, page).into_response())
}

pub async fn create(
    State(state): State<AppState>,
    csrf: Antiforgery,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    csrf.validate(form.verification_token.as_deref())?;
    match ProductValidator::validate(&form) {
        Ok(input) => {
            let product = state.store.create(&input).await?;
            tracing::info!(product_id = product.id, "product created");
            Ok(redirect_to_index())
        }
        Err(errors) => {
            let view = ProductCreateView {
                form: ProductFormView::redisplay(&form, errors, csrf.request_token()),
            };
            let page = render(&view)?;
            Ok((csrf, page).into_response())
        }
    }
}

pub async fn edit_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    csrf: Antiforgery,
) -> Result<Response, AppError> {
    let id = require_id(&raw_id)?;
    let product = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
    let view = ProductEditView {
        form: ProductFormView::from_product(&product, csrf.request_token()),
    };
    let page = render(&view)?;
    Ok((csrf, page).into_response())
}

pub async fn edit(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    csrf: Antiforgery,
    Form(form): Form<ProductForm>,
) -> Result<Response, AppError> {
    csrf.validate(form.verification_token.as_deref())?;
    let id = require_id(&raw_id)?;
    if id != form.bound_id() {
        return Err(AppError::NotFound(format!(
            "product {} (form posted id {})",
            id,
            form.bound_id()
        )));
    }
    match ProductValidator::validate(&form) {
        Ok(input) => {
            state
                .store
                .update(id, &input)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
            tracing::info!(product_id = id, "product updated");
            Ok(redirect_to_index())
        }
        Err(errors) => {
            let view = ProductEditView {
                form: ProductFormView::redisplay(&form, errors, csrf.request_token()),
            };
            let page = render(&view)?;
            Ok((csrf, page).into_response())
        }
    }
}

pub async fn delete_form(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    csrf: Antiforgery,
) -> Result<Response, AppError> {
    let id = require_id(&raw_id)?;
    let product = state
        .store
        .find(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", id)))?;
    let token = csrf.request_token();
    let page = render(&ProductDeleteView { product, token })?;
    Ok((csrf, page).into_response())
}

/// Removes the product when it exists; redirects to the list either way.
pub async fn delete_confirmed(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    csrf: Antiforgery,
    Form(form): Form<DeleteForm>,
) -> Result<Response, AppError> {
    csrf.validate(form.verification_token.as_deref())?;
    if let Some(id) = parse_id(&raw_id) {
        if state.store.delete(id).await? {
            tracing::info!(product_id = id, "product deleted");
        } else {
            tracing::debug!(product_id = id, "delete of missing product ignored");
        }
    }
    Ok(redirect_to_index())
}
