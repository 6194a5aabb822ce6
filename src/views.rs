//! Server-rendered pages (askama templates under `templates/`).

use crate::model::Product;
use crate::service::{ProductForm, ValidationErrors};
use askama::Template;

/// Values and messages shown in the create/edit form.
pub struct ProductFormView {
    pub id: i32,
    pub name: String,
    pub price: String,
    pub token: String,
    pub name_errors: Vec<String>,
    pub price_errors: Vec<String>,
}

impl ProductFormView {
    pub fn empty(token: String) -> Self {
        ProductFormView {
            id: 0,
            name: String::new(),
            price: String::new(),
            token,
            name_errors: Vec::new(),
            price_errors: Vec::new(),
        }
    }

    pub fn from_product(product: &Product, token: String) -> Self {
        ProductFormView {
            id: product.id,
            name: product.name.clone(),
            price: product.price.to_string(),
            token,
            name_errors: Vec::new(),
            price_errors: Vec::new(),
        }
    }

    /// Redisplay a rejected submission with what the user typed.
    pub fn redisplay(form: &ProductForm, errors: ValidationErrors, token: String) -> Self {
        ProductFormView {
            id: form.bound_id(),
            name: form.name.clone().unwrap_or_default(),
            price: form.price.clone().unwrap_or_default(),
            token,
            name_errors: errors.name,
            price_errors: errors.price,
        }
    }
}

#[derive(Template)]
#[template(path = "products/index.html")]
pub struct ProductIndexView {
    pub products: Vec<Product>,
}

#[derive(Template)]
#[template(path = "products/create.html")]
pub struct ProductCreateView {
    pub form: ProductFormView,
}

#[derive(Template)]
#[template(path = "products/edit.html")]
pub struct ProductEditView {
    pub form: ProductFormView,
}

#[derive(Template)]
#[template(path = "products/delete.html")]
pub struct ProductDeleteView {
    pub product: Product,
    pub token: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorView {
    pub request_id: String,
}

#[derive(Template)]
#[template(path = "developer_error.html")]
pub struct DeveloperErrorView {
    pub request_id: String,
    pub method: String,
    pub path: String,
    pub message: String,
    pub causes: Vec<String>,
}
