//! Product data context and form validation.

mod crud;
mod validation;
pub use crud::{PgProductStore, ProductStore};
pub use validation::{ProductForm, ProductValidator, ValidationErrors, NAME_FIELD, PRICE_FIELD};
