//! Product catalog: server-rendered list/create/edit/delete pages over a PostgreSQL table.

pub mod antiforgery;
pub mod app;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod model;
pub mod response;
pub mod routes;
pub mod service;
pub mod state;
pub mod store;
pub mod views;

#[cfg(test)]
mod test_utils;

pub use antiforgery::{Antiforgery, AntiforgeryKey};
pub use app::{build_router, run};
pub use config::{load as load_settings, HostEnvironment, Settings};
pub use error::{AppError, ConfigError};
pub use model::{Product, ProductInput};
pub use service::{PgProductStore, ProductStore};
pub use state::AppState;
pub use store::{connect_lazy, ensure_database_exists, ensure_products_table};
