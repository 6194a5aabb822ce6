//! Shared helpers for handler and middleware tests: an in-memory store and a test server.

use crate::antiforgery::{AntiforgeryKey, COOKIE_NAME, FORM_FIELD};
use crate::app::build_router;
use crate::config::HostEnvironment;
use crate::error::AppError;
use crate::model::{Product, ProductInput};
use crate::service::ProductStore;
use crate::state::AppState;
use async_trait::async_trait;
use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderValue,
};
use axum_test::{TestResponse, TestServer};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

/// Products kept in a map keyed by id; ids are assigned in insertion order.
#[derive(Default)]
pub struct MemoryProductStore {
    rows: Mutex<(i32, BTreeMap<i32, Product>)>,
}

impl MemoryProductStore {
    pub fn insert(&self, name: &str, price: Decimal) -> Product {
        let input = ProductInput {
            name: name.to_string(),
            price,
        };
        self.add(&input)
    }

    pub fn get(&self, id: i32) -> Option<Product> {
        self.rows.lock().unwrap().1.get(&id).cloned()
    }

    pub fn all(&self) -> Vec<Product> {
        self.rows.lock().unwrap().1.values().cloned().collect()
    }

    fn add(&self, input: &ProductInput) -> Product {
        let mut guard = self.rows.lock().unwrap();
        guard.0 += 1;
        let product = Product {
            id: guard.0,
            name: input.name.clone(),
            price: input.stored_price(),
        };
        guard.1.insert(product.id, product.clone());
        product
    }
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Ok(self.all())
    }

    async fn find(&self, id: i32) -> Result<Option<Product>, AppError> {
        Ok(self.get(id))
    }

    async fn create(&self, input: &ProductInput) -> Result<Product, AppError> {
        Ok(self.add(input))
    }

    async fn update(&self, id: i32, input: &ProductInput) -> Result<Option<Product>, AppError> {
        let mut guard = self.rows.lock().unwrap();
        Ok(guard.1.get_mut(&id).map(|row| {
            row.name = input.name.clone();
            row.price = input.stored_price();
            row.clone()
        }))
    }

    async fn delete(&self, id: i32) -> Result<bool, AppError> {
        Ok(self.rows.lock().unwrap().1.remove(&id).is_some())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Every call fails as if the database were unreachable.
pub struct FailingProductStore;

#[async_trait]
impl ProductStore for FailingProductStore {
    async fn list(&self) -> Result<Vec<Product>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn find(&self, _id: i32) -> Result<Option<Product>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn create(&self, _input: &ProductInput) -> Result<Product, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn update(&self, _id: i32, _input: &ProductInput) -> Result<Option<Product>, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn delete(&self, _id: i32) -> Result<bool, AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(AppError::Db(sqlx::Error::PoolTimedOut))
    }
}

pub fn test_state(store: Arc<dyn ProductStore>, environment: HostEnvironment, https_port: Option<u16>) -> AppState {
    AppState {
        store,
        antiforgery: AntiforgeryKey::from_bytes(&[7u8; 32]).unwrap(),
        environment,
        https_port,
    }
}

pub fn server_for(state: AppState, static_root: &Path) -> TestServer {
    TestServer::new(build_router(state, static_root)).unwrap()
}

/// Production host over an empty in-memory store.
pub fn create_test_app() -> (TestServer, Arc<MemoryProductStore>) {
    let store = Arc::new(MemoryProductStore::default());
    let state = test_state(store.clone(), HostEnvironment::production(), None);
    (server_for(state, Path::new("wwwroot")), store)
}

pub fn create_test_app_with_store<S: ProductStore + 'static>(store: S) -> TestServer {
    let state = test_state(Arc::new(store), HostEnvironment::production(), None);
    server_for(state, Path::new("wwwroot"))
}

/// Cookie nonce and matching form token, as a browser would hold them after loading a form.
#[derive(Clone, Debug)]
pub struct CsrfPair {
    pub cookie: String,
    pub token: String,
}

/// Value of the anti-forgery cookie set by `response`, if any.
pub fn antiforgery_cookie(response: &TestResponse) -> Option<String> {
    let prefix = format!("{}=", COOKIE_NAME);
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find_map(|v| v.strip_prefix(prefix.as_str()))
        .and_then(|rest| rest.split(';').next())
        .map(|nonce| nonce.to_string())
}

/// Load a form page and pull out the cookie and the hidden token.
pub async fn fetch_antiforgery(server: &TestServer, path: &str) -> CsrfPair {
    let response = server.get(path).await;
    response.assert_status_ok();
    let cookie = antiforgery_cookie(&response).expect("form page sets the anti-forgery cookie");
    let html = response.text();
    let marker = format!(r#"name="{}" value=""#, FORM_FIELD);
    let start = html.find(&marker).expect("form carries a verification token") + marker.len();
    let end = start + html[start..].find('"').expect("token attribute is closed");
    CsrfPair {
        cookie,
        token: html[start..end].to_string(),
    }
}

/// POST urlencoded `fields` plus the verification token, with the anti-forgery cookie attached.
pub async fn post_form(server: &TestServer, path: &str, csrf: &CsrfPair, fields: &[(&str, &str)]) -> TestResponse {
    let mut body: Vec<(&str, &str)> = fields.to_vec();
    body.push((FORM_FIELD, csrf.token.as_str()));
    let cookie = HeaderValue::from_str(&format!("{}={}", COOKIE_NAME, csrf.cookie)).unwrap();
    server.post(path).add_header(COOKIE, cookie).form(&body).await
}
