//! Route tables: products, home, and operational endpoints.
//!
//! Controller routes are registered in lowercase; [`canonical_route_case`] rewrites the
//! controller and action segments of incoming paths so `/Products/Edit/3` and
//! `/PRODUCTS/edit/3` reach the same handler.

pub mod common;
pub mod home;
pub mod products;

pub use common::common_routes_with_ready;
pub use home::home_routes;
pub use products::product_routes;

use axum::{
    extract::Request,
    http::{uri::PathAndQuery, Uri},
};

const CONTROLLERS: [&str; 2] = ["products", "home"];

/// Lowercase the controller and action segments when the first segment names a controller.
/// Other paths (static files, `/health`) are left as they are.
pub fn canonical_path(path: &str) -> Option<String> {
    let mut segments: Vec<String> = path.split('/').map(str::to_string).collect();
    // segments[0] is the empty string before the leading slash
    let controller = segments.get(1)?.to_ascii_lowercase();
    if !CONTROLLERS.contains(&controller.as_str()) {
        return None;
    }
    segments[1] = controller;
    if let Some(action) = segments.get_mut(2) {
        *action = action.to_ascii_lowercase();
    }
    let canonical = segments.join("/");
    (canonical != path).then_some(canonical)
}

/// `map_request` hook applied before routing.
pub async fn canonical_route_case(mut request: Request) -> Request {
    let Some(path) = canonical_path(request.uri().path()) else {
        return request;
    };
    let path_and_query = match request.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path,
    };
    let mut parts = request.uri().clone().into_parts();
    parts.path_and_query = match PathAndQuery::try_from(path_and_query) {
        Ok(pq) => Some(pq),
        Err(_) => return request,
    };
    if let Ok(uri) = Uri::from_parts(parts) {
        *request.uri_mut() = uri;
    }
    request
}
