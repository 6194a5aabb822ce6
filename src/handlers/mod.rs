//! HTTP handlers: product pages and home redirects.

pub mod home;
pub mod products;
