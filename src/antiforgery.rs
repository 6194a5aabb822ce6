//! Anti-forgery tokens for form posts.
//!
//! A random nonce lives in an HttpOnly cookie; each rendered form carries
//! `HMAC-SHA256(key, nonce)` in a hidden field. A post is accepted only when the
//! field matches the cookie it arrived with.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{
        header::{COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    response::{IntoResponseParts, ResponseParts},
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD as BASE64_URL, Engine};
use hmac::{digest::InvalidLength, Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::convert::Infallible;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

pub const COOKIE_NAME: &str = ".Catalog.Antiforgery";
pub const FORM_FIELD: &str = "__RequestVerificationToken";

const NONCE_LEN: usize = 32;

/// Server-side HMAC, keyed once at startup. Cheap to clone.
#[derive(Clone)]
pub struct AntiforgeryKey(Arc<HmacSha256>);

impl AntiforgeryKey {
    /// Random per-process key.
    pub fn generate() -> Result<Self, InvalidLength> {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, InvalidLength> {
        Ok(AntiforgeryKey(Arc::new(HmacSha256::new_from_slice(bytes)?)))
    }

    fn mac(&self, nonce: &str) -> HmacSha256 {
        let mut mac = HmacSha256::clone(&self.0);
        mac.update(nonce.as_bytes());
        mac
    }

    /// Token to embed in forms rendered for the cookie holding `nonce`.
    pub fn form_token(&self, nonce: &str) -> String {
        BASE64_URL.encode(self.mac(nonce).finalize().into_bytes())
    }

    /// Constant-time check of a submitted form token against the cookie nonce.
    pub fn verify(&self, nonce: &str, token: &str) -> bool {
        match BASE64_URL.decode(token.trim()) {
            Ok(bytes) => self.mac(nonce).verify_slice(&bytes).is_ok(),
            Err(_) => false,
        }
    }
}

impl std::fmt::Debug for AntiforgeryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AntiforgeryKey(..)")
    }
}

/// Per-request anti-forgery context.
///
/// Extract it in handlers that render or accept forms. Returning it as part of the
/// response sets the cookie when the request arrived without one.
pub struct Antiforgery {
    key: AntiforgeryKey,
    nonce: String,
    issued: bool,
}

impl Antiforgery {
    pub fn new(key: AntiforgeryKey, cookie_nonce: Option<String>) -> Self {
        match cookie_nonce.filter(|n| is_valid_nonce(n)) {
            Some(nonce) => Antiforgery {
                key,
                nonce,
                issued: false,
            },
            None => Antiforgery {
                key,
                nonce: generate_nonce(),
                issued: true,
            },
        }
    }

    /// Hidden-field value for forms rendered in this response.
    pub fn request_token(&self) -> String {
        self.key.form_token(&self.nonce)
    }

    /// Check a submitted token. Fails when the request carried no cookie, when the field
    /// is missing, or when the token was not issued for this cookie.
    pub fn validate(&self, submitted: Option<&str>) -> Result<(), AppError> {
        if self.issued {
            return Err(AppError::Antiforgery("cookie missing"));
        }
        let token = submitted
            .filter(|t| !t.trim().is_empty())
            .ok_or(AppError::Antiforgery("form token missing"))?;
        if !self.key.verify(&self.nonce, token) {
            return Err(AppError::Antiforgery("token mismatch"));
        }
        Ok(())
    }

    fn set_cookie_header(&self) -> String {
        format!(
            "{}={}; Path=/; HttpOnly; SameSite=Strict",
            COOKIE_NAME, self.nonce
        )
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Antiforgery
where
    S: Send + Sync,
    AntiforgeryKey: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let key = AntiforgeryKey::from_ref(state);
        Ok(Antiforgery::new(key, cookie_value(&parts.headers, COOKIE_NAME)))
    }
}

impl IntoResponseParts for Antiforgery {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if self.issued {
            if let Ok(value) = HeaderValue::from_str(&self.set_cookie_header()) {
                res.headers_mut().append(SET_COOKIE, value);
            }
        }
        Ok(res)
    }
}

fn generate_nonce() -> String {
    let mut bytes = [0u8; NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut bytes);
    BASE64_URL.encode(bytes)
}

fn is_valid_nonce(nonce: &str) -> bool {
    BASE64_URL
        .decode(nonce)
        .map(|bytes| bytes.len() == NONCE_LEN)
        .unwrap_or(false)
}

/// First value of cookie `name` across all `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|s| s.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
}
