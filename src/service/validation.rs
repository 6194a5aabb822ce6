//! Product form binding and field validation.

use crate::model::{max_price, min_price, ProductInput};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;

pub const NAME_FIELD: &str = "Name";
pub const PRICE_FIELD: &str = "Price";

/// Raw product form submission. Every field is optional so a malformed post still binds
/// and is reported through validation rather than rejected by the extractor.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProductForm {
    #[serde(rename = "Id", default)]
    pub id: Option<String>,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Price", default)]
    pub price: Option<String>,
    #[serde(rename = "__RequestVerificationToken", default)]
    pub verification_token: Option<String>,
}

impl ProductForm {
    /// Submitted id; absent or unparsable ids bind as 0, which no stored row has.
    pub fn bound_id(&self) -> i32 {
        self.id
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Field-level messages, in field order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    pub name: Vec<String>,
    pub price: Vec<String>,
}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.price.is_empty()
    }
}

pub struct ProductValidator;

impl ProductValidator {
    /// Bind and validate a submission: name required, price in [0.01, 10000].
    pub fn validate(form: &ProductForm) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = form.name.as_deref().unwrap_or_default();
        if name.trim().is_empty() {
            errors.name.push(format!("The {} field is required.", NAME_FIELD));
        }

        let price = match form.price.as_deref().map(str::trim) {
            None | Some("") => {
                errors.price.push(format!("The {} field is required.", PRICE_FIELD));
                None
            }
            Some(raw) => match Decimal::from_str(raw) {
                Ok(p) if p < min_price() || p > max_price() => {
                    errors.price.push(format!(
                        "The field {} must be between {} and {}.",
                        PRICE_FIELD,
                        min_price(),
                        max_price()
                    ));
                    None
                }
                Ok(p) => Some(p),
                Err(_) => {
                    errors
                        .price
                        .push(format!("The value '{}' is not valid for {}.", raw, PRICE_FIELD));
                    None
                }
            },
        };

        match price {
            Some(price) if errors.is_empty() => Ok(ProductInput {
                name: name.to_string(),
                price,
            }),
            _ => Err(errors),
        }
    }
}
