//! API request and response data models.
//!
//! Request models deserialize exactly what clients send. Their `TryFrom` conversions into
//! [`crate::db::models`] requests are the validation stage: strings are trimmed, numeric text is
//! parsed, and blank names or negative quantities are rejected with a 400. Response models
//! convert from the database responses.

use crate::errors::Error;

pub mod categories;
pub mod products;
pub mod subcategories;

/// Trim a name and reject it if nothing is left.
pub(crate) fn required_name(name: &str) -> Result<String, Error> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::BadRequest {
            message: "name must not be empty".to_string(),
        });
    }
    Ok(name.to_string())
}
