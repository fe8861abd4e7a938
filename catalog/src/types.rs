//! Common type definitions shared by the API and database layers.
//!
//! - Type aliases for entity IDs ([`CategoryId`], [`SubcategoryId`], [`ProductId`])
//! - [`Lookup`]: a path segment interpreted as either an id or a name
//! - [`FormValue`]: a request field that arrives as text or as a JSON number and is parsed later

use crate::errors::Error;
use serde::{Deserialize, Deserializer};
use std::{fmt, str::FromStr};

// Type aliases for IDs
pub type CategoryId = i64;
pub type SubcategoryId = i64;
pub type ProductId = i64;

/// How a single-entity route addresses its target.
///
/// A segment that parses as a 64-bit integer is an id; anything else is a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(i64),
    Name(String),
}

impl Lookup {
    pub fn parse(segment: &str) -> Self {
        let segment = segment.trim();
        match segment.parse::<i64>() {
            Ok(id) => Lookup::Id(id),
            Err(_) => Lookup::Name(segment.to_string()),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookup::Id(id) => write!(f, "{id}"),
            Lookup::Name(name) => write!(f, "'{name}'"),
        }
    }
}

/// Parse a path segment on a route that only accepts numeric ids.
pub fn parse_id(segment: &str, resource: &str) -> Result<i64, Error> {
    segment.trim().parse::<i64>().map_err(|e| Error::BadRequest {
        message: format!("invalid {resource} id '{segment}': {e}"),
    })
}

/// A raw request value awaiting conversion.
///
/// Older clients send every field as a string (`"price": "9.99"`); newer ones send numbers. Both
/// deserialize into the same textual form, and conversion happens in the validation stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValue(String);

impl FormValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The value with surrounding whitespace removed
    pub fn as_str(&self) -> &str {
        self.0.trim()
    }

    /// Convert to `T`, reporting failures as a 400 naming the field.
    pub fn parse<T>(&self, field: &str) -> Result<T, Error>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        self.as_str().parse::<T>().map_err(|e| Error::BadRequest {
            message: format!("invalid {field} '{}': {e}", self.as_str()),
        })
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for FormValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(text) => FormValue(text),
            Raw::Number(number) => FormValue(number.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_lookup_parse() {
        assert_eq!(Lookup::parse("42"), Lookup::Id(42));
        assert_eq!(Lookup::parse("-3"), Lookup::Id(-3));
        assert_eq!(Lookup::parse("Lighting"), Lookup::Name("Lighting".to_string()));
        // too large for i64, so it is a name
        assert_eq!(
            Lookup::parse("99999999999999999999"),
            Lookup::Name("99999999999999999999".to_string())
        );
    }

    #[test]
    fn test_parse_id_rejects_names() {
        assert_eq!(parse_id("7", "product").unwrap(), 7);
        let err = parse_id("seven", "product").unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
        assert!(err.to_string().contains("invalid product id 'seven'"));
    }

    #[test]
    fn test_form_value_accepts_string_or_number() {
        let from_text: FormValue = serde_json::from_str(r#"" 12.50 ""#).unwrap();
        let from_number: FormValue = serde_json::from_str("12.5").unwrap();
        let from_int: FormValue = serde_json::from_str("3").unwrap();

        assert_eq!(from_text.parse::<Decimal>("price").unwrap(), Decimal::new(1250, 2));
        assert_eq!(from_number.parse::<Decimal>("price").unwrap(), Decimal::new(125, 1));
        assert_eq!(from_int.parse::<i64>("subcategory_id").unwrap(), 3);
        assert!(serde_json::from_str::<FormValue>("true").is_err());
    }

    #[test]
    fn test_form_value_parse_error_names_field() {
        let err = FormValue::new("abc").parse::<i32>("current_inventory").unwrap_err();
        assert!(err.to_string().starts_with("invalid current_inventory 'abc'"));
    }
}
