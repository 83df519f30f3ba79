//! Request validation for incoming sensor readings.
//!
//! A reading is accepted only when the body is a JSON object carrying all
//! three metric keys with numeric values. Nothing downstream runs on a
//! rejected reading.

use serde_json::Value;

use crate::error::ValidationError;
use crate::model::{Metric, Reading};

/// Parses a raw request body and validates it.
pub fn parse_body(body: &[u8]) -> Result<Reading, ValidationError> {
    let json: Value = serde_json::from_slice(body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
    validate_reading(&json)
}

/// Validates an already-parsed JSON value.
///
/// Presence is checked for every field before types, so a body missing two
/// fields reports both. Extra keys are ignored.
pub fn validate_reading(json: &Value) -> Result<Reading, ValidationError> {
    let object = json.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<&'static str> = Metric::ALL
        .iter()
        .map(|m| m.field_name())
        .filter(|name| !object.contains_key(*name))
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let number = |metric: Metric| -> Result<f64, ValidationError> {
        let field = metric.field_name();
        object
            .get(field)
            .and_then(Value::as_f64)
            .ok_or(ValidationError::NotNumeric { field })
    };

    Ok(Reading::new(
        number(Metric::Ph)?,
        number(Metric::Temperature)?,
        number(Metric::Turbidity)?,
    ))
}
