use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::shared::constants::{MSG_BLANK, MSG_REQUIRED};

lazy_static! {
    /// Regex for validating account usernames
    /// Letters, digits and the characters `@ . + - _`
    /// - Valid: "john_doe", "user.name", "ops+1", "a@b"
    /// - Invalid: "user name", "user!", "" (empty)
    pub static ref USERNAME_REGEX: Regex = Regex::new(r"^[\w.@+-]+$").unwrap();
}

/// Offending fields and their messages, rendered as `{field: [messages]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, list) in errors.field_errors() {
            for error in list.iter() {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

/// Take a required value out of an optional DTO field, recording a field error when missing.
pub fn require<T>(errors: &mut FieldErrors, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        errors.add(field, MSG_REQUIRED);
    }
    value
}

/// Rejects strings that are empty after trimming.
pub fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message(Cow::Borrowed(MSG_BLANK)));
    }
    Ok(())
}

fn decimal_error(message: String) -> ValidationError {
    ValidationError::new("decimal").with_message(Cow::Owned(message))
}

fn check_decimal(
    value: &Decimal,
    max_digits: u32,
    decimal_places: u32,
    min: Decimal,
    max: Option<Decimal>,
) -> Result<(), ValidationError> {
    if value.scale() > decimal_places {
        return Err(decimal_error(format!(
            "Ensure that there are no more than {} decimal places.",
            decimal_places
        )));
    }
    let whole_digits = value.trunc().abs().to_string().trim_start_matches('0').len() as u32;
    if whole_digits > max_digits - decimal_places {
        return Err(decimal_error(format!(
            "Ensure that there are no more than {} digits in total.",
            max_digits
        )));
    }
    if *value < min {
        return Err(decimal_error(format!(
            "Ensure this value is greater than or equal to {}.",
            min
        )));
    }
    if let Some(max) = max {
        if *value > max {
            return Err(decimal_error(format!(
                "Ensure this value is less than or equal to {}.",
                max
            )));
        }
    }
    Ok(())
}

/// Decimal places stored for latitude and longitude
pub const COORDINATE_SCALE: u32 = 6;
/// Decimal places stored for distances
pub const DISTANCE_SCALE: u32 = 2;

/// Pad a validated decimal to its column scale, so `12.5` is stored and rendered as `12.50`.
pub fn with_scale(mut value: Decimal, scale: u32) -> Decimal {
    value.rescale(scale);
    value
}

/// Latitude: NUMERIC(10, 6) within [-90, 90]
pub fn validate_latitude(value: &Decimal) -> Result<(), ValidationError> {
    check_decimal(
        value,
        10,
        COORDINATE_SCALE,
        Decimal::from(-90),
        Some(Decimal::from(90)),
    )
}

/// Longitude: NUMERIC(10, 6) within [-180, 180]
pub fn validate_longitude(value: &Decimal) -> Result<(), ValidationError> {
    check_decimal(
        value,
        10,
        COORDINATE_SCALE,
        Decimal::from(-180),
        Some(Decimal::from(180)),
    )
}

/// Distance in kilometers: NUMERIC(10, 2), non-negative
pub fn validate_distance(value: &Decimal) -> Result<(), ValidationError> {
    check_decimal(value, 10, DISTANCE_SCALE, Decimal::ZERO, None)
}
