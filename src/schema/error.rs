//! Error envelope schemas and the fields they name
//!
//! Barrel and measurement validation errors share one envelope. Keys under
//! `errors` are not restricted: besides the entity's own field keys, a
//! `$.<property>` key appears when a value could not be converted to the
//! property's type, and the service may add model-level keys next to it.

use once_cell::sync::Lazy;
use serde_json::{Value, json};
use std::fmt;

use super::compiled::{Schema, builtin};

/// Title of every 400 validation envelope
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// Stable part of a type-conversion message. The rest names the service's
/// internal types and is not asserted.
pub const CONVERSION_MESSAGE_FRAGMENT: &str = "The JSON value could not be converted to";

/// Title of the 404 for a measurement that references an unknown barrel
pub const BARREL_NOT_FOUND_TITLE: &str = "Barrel not found";

fn validation_envelope() -> Value {
    json!({
        "type": "object",
        "required": ["title", "status", "errors"],
        "properties": {
            "title": { "type": "string", "minLength": 1 },
            "status": { "type": "integer" },
            "errors": {
                "type": "object",
                "additionalProperties": {
                    "type": "array",
                    "items": { "type": "string" },
                    "minItems": 1
                }
            }
        }
    })
}

/// 400 envelope for POST /barrels
pub static BARREL_ERROR: Lazy<Schema> =
    Lazy::new(|| builtin("barrel-error", validation_envelope()));

/// 400 envelope for POST /measurements
pub static MEASUREMENT_ERROR: Lazy<Schema> =
    Lazy::new(|| builtin("measurement-error", validation_envelope()));

/// Title-only problem (404 and friends)
pub static PROBLEM: Lazy<Schema> = Lazy::new(|| {
    builtin(
        "problem",
        json!({
            "type": "object",
            "required": ["title"],
            "properties": {
                "title": { "type": "string", "minLength": 1 },
                "status": { "type": "integer" }
            }
        }),
    )
});

/// JSON type a required field carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// A required request field that can be named in a validation envelope
pub trait ErrorField: Copy + fmt::Display + fmt::Debug + Send + Sync + 'static {
    /// Key under `errors`, e.g. `Qr`
    fn key(self) -> &'static str;

    /// JSON property in the request body, e.g. `qr`
    fn property(self) -> &'static str;

    fn kind(self) -> FieldKind;

    /// Fixed message reported when the field is missing, null or empty
    fn required_message(self) -> &'static str;

    /// Key used for type-conversion failures, e.g. `$.qr`
    fn conversion_key(self) -> String {
        format!("$.{}", self.property())
    }

    /// Envelope schema of the entity owning this field
    fn error_schema() -> &'static Schema;

    fn all() -> &'static [Self];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarrelField {
    Qr,
    Rfid,
    Nfc,
}

impl ErrorField for BarrelField {
    fn key(self) -> &'static str {
        match self {
            Self::Qr => "Qr",
            Self::Rfid => "Rfid",
            Self::Nfc => "Nfc",
        }
    }

    fn property(self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Rfid => "rfid",
            Self::Nfc => "nfc",
        }
    }

    fn kind(self) -> FieldKind {
        FieldKind::Text
    }

    fn required_message(self) -> &'static str {
        match self {
            Self::Qr => "Qr is required",
            Self::Rfid => "Rfid is required",
            Self::Nfc => "Nfc is required",
        }
    }

    fn error_schema() -> &'static Schema {
        &BARREL_ERROR
    }

    fn all() -> &'static [Self] {
        &[Self::Qr, Self::Rfid, Self::Nfc]
    }
}

impl fmt::Display for BarrelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasurementField {
    BarrelId,
    DirtLevel,
    Weight,
}

impl MeasurementField {
    /// Message for a negative value; only numeric fields have one
    pub fn negative_message(self) -> Option<&'static str> {
        match self {
            Self::BarrelId => None,
            Self::DirtLevel => Some("DirtLevel must be positive number"),
            Self::Weight => Some("Weight must be positive number"),
        }
    }
}

impl ErrorField for MeasurementField {
    fn key(self) -> &'static str {
        match self {
            Self::BarrelId => "BarrelId",
            Self::DirtLevel => "DirtLevel",
            Self::Weight => "Weight",
        }
    }

    fn property(self) -> &'static str {
        match self {
            Self::BarrelId => "barrelId",
            Self::DirtLevel => "dirtLevel",
            Self::Weight => "weight",
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::BarrelId => FieldKind::Text,
            Self::DirtLevel | Self::Weight => FieldKind::Number,
        }
    }

    fn required_message(self) -> &'static str {
        match self {
            Self::BarrelId => "BarrelId is required",
            Self::DirtLevel => "DirtLevel is required",
            Self::Weight => "Weight is required",
        }
    }

    fn error_schema() -> &'static Schema {
        &MEASUREMENT_ERROR
    }

    fn all() -> &'static [Self] {
        &[Self::BarrelId, Self::DirtLevel, Self::Weight]
    }
}

impl fmt::Display for MeasurementField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(errors: Value) -> Value {
        json!({ "title": VALIDATION_TITLE, "status": 400, "errors": errors })
    }

    #[test]
    fn test_barrel_envelope_keys() {
        assert!(BARREL_ERROR.is_valid(&envelope(json!({"Qr": ["Qr is required"]}))));
        assert!(BARREL_ERROR.is_valid(&envelope(json!({"$.qr": ["conversion"]}))));
        assert!(BARREL_ERROR.is_valid(&envelope(json!({
            "barrel": ["The barrel field is required."],
            "$.qr": ["conversion"]
        }))));
    }

    #[test]
    fn test_measurement_envelope_keys() {
        let errors = json!({"DirtLevel": ["x"], "Weight": ["y"]});
        assert!(MEASUREMENT_ERROR.is_valid(&envelope(errors)));
        assert!(MEASUREMENT_ERROR.is_valid(&envelope(json!({"measurement": ["x"]}))));
        assert!(!MEASUREMENT_ERROR.is_valid(&envelope(json!({"measurement": "x"}))));
    }

    #[test]
    fn test_envelope_messages_must_be_non_empty_lists() {
        assert!(!BARREL_ERROR.is_valid(&envelope(json!({"Qr": []}))));
        assert!(!BARREL_ERROR.is_valid(&envelope(json!({"Qr": "Qr is required"}))));
        assert!(!BARREL_ERROR.is_valid(&json!({"title": VALIDATION_TITLE, "status": 400})));
    }

    #[test]
    fn test_problem_is_title_only() {
        assert!(PROBLEM.is_valid(&json!({"title": BARREL_NOT_FOUND_TITLE})));
        assert!(PROBLEM.is_valid(&json!({"title": "Not Found", "status": 404})));
        assert!(!PROBLEM.is_valid(&json!({"status": 404})));
    }

    #[test]
    fn test_field_naming() {
        assert_eq!(BarrelField::Rfid.key(), "Rfid");
        assert_eq!(BarrelField::Rfid.conversion_key(), "$.rfid");
        assert_eq!(MeasurementField::DirtLevel.property(), "dirtLevel");
        assert_eq!(MeasurementField::Weight.kind(), FieldKind::Number);
        assert_eq!(MeasurementField::BarrelId.kind(), FieldKind::Text);
        assert_eq!(MeasurementField::BarrelId.negative_message(), None);
        assert_eq!(
            MeasurementField::Weight.negative_message(),
            Some("Weight must be positive number")
        );
    }

    #[test]
    fn test_required_messages_name_the_field() {
        for field in BarrelField::all() {
            assert!(field.required_message().starts_with(field.key()));
        }
        for field in MeasurementField::all() {
            assert!(field.required_message().starts_with(field.key()));
        }
    }
}
