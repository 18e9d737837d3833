//! Barrel and measurement schemas
//!
//! Response schemas require the server-assigned `id`; request schemas do not.
//! Tag fields have no `maxLength`: the service accepts any length today, a
//! known gap in the service rather than a rule this suite enforces.

use once_cell::sync::Lazy;
use serde_json::{Value, json};

use super::compiled::{Schema, builtin};

fn text() -> Value {
    json!({ "type": "string", "minLength": 1 })
}

fn non_negative() -> Value {
    json!({ "type": "number", "minimum": 0 })
}

fn barrel(id_required: bool) -> Value {
    let mut required = vec!["qr", "rfid", "nfc"];
    if id_required {
        required.insert(0, "id");
    }
    json!({
        "type": "object",
        "required": required,
        "properties": {
            "id": text(),
            "qr": text(),
            "rfid": text(),
            "nfc": text(),
        }
    })
}

fn measurement(id_required: bool) -> Value {
    let mut required = vec!["barrelId", "dirtLevel", "weight"];
    if id_required {
        required.insert(0, "id");
    }
    json!({
        "type": "object",
        "required": required,
        "properties": {
            "id": text(),
            "barrelId": text(),
            "dirtLevel": non_negative(),
            "weight": non_negative(),
        }
    })
}

fn list_of(item: Value) -> Value {
    json!({ "type": "array", "items": item })
}

/// Barrel as returned by the service
pub static BARREL: Lazy<Schema> = Lazy::new(|| builtin("barrel", barrel(true)));

/// Response of GET /barrels
pub static BARREL_LIST: Lazy<Schema> =
    Lazy::new(|| builtin("barrel-list", list_of(barrel(true))));

/// Body of POST /barrels
pub static NEW_BARREL: Lazy<Schema> = Lazy::new(|| builtin("new-barrel", barrel(false)));

/// Measurement as returned by the service
pub static MEASUREMENT: Lazy<Schema> = Lazy::new(|| builtin("measurement", measurement(true)));

/// Response of GET /measurements
pub static MEASUREMENT_LIST: Lazy<Schema> =
    Lazy::new(|| builtin("measurement-list", list_of(measurement(true))));

/// Body of POST /measurements
pub static NEW_MEASUREMENT: Lazy<Schema> =
    Lazy::new(|| builtin("new-measurement", measurement(false)));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_barrel_requires_id() {
        let body = json!({"qr": "a", "rfid": "b", "nfc": "c"});
        assert!(!BARREL.is_valid(&body));
        assert!(NEW_BARREL.is_valid(&body));
    }

    #[test]
    fn test_barrel_rejects_empty_tags() {
        let body = json!({"id": "1", "qr": "", "rfid": "b", "nfc": "c"});
        assert!(!BARREL.is_valid(&body));
    }

    #[test]
    fn test_barrel_accepts_single_char_and_long_tags() {
        let long = "x".repeat(10_000);
        assert!(BARREL.is_valid(&json!({"id": "1", "qr": "T", "rfid": "R", "nfc": long})));
    }

    #[test]
    fn test_barrel_list() {
        assert!(BARREL_LIST.is_valid(&json!([])));
        assert!(!BARREL_LIST.is_valid(&json!([{"id": "1"}])));
        assert!(!BARREL_LIST.is_valid(&json!({"id": "1"})));
    }

    #[test]
    fn test_measurement_bounds() {
        let ok = json!({"id": "m", "barrelId": "b", "dirtLevel": 0, "weight": 12.5});
        let negative = json!({"id": "m", "barrelId": "b", "dirtLevel": -0.01, "weight": 12.5});
        let as_text = json!({"id": "m", "barrelId": "b", "dirtLevel": "1", "weight": 12.5});

        assert!(MEASUREMENT.is_valid(&ok));
        assert!(!MEASUREMENT.is_valid(&negative));
        assert!(!MEASUREMENT.is_valid(&as_text));
    }

    #[test]
    fn test_new_measurement_needs_barrel_link() {
        assert!(!NEW_MEASUREMENT.is_valid(&json!({"dirtLevel": 1, "weight": 1})));
        assert!(NEW_MEASUREMENT.is_valid(&json!({"barrelId": "b", "dirtLevel": 1, "weight": 1})));
        assert!(MEASUREMENT_LIST.is_valid(&json!([])));
    }
}
