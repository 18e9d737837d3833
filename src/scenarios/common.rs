//! Steps shared by several scenarios

use reqwest::StatusCode;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::{Barrel, Measurement, MonitorClient, NewBarrel, NewMeasurement};
use crate::schema::{ErrorField, FieldKind};
use crate::verify::{
    Verified, VerifyError, VerifyResult, ensure, ensure_eq, expect_barrel, expect_conversion_error,
    expect_measurement, expect_required_error,
};

/// POST a barrel and check 201, echoed tags and a non-empty id
pub async fn create_barrel(
    client: &MonitorClient,
    payload: &NewBarrel,
) -> VerifyResult<Verified<Barrel>> {
    let created = expect_barrel(&client.create_barrel(payload).await?, StatusCode::CREATED)?;
    ensure(!created.id.is_empty(), || {
        "created barrel has an empty id".to_string()
    })?;
    ensure_eq("qr", payload.qr.as_str(), created.qr.as_str())?;
    ensure_eq("rfid", payload.rfid.as_str(), created.rfid.as_str())?;
    ensure_eq("nfc", payload.nfc.as_str(), created.nfc.as_str())?;
    Ok(created)
}

/// POST a measurement and check 201, echoed fields and a non-empty id
pub async fn create_measurement(
    client: &MonitorClient,
    payload: &NewMeasurement,
) -> VerifyResult<Verified<Measurement>> {
    let created = expect_measurement(
        &client.create_measurement(payload).await?,
        StatusCode::CREATED,
    )?;
    ensure(!created.id.is_empty(), || {
        "created measurement has an empty id".to_string()
    })?;
    ensure_eq(
        "barrelId",
        payload.barrel_id.as_str(),
        created.barrel_id.as_str(),
    )?;
    ensure_eq("dirtLevel", payload.dirt_level, created.dirt_level)?;
    ensure_eq("weight", payload.weight, created.weight)?;
    Ok(created)
}

/// The listing holds an entry with `created`'s id whose JSON equals it exactly
pub fn ensure_listed(listing: &Value, created: &Value) -> VerifyResult<()> {
    let id = &created["id"];
    let entry = listing
        .as_array()
        .and_then(|items| items.iter().find(|item| &item["id"] == id))
        .ok_or_else(|| VerifyError::Assertion(format!("listing has no entry with id {id}")))?;
    ensure_eq("listed entry", created, entry)
}

/// Best-effort removal of barrels a scenario created
pub async fn cleanup_barrels(client: &MonitorClient, ids: &[String]) {
    for id in ids {
        match client.delete_barrel(id).await {
            Ok(response) => debug!(barrel = %id, status = %response.status, "Cleanup delete"),
            Err(e) => debug!(barrel = %id, error = %e, "Cleanup delete failed"),
        }
    }
}

/// Invalid states every required field is probed with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldState {
    /// Key removed from the body
    Absent,
    /// Key present with `null`
    Null,
    /// Key declared without a value. JSON has no `undefined`, so it is
    /// dropped during serialization, as a JavaScript client would.
    Undefined,
    /// Key present with `""`
    Empty,
    /// Key present with a value of the wrong JSON type
    WrongType,
}

impl FieldState {
    pub const ALL: [Self; 5] = [
        Self::Absent,
        Self::Null,
        Self::Undefined,
        Self::Empty,
        Self::WrongType,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Null => "null",
            Self::Undefined => "undefined",
            Self::Empty => "empty string",
            Self::WrongType => "wrong type",
        }
    }

    /// Put `property` of `body` into this state
    pub fn apply(self, body: &mut Map<String, Value>, property: &str, kind: FieldKind) {
        match self {
            Self::Absent | Self::Undefined => {
                body.remove(property);
            }
            Self::Null => {
                body.insert(property.to_string(), Value::Null);
            }
            Self::Empty => {
                body.insert(property.to_string(), json!(""));
            }
            Self::WrongType => {
                let value = match kind {
                    FieldKind::Text => json!(12345),
                    FieldKind::Number => json!("not-a-number"),
                };
                body.insert(property.to_string(), value);
            }
        }
    }
}

/// Valid body with one field put into `state`
pub fn invalid_body<F: ErrorField>(valid: &Value, field: F, state: FieldState) -> Value {
    let mut body = valid.as_object().cloned().unwrap_or_default();
    state.apply(&mut body, field.property(), field.kind());
    Value::Object(body)
}

/// Check the response to a body built by [`invalid_body`]
pub fn expect_rejected<F: ErrorField>(
    response: &crate::client::RawResponse,
    field: F,
    state: FieldState,
) -> VerifyResult<()> {
    match state {
        FieldState::WrongType => expect_conversion_error(response, field)?,
        _ => expect_required_error(response, field)?,
    };
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BarrelField, MeasurementField};
    use std::collections::HashSet;

    fn barrel_body() -> Value {
        json!({"qr": "q", "rfid": "r", "nfc": "n"})
    }

    #[test]
    fn test_absent_and_undefined_drop_the_key() {
        for state in [FieldState::Absent, FieldState::Undefined] {
            let body = invalid_body(&barrel_body(), BarrelField::Qr, state);
            assert_eq!(body, json!({"rfid": "r", "nfc": "n"}));
        }
    }

    #[test]
    fn test_null_and_empty() {
        let null = invalid_body(&barrel_body(), BarrelField::Rfid, FieldState::Null);
        assert_eq!(null["rfid"], Value::Null);

        let empty = invalid_body(&barrel_body(), BarrelField::Nfc, FieldState::Empty);
        assert_eq!(empty["nfc"], "");
    }

    #[test]
    fn test_wrong_type_depends_on_kind() {
        let text = invalid_body(&barrel_body(), BarrelField::Qr, FieldState::WrongType);
        assert!(text["qr"].is_number());

        let measurement = json!({"barrelId": "b", "dirtLevel": 1.0, "weight": 2.0});
        let number = invalid_body(&measurement, MeasurementField::Weight, FieldState::WrongType);
        assert!(number["weight"].is_string());
    }

    #[test]
    fn test_ensure_listed() {
        let created = json!({"id": "2", "qr": "q"});
        assert!(ensure_listed(&json!([{"id": "1"}, {"id": "2", "qr": "q"}]), &created).is_ok());
        assert!(ensure_listed(&json!([{"id": "2", "qr": "other"}]), &created).is_err());
        assert!(ensure_listed(&json!([]), &created).is_err());
    }

    #[test]
    fn test_labels_are_unique() {
        let labels: HashSet<_> = FieldState::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels.len(), FieldState::ALL.len());
    }
}
