//! Barrel Monitor API Types
//!
//! Entities as the service returns them, and the payloads sent to create them.
//! Property names follow the service's camelCase JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Server-assigned identifier (a GUID string on the current service)
pub type EntityId = String;

/// A barrel tracked by its QR, RFID and NFC tags
/// Endpoint: GET /barrels/{id}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barrel {
    pub id: EntityId,
    pub qr: String,
    pub rfid: String,
    pub nfc: String,
}

/// Request body for POST /barrels
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBarrel {
    /// Normally left for the server to assign
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub qr: String,
    pub rfid: String,
    pub nfc: String,
}

impl NewBarrel {
    pub fn new(qr: impl Into<String>, rfid: impl Into<String>, nfc: impl Into<String>) -> Self {
        Self {
            id: None,
            qr: qr.into(),
            rfid: rfid.into(),
            nfc: nfc.into(),
        }
    }
}

/// A dirt level and weight reading for one barrel
/// Endpoint: GET /measurements/{id}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: EntityId,
    pub barrel_id: EntityId,
    pub dirt_level: f64,
    pub weight: f64,
}

/// Request body for POST /measurements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMeasurement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityId>,
    pub barrel_id: EntityId,
    pub dirt_level: f64,
    pub weight: f64,
}

/// Error envelope returned for 400 and 404 responses
///
/// Validation failures carry `errors`; title-only problems (such as an
/// unknown barrel on measurement create) may omit `status` and `errors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Field key -> ordered messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl ErrorResponse {
    /// First message recorded for `key`, if any
    pub fn first_error(&self, key: &str) -> Option<&str> {
        self.errors
            .as_ref()?
            .get(key)?
            .first()
            .map(String::as_str)
    }
}
