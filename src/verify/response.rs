//! Entity response validators
//!
//! Each check runs in the same order: status, JSON content type, non-empty
//! body, schema, then typed decode. The raw JSON is kept next to the typed
//! value so later steps can compare representations exactly.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::ops::Deref;

use super::error::{VerifyError, VerifyResult};
use crate::client::{Barrel, Measurement, RawResponse};
use crate::schema::{BARREL, BARREL_LIST, MEASUREMENT, MEASUREMENT_LIST, Schema};

const BODY_PREVIEW_CHARS: usize = 512;

/// A decoded body together with the JSON it was decoded from
#[derive(Debug, Clone)]
pub struct Verified<T> {
    pub value: T,
    pub raw: Value,
}

impl<T> Deref for Verified<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> Verified<T> {
    pub fn into_inner(self) -> T {
        self.value
    }
}

/// JavaScript truthiness of a JSON value
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(super) fn body_preview(response: &RawResponse) -> String {
    let text = response.text();
    if text.chars().count() <= BODY_PREVIEW_CHARS {
        text.into_owned()
    } else {
        let mut preview: String = text.chars().take(BODY_PREVIEW_CHARS).collect();
        preview.push('…');
        preview
    }
}

/// Fail unless the response carries `expected`
pub fn expect_status(response: &RawResponse, expected: StatusCode) -> VerifyResult<()> {
    if response.status == expected {
        Ok(())
    } else {
        Err(VerifyError::UnexpectedStatus {
            expected,
            actual: response.status,
            body: body_preview(response),
        })
    }
}

/// Fail unless the content type contains `application/json`
pub fn expect_json_content_type(response: &RawResponse) -> VerifyResult<()> {
    match response.content_type() {
        Some(ct) if ct.to_ascii_lowercase().contains("application/json") => Ok(()),
        other => Err(VerifyError::ContentType(other.map(str::to_string))),
    }
}

/// Parse the body, rejecting empty and falsy documents
pub fn parse_body(response: &RawResponse) -> VerifyResult<Value> {
    if response.body.is_empty() {
        return Err(VerifyError::EmptyBody);
    }
    let value: Value = serde_json::from_slice(&response.body)?;
    if !is_truthy(&value) {
        return Err(VerifyError::EmptyBody);
    }
    Ok(value)
}

/// Full entity check: status, content type, body, schema, decode
pub fn expect_entity<T: DeserializeOwned>(
    response: &RawResponse,
    status: StatusCode,
    schema: &Schema,
) -> VerifyResult<Verified<T>> {
    expect_status(response, status)?;
    expect_json_content_type(response)?;
    let raw = parse_body(response)?;
    schema.validate(&raw)?;
    let value = serde_json::from_value(raw.clone())?;
    Ok(Verified { value, raw })
}

/// A single barrel with the given status (201 on create, 200 on read)
pub fn expect_barrel(response: &RawResponse, status: StatusCode) -> VerifyResult<Verified<Barrel>> {
    expect_entity(response, status, &BARREL)
}

/// 200 with an array of barrels
pub fn expect_barrels(response: &RawResponse) -> VerifyResult<Verified<Vec<Barrel>>> {
    expect_entity(response, StatusCode::OK, &BARREL_LIST)
}

/// A single measurement with the given status
pub fn expect_measurement(
    response: &RawResponse,
    status: StatusCode,
) -> VerifyResult<Verified<Measurement>> {
    expect_entity(response, status, &MEASUREMENT)
}

/// 200 with an array of measurements
pub fn expect_measurements(response: &RawResponse) -> VerifyResult<Verified<Vec<Measurement>>> {
    expect_entity(response, StatusCode::OK, &MEASUREMENT_LIST)
}
