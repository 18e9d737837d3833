//! Error-shape validators
//!
//! Fixed messages are compared exactly. Type-conversion messages embed the
//! service's internal type names, so only their stable prefix is matched.

use reqwest::StatusCode;

use super::error::{VerifyError, VerifyResult, ensure_eq};
use super::response::{Verified, expect_status, parse_body};
use crate::client::{ErrorResponse, RawResponse};
use crate::schema::{CONVERSION_MESSAGE_FRAGMENT, ErrorField, PROBLEM, Schema, VALIDATION_TITLE};

/// `application/json`, `application/problem+json` and other `+json` types
pub fn is_json_media_type(content_type: &str) -> bool {
    let media = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media == "application/json" || (media.starts_with("application/") && media.ends_with("+json"))
}

fn decode_error(response: &RawResponse, schema: &Schema) -> VerifyResult<Verified<ErrorResponse>> {
    match response.content_type() {
        Some(ct) if is_json_media_type(ct) => {}
        other => return Err(VerifyError::ContentType(other.map(str::to_string))),
    }
    let raw = parse_body(response)?;
    schema.validate(&raw)?;
    let value = serde_json::from_value(raw.clone())?;
    Ok(Verified { value, raw })
}

/// 400 with the generic validation envelope of `F`'s entity
pub fn expect_envelope<F: ErrorField>(
    response: &RawResponse,
) -> VerifyResult<Verified<ErrorResponse>> {
    expect_status(response, StatusCode::BAD_REQUEST)?;
    let envelope = decode_error(response, F::error_schema())?;
    ensure_eq("title", VALIDATION_TITLE, envelope.title.as_str())?;
    if envelope.errors.is_none() {
        return Err(VerifyError::Assertion(
            "validation envelope has no errors".to_string(),
        ));
    }
    Ok(envelope)
}

/// 400 whose `errors[field][0]` is exactly `message`
pub fn expect_validation_error<F: ErrorField>(
    response: &RawResponse,
    field: F,
    message: &str,
) -> VerifyResult<Verified<ErrorResponse>> {
    let envelope = expect_envelope::<F>(response)?;
    let actual = envelope
        .first_error(field.key())
        .ok_or_else(|| VerifyError::MissingErrorKey(field.key().to_string()))?;
    ensure_eq(&format!("errors.{}[0]", field.key()), message, actual)?;
    Ok(envelope)
}

/// 400 carrying `field`'s fixed required message
pub fn expect_required_error<F: ErrorField>(
    response: &RawResponse,
    field: F,
) -> VerifyResult<Verified<ErrorResponse>> {
    expect_validation_error(response, field, field.required_message())
}

/// 400 with a `$.<property>` type-conversion entry
pub fn expect_conversion_error<F: ErrorField>(
    response: &RawResponse,
    field: F,
) -> VerifyResult<Verified<ErrorResponse>> {
    let envelope = expect_envelope::<F>(response)?;
    let key = field.conversion_key();
    let actual = envelope
        .first_error(&key)
        .ok_or_else(|| VerifyError::MissingErrorKey(key.clone()))?;
    if !actual.contains(CONVERSION_MESSAGE_FRAGMENT) {
        return Err(VerifyError::mismatch(
            format!("errors.{key}[0]"),
            format!("text containing {CONVERSION_MESSAGE_FRAGMENT:?}"),
            actual,
        ));
    }
    Ok(envelope)
}

/// Title-only problem with the given status and exact title
pub fn expect_problem(
    response: &RawResponse,
    status: StatusCode,
    title: &str,
) -> VerifyResult<Verified<ErrorResponse>> {
    expect_status(response, status)?;
    let problem = decode_error(response, &PROBLEM)?;
    ensure_eq("title", title, problem.title.as_str())?;
    Ok(problem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BARREL_NOT_FOUND_TITLE, BarrelField, MeasurementField};
    use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn problem_response(status: StatusCode, body: Value) -> RawResponse {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json; charset=utf-8"),
        );
        RawResponse::new(status, headers, body.to_string())
    }

    fn envelope(errors: Value) -> RawResponse {
        problem_response(
            StatusCode::BAD_REQUEST,
            json!({"title": VALIDATION_TITLE, "status": 400, "errors": errors}),
        )
    }

    #[rstest]
    #[case("application/json", true)]
    #[case("application/json; charset=utf-8", true)]
    #[case("application/problem+json; charset=utf-8", true)]
    #[case("Application/JSON", true)]
    #[case("text/plain", false)]
    #[case("text/json+html", false)]
    fn test_json_media_types(#[case] content_type: &str, #[case] expected: bool) {
        assert_eq!(is_json_media_type(content_type), expected);
    }

    #[test]
    fn test_required_error_matches() {
        let response = envelope(json!({"Nfc": ["Nfc is required"]}));
        let envelope = expect_required_error(&response, BarrelField::Nfc).unwrap();
        assert_eq!(envelope.status, Some(400));
    }

    #[test]
    fn test_message_must_match_exactly() {
        let response = envelope(json!({"Qr": ["Qr is required."]}));
        let err = expect_required_error(&response, BarrelField::Qr).unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch { .. }));
    }

    #[test]
    fn test_missing_key() {
        let response = envelope(json!({"Rfid": ["Rfid is required"]}));
        let err = expect_required_error(&response, BarrelField::Qr).unwrap_err();
        assert!(matches!(err, VerifyError::MissingErrorKey(ref k) if k == "Qr"));
    }

    #[test]
    fn test_wrong_title() {
        let response = problem_response(
            StatusCode::BAD_REQUEST,
            json!({"title": "Bad", "status": 400, "errors": {"Qr": ["Qr is required"]}}),
        );
        let err = expect_required_error(&response, BarrelField::Qr).unwrap_err();
        assert!(matches!(err, VerifyError::Mismatch { ref what, .. } if what == "title"));
    }

    #[test]
    fn test_other_entity_key_is_not_the_field() {
        let response = envelope(json!({"Qr": ["Qr is required"]}));
        let err = expect_required_error(&response, MeasurementField::Weight).unwrap_err();
        assert!(matches!(err, VerifyError::MissingErrorKey(ref k) if k == "Weight"));
    }

    #[test]
    fn test_conversion_error_beside_model_key() {
        let response = envelope(json!({
            "barrel": ["The barrel field is required."],
            "$.qr": ["The JSON value could not be converted to System.String. Path: $.qr"]
        }));
        assert!(expect_conversion_error(&response, BarrelField::Qr).is_ok());
    }

    #[test]
    fn test_negative_message() {
        let response = envelope(json!({"DirtLevel": ["DirtLevel must be positive number"]}));
        let message = MeasurementField::DirtLevel.negative_message().unwrap();
        assert!(expect_validation_error(&response, MeasurementField::DirtLevel, message).is_ok());
    }

    #[test]
    fn test_conversion_error_by_substring() {
        let message = "The JSON value could not be converted to System.Double. Path: $.dirtLevel";
        let response = envelope(json!({ "$.dirtLevel": [message] }));
        assert!(expect_conversion_error(&response, MeasurementField::DirtLevel).is_ok());

        let other = envelope(json!({"$.dirtLevel": ["Something else"]}));
        assert!(expect_conversion_error(&other, MeasurementField::DirtLevel).is_err());
    }

    #[test]
    fn test_problem_title() {
        let response =
            problem_response(StatusCode::NOT_FOUND, json!({"title": BARREL_NOT_FOUND_TITLE}));
        let title = BARREL_NOT_FOUND_TITLE;
        assert!(expect_problem(&response, StatusCode::NOT_FOUND, title).is_ok());
        assert!(expect_problem(&response, StatusCode::NOT_FOUND, "Not Found").is_err());
        assert!(expect_problem(&response, StatusCode::BAD_REQUEST, title).is_err());
    }
}
