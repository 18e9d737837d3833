use reqwest::StatusCode;
use thiserror::Error;

use crate::client::MonitorError;
use crate::schema::SchemaError;

/// Why a response (or a business-level assertion on it) was rejected
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Request failed: {0}")]
    Client(#[from] MonitorError),

    #[error("Expected status {expected}, got {actual}: {body}")]
    UnexpectedStatus {
        expected: StatusCode,
        actual: StatusCode,
        body: String,
    },

    #[error("Expected a JSON content type, got {0:?}")]
    ContentType(Option<String>),

    #[error("Response body is empty or falsy")]
    EmptyBody,

    #[error("Response body is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Error envelope has no entry for '{0}'")]
    MissingErrorKey(String),

    #[error("{what}: expected {expected}, got {actual}")]
    Mismatch {
        what: String,
        expected: String,
        actual: String,
    },

    #[error("{0}")]
    Assertion(String),
}

/// Result type for response checks
pub type VerifyResult<T> = Result<T, VerifyError>;

impl VerifyError {
    pub fn mismatch(
        what: impl Into<String>,
        expected: impl std::fmt::Debug,
        actual: impl std::fmt::Debug,
    ) -> Self {
        Self::Mismatch {
            what: what.into(),
            expected: format!("{expected:?}"),
            actual: format!("{actual:?}"),
        }
    }
}

/// Fail with a [`VerifyError::Mismatch`] unless `expected == actual`
pub fn ensure_eq<T>(what: &str, expected: T, actual: T) -> VerifyResult<()>
where
    T: PartialEq + std::fmt::Debug,
{
    if expected == actual {
        Ok(())
    } else {
        Err(VerifyError::mismatch(what, expected, actual))
    }
}

/// Fail with a [`VerifyError::Assertion`] unless `condition` holds
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> VerifyResult<()> {
    if condition {
        Ok(())
    } else {
        Err(VerifyError::Assertion(message()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_eq() {
        assert!(ensure_eq("qr", "a", "a").is_ok());

        let err = ensure_eq("qr", "a", "b").unwrap_err();
        assert_eq!(err.to_string(), "qr: expected \"a\", got \"b\"");
    }

    #[test]
    fn test_ensure_is_lazy() {
        assert!(ensure(true, || unreachable!()).is_ok());
        let err = ensure(false, || "id is empty".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "id is empty");
    }

    #[test]
    fn test_status_message() {
        let err = VerifyError::UnexpectedStatus {
            expected: StatusCode::CREATED,
            actual: StatusCode::BAD_REQUEST,
            body: "{}".into(),
        };
        assert_eq!(
            err.to_string(),
            "Expected status 201 Created, got 400 Bad Request: {}"
        );
    }
}
