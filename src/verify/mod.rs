//! Response validators
//!
//! Turn a [`RawResponse`](crate::client::RawResponse) into either a typed,
//! schema-checked value or a [`VerifyError`] explaining what was wrong.

mod error;
mod problems;
mod response;

pub use error::{VerifyError, VerifyResult, ensure, ensure_eq};
pub use problems::{
    expect_conversion_error, expect_envelope, expect_problem, expect_required_error,
    expect_validation_error, is_json_media_type,
};
pub use response::{
    Verified, expect_barrel, expect_barrels, expect_entity, expect_json_content_type,
    expect_measurement, expect_measurements, expect_status, is_truthy, parse_body,
};
