//! Entity and error schemas
//!
//! JSON Schema (draft 7) definitions for every body the suite sends or
//! receives, compiled once and validated at runtime.
//!
//! - `entity` - barrels and measurements, request and response shapes
//! - `error` - validation envelopes, title-only problems, and the fields
//!   that may appear in them

mod compiled;
mod entity;
mod error;

pub use compiled::{Schema, SchemaError, Violation};
pub use entity::{BARREL, BARREL_LIST, MEASUREMENT, MEASUREMENT_LIST, NEW_BARREL, NEW_MEASUREMENT};
pub use error::{
    BARREL_ERROR, BARREL_NOT_FOUND_TITLE, BarrelField, CONVERSION_MESSAGE_FRAGMENT, ErrorField,
    FieldKind, MEASUREMENT_ERROR, MeasurementField, PROBLEM, VALIDATION_TITLE,
};
