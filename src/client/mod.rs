//! Barrel Monitor API Client
//!
//! Hand-written client for the Barrel Monitor HTTP API.
//! Responses are returned raw; decoding and checking happens in `verify`.

mod monitor;
mod response;
mod types;

pub use monitor::{
    DEFAULT_REQUEST_TIMEOUT, MonitorClient, MonitorError, MonitorResult, RequestBody,
};
pub use response::RawResponse;
pub use types::*;
