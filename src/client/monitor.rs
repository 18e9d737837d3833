//! Barrel Monitor HTTP API Client
//!
//! Thin client over the `/barrels` and `/measurements` routes. Every call
//! returns a [`RawResponse`] so the caller decides what counts as correct.

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::response::RawResponse;
use super::types::{NewBarrel, NewMeasurement};

/// Default per-request timeout
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur when talking to the Barrel Monitor
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Result type for Barrel Monitor operations
pub type MonitorResult<T> = Result<T, MonitorError>;

/// Body of an outgoing request
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// Serialized as JSON and sent with `Content-Type: application/json`
    Json(serde_json::Value),
    /// Sent verbatim with the given content type
    Raw {
        content_type: String,
        bytes: Vec<u8>,
    },
}

/// Client bound to one Barrel Monitor deployment
///
/// # Example
/// ```no_run
/// use cooper::client::{MonitorClient, NewBarrel};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = MonitorClient::new("http://localhost:5000")?;
/// let response = client.create_barrel(&NewBarrel::new("qr", "rfid", "nfc")).await?;
/// println!("status: {}", response.status);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct MonitorClient {
    /// Base URL, always ending in `/` so relative joins keep any path prefix
    base_url: Url,
    client: Client,
    name: Option<String>,
}

impl MonitorClient {
    /// Create a client with the default request timeout
    pub fn new(api_url: &str) -> MonitorResult<Self> {
        let client = Client::builder().timeout(DEFAULT_REQUEST_TIMEOUT).build()?;
        Self::with_client(api_url, client)
    }

    /// Create a client with a custom HTTP client
    pub fn with_client(api_url: &str, client: Client) -> MonitorResult<Self> {
        let mut base_url = Url::parse(api_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self {
            base_url,
            client,
            name: None,
        })
    }

    /// Set a name for this target (used in logs)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Name if set, otherwise the base URL
    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.base_url.to_string())
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a route relative to the base URL
    pub fn url(&self, path: &str) -> MonitorResult<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// Send an arbitrary request and buffer the response
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<RequestBody>,
    ) -> MonitorResult<RawResponse> {
        let url = self.url(path)?;
        debug!(target_name = ?self.name, %method, %url, "Sending request");

        let mut request = self.client.request(method.clone(), url);
        request = match body {
            Some(RequestBody::Json(value)) => request
                .header(CONTENT_TYPE, "application/json")
                .body(serde_json::to_vec(&value)?),
            Some(RequestBody::Raw {
                content_type,
                bytes,
            }) => request.header(CONTENT_TYPE, content_type).body(bytes),
            None => request,
        };

        let response = RawResponse::read(request.send().await?).await?;
        debug!(%method, path, status = %response.status, "Received response");
        Ok(response)
    }

    /// POST a JSON body
    pub async fn post_json(
        &self,
        path: &str,
        body: &impl Serialize,
    ) -> MonitorResult<RawResponse> {
        let value = serde_json::to_value(body)?;
        self.send(Method::POST, path, Some(RequestBody::Json(value)))
            .await
    }

    // =========================================================================
    // Barrels
    // =========================================================================

    /// POST /barrels
    pub async fn create_barrel(&self, barrel: &NewBarrel) -> MonitorResult<RawResponse> {
        self.post_json("barrels", barrel).await
    }

    /// GET /barrels
    pub async fn list_barrels(&self) -> MonitorResult<RawResponse> {
        self.send(Method::GET, "barrels", None).await
    }

    /// GET /barrels/{id}
    pub async fn get_barrel(&self, id: &str) -> MonitorResult<RawResponse> {
        self.send(Method::GET, &format!("barrels/{id}"), None).await
    }

    /// DELETE /barrels/{id}
    pub async fn delete_barrel(&self, id: &str) -> MonitorResult<RawResponse> {
        self.send(Method::DELETE, &format!("barrels/{id}"), None)
            .await
    }

    // =========================================================================
    // Measurements
    // =========================================================================

    /// POST /measurements
    pub async fn create_measurement(
        &self,
        measurement: &NewMeasurement,
    ) -> MonitorResult<RawResponse> {
        self.post_json("measurements", measurement).await
    }

    /// GET /measurements
    pub async fn list_measurements(&self) -> MonitorResult<RawResponse> {
        self.send(Method::GET, "measurements", None).await
    }

    /// GET /measurements/{id}
    pub async fn get_measurement(&self, id: &str) -> MonitorResult<RawResponse> {
        self.send(Method::GET, &format!("measurements/{id}"), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = MonitorClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/");
    }

    #[test]
    fn test_path_prefix_preserved() {
        let client = MonitorClient::new("http://localhost:5000/api").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:5000/api/");
        assert_eq!(
            client.url("/barrels/abc").unwrap().as_str(),
            "http://localhost:5000/api/barrels/abc"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            MonitorClient::new("not a url"),
            Err(MonitorError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_label_with_name() {
        let client = MonitorClient::new("http://localhost:5000")
            .unwrap()
            .with_name("staging");
        assert_eq!(client.label(), "staging");
    }

    #[test]
    fn test_label_without_name() {
        let client = MonitorClient::new("http://localhost:5000").unwrap();
        assert_eq!(client.label(), "http://localhost:5000/");
    }
}
