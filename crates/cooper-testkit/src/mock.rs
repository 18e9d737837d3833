//! In-process mock Barrel Monitor
//!
//! An axum server on an ephemeral local port that answers the Barrel Monitor
//! routes the way the real service does: validation envelopes, type-conversion
//! errors, 404/405/415 statuses and cascade deletes. Lets the scenarios be
//! exercised without a deployed service.
//!
//! Faults can be injected through [`MockBehavior`] to prove that a scenario
//! notices when the service misbehaves.
//!
//! # Example
//!
//! ```no_run
//! use cooper_testkit::mock::MockMonitor;
//!
//! # async fn example() -> std::io::Result<()> {
//! let monitor = MockMonitor::start().await?;
//! println!("mock listening on {}", monitor.base_url());
//! # Ok(())
//! # }
//! ```

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use parking_lot::RwLock;
use serde_json::{Map, Value, json};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Title of every 400 validation envelope
pub const VALIDATION_TITLE: &str = "One or more validation errors occurred.";

/// Title of the 404 returned when a measurement references an unknown barrel
pub const BARREL_NOT_FOUND_TITLE: &str = "Barrel not found";

const PROBLEM_CONTENT_TYPE: &str = "application/problem+json; charset=utf-8";

/// (json property, error key)
const BARREL_FIELDS: [(&str, &str); 3] = [("qr", "Qr"), ("rfid", "Rfid"), ("nfc", "Nfc")];
const NUMERIC_FIELDS: [(&str, &str); 2] = [("dirtLevel", "DirtLevel"), ("weight", "Weight")];

/// Switches for injecting faults into the mock
#[derive(Debug, Clone, Copy)]
pub struct MockBehavior {
    /// Delete a barrel's measurements together with the barrel
    pub cascade_deletes: bool,
    /// Reject missing, null and empty required fields
    pub enforce_required: bool,
    /// Reject negative dirt level and weight
    pub reject_negative: bool,
}

impl Default for MockBehavior {
    fn default() -> Self {
        Self {
            cascade_deletes: true,
            enforce_required: true,
            reject_negative: true,
        }
    }
}

#[derive(Debug, Default)]
struct Store {
    barrels: Vec<Value>,
    measurements: Vec<Value>,
}

#[derive(Debug, Clone)]
struct MockState {
    store: Arc<RwLock<Store>>,
    behavior: MockBehavior,
}

/// A running mock monitor. The server is aborted on drop.
#[derive(Debug)]
pub struct MockMonitor {
    addr: SocketAddr,
    store: Arc<RwLock<Store>>,
    handle: JoinHandle<()>,
}

impl MockMonitor {
    /// Start a well-behaved mock on 127.0.0.1 with an OS-assigned port
    pub async fn start() -> std::io::Result<Self> {
        Self::start_with(MockBehavior::default()).await
    }

    /// Start a mock with the given behavior
    pub async fn start_with(behavior: MockBehavior) -> std::io::Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).await?;
        let addr = listener.local_addr()?;
        let store = Arc::new(RwLock::new(Store::default()));

        let app = build_router(MockState {
            store: Arc::clone(&store),
            behavior,
        });

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Mock monitor stopped");
            }
        });

        tracing::debug!(%addr, ?behavior, "Mock monitor listening");

        Ok(Self {
            addr,
            store,
            handle,
        })
    }

    /// Base URL to point a client at
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of stored barrels
    pub fn barrel_count(&self) -> usize {
        self.store.read().barrels.len()
    }

    /// Number of stored measurements
    pub fn measurement_count(&self) -> usize {
        self.store.read().measurements.len()
    }
}

impl Drop for MockMonitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn build_router(state: MockState) -> Router {
    // Unrouted methods on these paths get axum's 405
    Router::new()
        .route("/barrels", get(list_barrels).post(create_barrel))
        .route("/barrels/{id}", get(get_barrel).delete(delete_barrel))
        .route(
            "/measurements",
            get(list_measurements).post(create_measurement),
        )
        .route("/measurements/{id}", get(get_measurement))
        .with_state(state)
}

async fn list_barrels(State(state): State<MockState>) -> Json<Value> {
    Json(Value::Array(state.store.read().barrels.clone()))
}

async fn list_measurements(State(state): State<MockState>) -> Json<Value> {
    Json(Value::Array(state.store.read().measurements.clone()))
}

async fn get_barrel(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    find_by_id(&state.store.read().barrels, &id)
}

async fn get_measurement(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    find_by_id(&state.store.read().measurements, &id)
}

async fn delete_barrel(State(state): State<MockState>, Path(id): Path<String>) -> Response {
    let mut store = state.store.write();
    let before = store.barrels.len();
    store.barrels.retain(|b| b["id"] != id.as_str());
    if store.barrels.len() == before {
        return not_found();
    }

    if state.behavior.cascade_deletes {
        store.measurements.retain(|m| m["barrelId"] != id.as_str());
    }

    StatusCode::NO_CONTENT.into_response()
}

async fn create_barrel(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match read_payload(&headers, &body, "barrel") {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    for (name, _) in BARREL_FIELDS {
        if !matches!(
            payload.get(name),
            None | Some(Value::Null) | Some(Value::String(_))
        ) {
            return conversion_error("barrel", name, "System.String");
        }
    }

    if state.behavior.enforce_required {
        let mut errors = Map::new();
        for (name, key) in BARREL_FIELDS {
            if text(&payload, name).is_empty() {
                errors.insert(key.to_string(), json!([format!("{key} is required")]));
            }
        }
        if !errors.is_empty() {
            return validation_error(errors);
        }
    }

    let barrel = json!({
        "id": Uuid::new_v4().to_string(),
        "qr": text(&payload, "qr"),
        "rfid": text(&payload, "rfid"),
        "nfc": text(&payload, "nfc"),
    });
    state.store.write().barrels.push(barrel.clone());

    (StatusCode::CREATED, Json(barrel)).into_response()
}

async fn create_measurement(
    State(state): State<MockState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = match read_payload(&headers, &body, "measurement") {
        Ok(payload) => payload,
        Err(response) => return response,
    };

    match payload.get("barrelId") {
        None | Some(Value::Null) => {}
        Some(Value::String(s)) if s.is_empty() || Uuid::parse_str(s).is_ok() => {}
        Some(_) => return conversion_error("measurement", "barrelId", "System.Guid"),
    }
    for (name, _) in NUMERIC_FIELDS {
        match payload.get(name) {
            None | Some(Value::Null) | Some(Value::Number(_)) => {}
            Some(Value::String(s)) if s.is_empty() => {}
            Some(_) => return conversion_error("measurement", name, "System.Double"),
        }
    }

    let mut errors = Map::new();
    if state.behavior.enforce_required && text(&payload, "barrelId").is_empty() {
        errors.insert("BarrelId".to_string(), json!(["BarrelId is required"]));
    }
    for (name, key) in NUMERIC_FIELDS {
        match payload.get(name).and_then(Value::as_f64) {
            None if state.behavior.enforce_required => {
                errors.insert(key.to_string(), json!([format!("{key} is required")]));
            }
            Some(v) if v < 0.0 && state.behavior.reject_negative => {
                errors.insert(
                    key.to_string(),
                    json!([format!("{key} must be positive number")]),
                );
            }
            _ => {}
        }
    }
    if !errors.is_empty() {
        return validation_error(errors);
    }

    let barrel_id = text(&payload, "barrelId");
    let mut store = state.store.write();
    if !store.barrels.iter().any(|b| b["id"] == barrel_id.as_str()) {
        return problem(
            StatusCode::NOT_FOUND,
            json!({ "title": BARREL_NOT_FOUND_TITLE, "status": 404 }),
        );
    }

    let measurement = json!({
        "id": Uuid::new_v4().to_string(),
        "barrelId": barrel_id,
        "dirtLevel": payload.get("dirtLevel").and_then(Value::as_f64).unwrap_or_default(),
        "weight": payload.get("weight").and_then(Value::as_f64).unwrap_or_default(),
    });
    store.measurements.push(measurement.clone());

    (StatusCode::CREATED, Json(measurement)).into_response()
}

/// Content-type gate and JSON object parse shared by both create routes
fn read_payload(
    headers: &HeaderMap,
    body: &Bytes,
    model: &str,
) -> Result<Map<String, Value>, Response> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_ascii_lowercase().starts_with("application/json"))
        .unwrap_or(false);
    if !is_json {
        return Err(StatusCode::UNSUPPORTED_MEDIA_TYPE.into_response());
    }

    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        _ => Err(conversion_error(model, "", "the request model")),
    }
}

fn text(payload: &Map<String, Value>, name: &str) -> String {
    payload
        .get(name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn find_by_id(records: &[Value], id: &str) -> Response {
    records
        .iter()
        .find(|r| r["id"] == id)
        .map(|r| Json(r.clone()).into_response())
        .unwrap_or_else(not_found)
}

fn not_found() -> Response {
    problem(
        StatusCode::NOT_FOUND,
        json!({
            "type": "https://tools.ietf.org/html/rfc9110#section-15.5.5",
            "title": "Not Found",
            "status": 404,
        }),
    )
}

fn validation_error(errors: Map<String, Value>) -> Response {
    problem(
        StatusCode::BAD_REQUEST,
        json!({
            "type": "https://tools.ietf.org/html/rfc9110#section-15.5.1",
            "title": VALIDATION_TITLE,
            "status": 400,
            "errors": errors,
        }),
    )
}

/// Conversion failures also name the unbound request model, as ASP.NET does
fn conversion_error(model: &str, field: &str, target: &str) -> Response {
    let path = if field.is_empty() {
        "$".to_string()
    } else {
        format!("$.{field}")
    };
    let message = format!(
        "The JSON value could not be converted to {target}. \
         Path: {path} | LineNumber: 0 | BytePositionInLine: 0."
    );
    let mut errors = Map::new();
    errors.insert(
        model.to_string(),
        json!([format!("The {model} field is required.")]),
    );
    errors.insert(path, json!([message]));
    validation_error(errors)
}

fn problem(status: StatusCode, body: Value) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, PROBLEM_CONTENT_TYPE)],
        body.to_string(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn post(monitor: &MockMonitor, path: &str, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}{path}", monitor.base_url()))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_fetch_barrel() {
        let monitor = MockMonitor::start().await.unwrap();
        let created: Value = post(&monitor, "/barrels", json!({"qr": "a", "rfid": "b", "nfc": "c"}))
            .await
            .json()
            .await
            .unwrap();

        let id = created["id"].as_str().unwrap();
        let fetched: Value = reqwest::get(format!("{}/barrels/{id}", monitor.base_url()))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(created, fetched);
        assert_eq!(monitor.barrel_count(), 1);
    }

    #[tokio::test]
    async fn test_required_field_message() {
        let monitor = MockMonitor::start().await.unwrap();
        let response = post(&monitor, "/barrels", json!({"qr": "", "rfid": "b", "nfc": "c"})).await;
        assert_eq!(response.status(), 400);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["title"], VALIDATION_TITLE);
        assert_eq!(body["errors"]["Qr"][0], "Qr is required");
    }

    #[tokio::test]
    async fn test_wrong_type_is_conversion_error() {
        let monitor = MockMonitor::start().await.unwrap();
        let response = post(&monitor, "/barrels", json!({"qr": 1, "rfid": "b", "nfc": "c"})).await;
        let body: Value = response.json().await.unwrap();
        assert!(
            body["errors"]["$.qr"][0]
                .as_str()
                .unwrap()
                .contains("could not be converted")
        );
        assert_eq!(body["errors"]["barrel"][0], "The barrel field is required.");
    }

    #[tokio::test]
    async fn test_unsupported_content_type() {
        let monitor = MockMonitor::start().await.unwrap();
        let response = reqwest::Client::new()
            .post(format!("{}/barrels", monitor.base_url()))
            .header("content-type", "text/plain")
            .body("qr=a")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 415);
    }

    #[tokio::test]
    async fn test_put_is_method_not_allowed() {
        let monitor = MockMonitor::start().await.unwrap();
        let response = reqwest::Client::new()
            .put(format!("{}/barrels", monitor.base_url()))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 405);
    }

    #[tokio::test]
    async fn test_cascade_can_be_disabled() {
        let monitor = MockMonitor::start_with(MockBehavior {
            cascade_deletes: false,
            ..MockBehavior::default()
        })
        .await
        .unwrap();

        let barrel: Value = post(&monitor, "/barrels", json!({"qr": "a", "rfid": "b", "nfc": "c"}))
            .await
            .json()
            .await
            .unwrap();
        let response = post(
            &monitor,
            "/measurements",
            json!({"barrelId": barrel["id"], "dirtLevel": 1.5, "weight": 2.25}),
        )
        .await;
        assert_eq!(response.status(), 201);

        let id = barrel["id"].as_str().unwrap();
        let deleted = reqwest::Client::new()
            .delete(format!("{}/barrels/{id}", monitor.base_url()))
            .send()
            .await
            .unwrap();
        assert_eq!(deleted.status(), 204);
        assert_eq!(monitor.barrel_count(), 0);
        assert_eq!(monitor.measurement_count(), 1);
    }

    #[tokio::test]
    async fn test_measurement_for_unknown_barrel() {
        let monitor = MockMonitor::start().await.unwrap();
        let response = post(
            &monitor,
            "/measurements",
            json!({"barrelId": Uuid::new_v4().to_string(), "dirtLevel": 1.0, "weight": 1.0}),
        )
        .await;
        assert_eq!(response.status(), 404);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["title"], BARREL_NOT_FOUND_TITLE);
    }
}
