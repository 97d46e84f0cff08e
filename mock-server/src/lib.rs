//! In-memory emulation of the vehicle telematics API.
//!
//! Serves the `/v1.0/vehicles/{id}/...` routes the SDK talks to. Odometer
//! readings depend on the `sc-unit-system` request header (2.71 metric,
//! 3.14 imperial), permissions honour `limit`/`offset`, and a disconnected
//! vehicle rejects every later call with 401.

use std::{collections::HashSet, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const METRIC_DISTANCE: f64 = 2.71;
pub const IMPERIAL_DISTANCE: f64 = 3.14;
pub const PERMISSIONS: [&str; 3] = ["read_vehicle_info", "read_odometer", "control_security"];

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Odometer {
    pub distance: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Permissions {
    pub permissions: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Info {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub request_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionBody {
    pub action: String,
    pub percent_open: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Paging {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Ids of vehicles whose application access was revoked.
pub type Disconnected = Arc<RwLock<HashSet<String>>>;

pub fn app() -> Router {
    let disconnected: Disconnected = Arc::new(RwLock::new(HashSet::new()));
    Router::new()
        .route("/v1.0/vehicles/{id}", get(info))
        .route("/v1.0/vehicles/{id}/vin", get(vin))
        .route("/v1.0/vehicles/{id}/location", get(location))
        .route("/v1.0/vehicles/{id}/odometer", get(odometer))
        .route("/v1.0/vehicles/{id}/permissions", get(permissions))
        .route("/v1.0/vehicles/{id}/panic", post(panic_alarm))
        .route("/v1.0/vehicles/{id}/sunroof", post(sunroof))
        .route("/v1.0/vehicles/{id}/lights/headlights", post(headlights))
        .route("/v1.0/vehicles/{id}/security", post(security))
        .route("/v1.0/vehicles/{id}/application", axum::routing::delete(disconnect))
        .with_state(disconnected)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, code: &str, message: &str, description: Option<&str>) -> Response {
    let body = ErrorBody {
        error: code.to_string(),
        message: message.to_string(),
        description: description.map(str::to_string),
        request_id: Uuid::new_v4(),
    };
    (status, Json(body)).into_response()
}

/// Reject requests without a bearer token, or for a disconnected vehicle.
async fn authorize(headers: &HeaderMap, id: &str, disconnected: &Disconnected) -> Result<(), Response> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty());
    if token.is_none() {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            "authentication_error",
            "Invalid or expired token provided.",
            None,
        ));
    }
    if disconnected.read().await.contains(id) {
        return Err(error(
            StatusCode::UNAUTHORIZED,
            "authentication_error",
            "Vehicle access has been revoked.",
            Some("The application was disconnected from this vehicle."),
        ));
    }
    Ok(())
}

fn success() -> Response {
    Json(Status { status: "success".to_string() }).into_response()
}

async fn info(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    Json(Info { id, make: "TESLA".to_string(), model: "Model S".to_string(), year: 2014 })
        .into_response()
}

async fn vin(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    Json(serde_json::json!({ "vin": "5YJSA1E20FF101307" })).into_response()
}

async fn location(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    Json(serde_json::json!({ "latitude": 37.4292, "longitude": 122.1381 })).into_response()
}

async fn odometer(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    let unit = headers
        .get("sc-unit-system")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("metric");
    let (distance, echoed) = match unit {
        "metric" => (METRIC_DISTANCE, "metric"),
        "imperial" => (IMPERIAL_DISTANCE, "imperial"),
        other => {
            return error(
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Invalid unit system.",
                Some(&format!("sc-unit-system must be 'metric' or 'imperial', got '{other}'")),
            )
        }
    };
    tracing::debug!(%id, unit, distance, "odometer read");
    let mut resp = Json(Odometer { distance }).into_response();
    resp.headers_mut().insert("sc-unit-system", HeaderValue::from_static(echoed));
    resp
}

async fn permissions(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    Query(paging): Query<Paging>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    let offset = paging.offset.unwrap_or(0);
    let limit = paging.limit.unwrap_or(PERMISSIONS.len());
    let permissions = PERMISSIONS
        .iter()
        .skip(offset)
        .take(limit)
        .map(|p| p.to_string())
        .collect();
    Json(Permissions { permissions }).into_response()
}

/// Accept `body.action` if it is one of `allowed`, otherwise 400.
fn check_action(body: &ActionBody, allowed: &[&str]) -> Result<(), Response> {
    if allowed.contains(&body.action.as_str()) {
        return Ok(());
    }
    Err(error(
        StatusCode::BAD_REQUEST,
        "validation_error",
        "Invalid action.",
        Some(&format!("action must be one of {allowed:?}, got '{}'", body.action)),
    ))
}

async fn panic_alarm(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ActionBody>,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    match check_action(&body, &["START", "STOP"]) {
        Ok(()) => success(),
        Err(resp) => resp,
    }
}

async fn sunroof(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ActionBody>,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    if let Err(resp) = check_action(&body, &["OPEN", "CLOSE"]) {
        return resp;
    }
    if body.action == "OPEN" {
        match body.percent_open {
            Some(p) if (0.0..=1.0).contains(&p) => {}
            _ => {
                return error(
                    StatusCode::BAD_REQUEST,
                    "validation_error",
                    "percentOpen is required for OPEN and must be between 0 and 1.",
                    None,
                )
            }
        }
    }
    success()
}

async fn headlights(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ActionBody>,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    match check_action(&body, &["FLASH"]) {
        Ok(()) => success(),
        Err(resp) => resp,
    }
}

async fn security(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<ActionBody>,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    match check_action(&body, &["LOCK", "UNLOCK"]) {
        Ok(()) => success(),
        Err(resp) => resp,
    }
}

async fn disconnect(
    State(disconnected): State<Disconnected>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = authorize(&headers, &id, &disconnected).await {
        return resp;
    }
    tracing::info!(%id, "vehicle disconnected");
    disconnected.write().await.insert(id);
    success()
}
