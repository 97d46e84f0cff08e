//! Request builder and response mapper for one vehicle.
//!
//! # Design
//! `VehicleClient` holds the vehicle id, the bearer token and the unit
//! system, and never performs I/O. Each operation is split into a `build_*`
//! method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The unit system is read when a request is
//! built, so a change through `set_unit_system` affects the next build only.

use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::config::{ClientConfig, USER_AGENT};
use crate::error::{Result, VehicleError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::operation::{Operation, RequestShape};
use crate::types::{
    ActionStatus, Location, Odometer, PagingOptions, PercentOpen, Permissions, VehicleInfo, Vin,
};
use crate::units::{UnitSystem, UNIT_SYSTEM_HEADER};

/// Synchronous, I/O-free client for a single vehicle.
#[derive(Clone)]
pub struct VehicleClient {
    base_url: String,
    user_agent: String,
    id: String,
    token: String,
    unit_system: UnitSystem,
}

impl fmt::Debug for VehicleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleClient")
            .field("base_url", &self.base_url)
            .field("id", &self.id)
            .field("token", &"<redacted>")
            .field("unit_system", &self.unit_system)
            .finish()
    }
}

impl VehicleClient {
    /// Client for vehicle `id` against `base_url`, using the metric system.
    pub fn new(base_url: &str, id: &str, token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: USER_AGENT.to_string(),
            id: id.to_string(),
            token: token.to_string(),
            unit_system: UnitSystem::default(),
        }
    }

    /// Client taking base URL, user agent and initial unit system from `config`.
    pub fn from_config(config: &ClientConfig, id: &str, token: &str) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            user_agent: config.user_agent.clone(),
            id: id.to_string(),
            token: token.to_string(),
            unit_system: config.unit_system,
        }
    }

    pub fn with_unit_system(mut self, unit_system: UnitSystem) -> Self {
        self.unit_system = unit_system;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn unit_system(&self) -> UnitSystem {
        self.unit_system
    }

    pub fn set_unit_system(&mut self, unit_system: UnitSystem) {
        self.unit_system = unit_system;
    }

    /// Build the request for any operation.
    pub fn build(&self, operation: &Operation) -> Result<HttpRequest> {
        match operation.shape() {
            RequestShape::Get { resource, unit_bearing, query } => {
                let mut headers = self.base_headers();
                if unit_bearing {
                    headers.push((UNIT_SYSTEM_HEADER.to_string(), self.unit_system.to_string()));
                }
                Ok(HttpRequest {
                    method: HttpMethod::Get,
                    url: self.resource_url(resource),
                    query,
                    headers,
                    body: None,
                })
            }
            RequestShape::PostAction { resource, action, params } => {
                let mut body = Map::new();
                body.insert("action".to_string(), Value::from(action));
                body.extend(params);
                let body = serde_json::to_string(&body)
                    .map_err(|e| VehicleError::Serialization(e.to_string()))?;

                let mut headers = self.base_headers();
                headers.push(("Content-Type".to_string(), "application/json".to_string()));
                Ok(HttpRequest {
                    method: HttpMethod::Post,
                    url: self.resource_url(resource),
                    query: Vec::new(),
                    headers,
                    body: Some(body),
                })
            }
            RequestShape::Delete { resource } => Ok(HttpRequest {
                method: HttpMethod::Delete,
                url: self.resource_url(resource),
                query: Vec::new(),
                headers: self.base_headers(),
                body: None,
            }),
        }
    }

    pub fn build_info(&self) -> Result<HttpRequest> {
        self.build(&Operation::Info)
    }

    pub fn build_vin(&self) -> Result<HttpRequest> {
        self.build(&Operation::Vin)
    }

    pub fn build_location(&self) -> Result<HttpRequest> {
        self.build(&Operation::Location)
    }

    pub fn build_odometer(&self) -> Result<HttpRequest> {
        self.build(&Operation::Odometer)
    }

    pub fn build_permissions(&self, paging: PagingOptions) -> Result<HttpRequest> {
        self.build(&Operation::Permissions(paging))
    }

    pub fn build_disconnect(&self) -> Result<HttpRequest> {
        self.build(&Operation::Disconnect)
    }

    pub fn build_start_panic(&self) -> Result<HttpRequest> {
        self.build(&Operation::StartPanic)
    }

    pub fn build_stop_panic(&self) -> Result<HttpRequest> {
        self.build(&Operation::StopPanic)
    }

    /// `percent_open` must lie in `0.0..=1.0`.
    pub fn build_open_sunroof(&self, percent_open: f64) -> Result<HttpRequest> {
        let percent_open = PercentOpen::new(percent_open)?;
        self.build(&Operation::OpenSunroof { percent_open })
    }

    pub fn build_close_sunroof(&self) -> Result<HttpRequest> {
        self.build(&Operation::CloseSunroof)
    }

    pub fn build_flash_headlights(&self) -> Result<HttpRequest> {
        self.build(&Operation::FlashHeadlights)
    }

    pub fn build_lock(&self) -> Result<HttpRequest> {
        self.build(&Operation::Lock)
    }

    pub fn build_unlock(&self) -> Result<HttpRequest> {
        self.build(&Operation::Unlock)
    }

    /// Parse the reply to any action command or to a disconnect.
    pub fn parse_action(&self, response: HttpResponse) -> Result<ActionStatus> {
        parse_json(response)
    }

    pub fn parse_info(&self, response: HttpResponse) -> Result<VehicleInfo> {
        parse_json(response)
    }

    pub fn parse_vin(&self, response: HttpResponse) -> Result<Vin> {
        parse_json(response)
    }

    pub fn parse_location(&self, response: HttpResponse) -> Result<Location> {
        parse_json(response)
    }

    /// The distance is returned exactly as the API sent it.
    pub fn parse_odometer(&self, response: HttpResponse) -> Result<Odometer> {
        let echoed = response
            .header(UNIT_SYSTEM_HEADER)
            .and_then(|value| value.parse::<UnitSystem>().ok());
        let mut odometer: Odometer = parse_json(response)?;
        odometer.unit_system = echoed;
        Ok(odometer)
    }

    pub fn parse_permissions(&self, response: HttpResponse) -> Result<Permissions> {
        parse_json(response)
    }

    fn resource_url(&self, resource: &str) -> String {
        if resource.is_empty() {
            format!("{}/vehicles/{}", self.base_url, self.id)
        } else {
            format!("{}/vehicles/{}/{resource}", self.base_url, self.id)
        }
    }

    fn base_headers(&self) -> Vec<(String, String)> {
        vec![
            ("Authorization".to_string(), format!("Bearer {}", self.token)),
            ("User-Agent".to_string(), self.user_agent.clone()),
        ]
    }
}

/// Map non-2xx replies to `VehicleError::Api`, otherwise deserialize the body.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| VehicleError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }
    let err = VehicleError::from_response(response.status, &response.body);
    warn!(status = response.status, error = %err, "vehicle API returned an error");
    Err(err)
}
