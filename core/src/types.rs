//! Domain DTOs for the telematics API.
//!
//! # Design
//! Response types are passed through from the API body as-is; no numeric
//! field is rescaled on the client. The mock-server crate defines its own
//! copies of these shapes and the integration tests catch any drift.

use serde::{Deserialize, Serialize};

use crate::error::{Result, VehicleError};
use crate::units::UnitSystem;

/// Result of an action command or a disconnect.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionStatus {
    pub status: String,
}

impl ActionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Odometer reading in the unit system the request asked for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Odometer {
    pub distance: f64,
    /// Unit system echoed by the API in the `sc-unit-system` response header.
    #[serde(skip)]
    pub unit_system: Option<UnitSystem>,
}

/// Permissions granted to the application for this vehicle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Permissions {
    pub permissions: Vec<String>,
}

/// Optional paging for listing calls. Unset fields are not sent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PagingOptions {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PagingOptions {
    pub fn limit(limit: u32) -> Self {
        Self { limit: Some(limit), offset: None }
    }

    pub(crate) fn to_query(self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            query.push(("offset".to_string(), offset.to_string()));
        }
        query
    }
}

/// Sunroof opening as a fraction, checked to lie in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct PercentOpen(f64);

impl PercentOpen {
    pub fn new(fraction: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(VehicleError::Validation(format!(
                "percentOpen must be between 0.0 and 1.0, got {fraction}"
            )));
        }
        Ok(Self(fraction))
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for PercentOpen {
    type Error = VehicleError;

    fn try_from(fraction: f64) -> Result<Self> {
        Self::new(fraction)
    }
}

/// Static vehicle attributes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VehicleInfo {
    pub id: String,
    pub make: String,
    pub model: String,
    pub year: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vin {
    pub vin: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}
