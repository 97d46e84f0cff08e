//! Closed set of vehicle operations and the request shape each one maps to.
//!
//! Every operation resolves to one of three shapes: a GET on a resource, a
//! POST carrying an `{"action": ...}` body, or a DELETE. `VehicleClient`
//! turns a shape into an `HttpRequest`.

use serde_json::{Map, Value};

use crate::types::{PagingOptions, PercentOpen};

/// A single API call against one vehicle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    Info,
    Vin,
    Location,
    Odometer,
    Permissions(PagingOptions),
    Disconnect,
    StartPanic,
    StopPanic,
    OpenSunroof { percent_open: PercentOpen },
    CloseSunroof,
    FlashHeadlights,
    Lock,
    Unlock,
}

/// The request shape an `Operation` maps to.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestShape {
    Get {
        /// Path below `/vehicles/{id}`; empty for the vehicle itself.
        resource: &'static str,
        unit_bearing: bool,
        query: Vec<(String, String)>,
    },
    PostAction {
        resource: &'static str,
        action: &'static str,
        params: Map<String, Value>,
    },
    Delete {
        resource: &'static str,
    },
}

impl Operation {
    /// Operation name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Info => "info",
            Operation::Vin => "vin",
            Operation::Location => "location",
            Operation::Odometer => "odometer",
            Operation::Permissions(_) => "permissions",
            Operation::Disconnect => "disconnect",
            Operation::StartPanic => "start_panic",
            Operation::StopPanic => "stop_panic",
            Operation::OpenSunroof { .. } => "open_sunroof",
            Operation::CloseSunroof => "close_sunroof",
            Operation::FlashHeadlights => "flash_headlights",
            Operation::Lock => "lock",
            Operation::Unlock => "unlock",
        }
    }

    pub fn shape(&self) -> RequestShape {
        match *self {
            Operation::Info => get("", false),
            Operation::Vin => get("vin", false),
            Operation::Location => get("location", false),
            Operation::Odometer => get("odometer", true),
            Operation::Permissions(paging) => RequestShape::Get {
                resource: "permissions",
                unit_bearing: false,
                query: paging.to_query(),
            },
            Operation::Disconnect => RequestShape::Delete { resource: "application" },
            Operation::StartPanic => action("panic", "START"),
            Operation::StopPanic => action("panic", "STOP"),
            Operation::OpenSunroof { percent_open } => {
                let mut params = Map::new();
                params.insert("percentOpen".to_string(), Value::from(percent_open.get()));
                RequestShape::PostAction { resource: "sunroof", action: "OPEN", params }
            }
            Operation::CloseSunroof => action("sunroof", "CLOSE"),
            Operation::FlashHeadlights => action("lights/headlights", "FLASH"),
            Operation::Lock => action("security", "LOCK"),
            Operation::Unlock => action("security", "UNLOCK"),
        }
    }
}

fn get(resource: &'static str, unit_bearing: bool) -> RequestShape {
    RequestShape::Get { resource, unit_bearing, query: Vec::new() }
}

fn action(resource: &'static str, action: &'static str) -> RequestShape {
    RequestShape::PostAction { resource, action, params: Map::new() }
}
