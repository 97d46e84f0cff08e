//! Client core for a vehicle telematics REST API.
//!
//! # Overview
//! `VehicleClient` builds `HttpRequest` values and parses `HttpResponse`
//! values without touching the network (host-does-IO pattern), so it can be
//! driven from C through the FFI crate or from any HTTP stack. `Vehicle`
//! wraps it with an async `Transport` for Rust callers.
//!
//! # Design
//! - Operations are a closed enum mapped to three request shapes: GET,
//!   POST with an `{"action": ...}` body, and DELETE.
//! - Unit-bearing reads carry the `sc-unit-system` header; the API does the
//!   conversion and the client passes numbers through unchanged.
//! - Non-2xx replies become `VehicleError::Api`; failures before a reply
//!   become `VehicleError::Transport`.
//!
//! ```rust,no_run
//! use vehicle_core::{PagingOptions, UnitSystem, Vehicle};
//!
//! # async fn run() -> vehicle_core::Result<()> {
//! let mut vehicle = Vehicle::new("36ab27d0-fd9d-4455-823a-ce30af709ffc", "access-token")?;
//! let metric = vehicle.odometer().await?;
//! vehicle.set_unit_system(UnitSystem::Imperial);
//! let imperial = vehicle.odometer().await?;
//! let first = vehicle.permissions(PagingOptions::limit(1)).await?;
//! # let _ = (metric, imperial, first);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod operation;
pub mod transport;
pub mod types;
pub mod units;
pub mod vehicle;

pub use client::VehicleClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, USER_AGENT};
pub use error::{Result, VehicleError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use operation::{Operation, RequestShape};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    ActionStatus, Location, Odometer, PagingOptions, PercentOpen, Permissions, VehicleInfo, Vin,
};
pub use units::{UnitSystem, UNIT_SYSTEM_HEADER};
pub use vehicle::Vehicle;
