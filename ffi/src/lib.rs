//! C-ABI wrapper around `vehicle-core`.
//!
//! # Overview
//! Exposes the vehicle request builder and response parser through
//! `extern "C"` functions so any language with a C FFI can drive the
//! telematics API with its own HTTP stack.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - `vehicle_build_*` / `vehicle_parse_*` mirror the core API 1:1.
//! - A single `FfiVehicleResult` envelope with `FfiDataTag` + `void* data`
//!   conveys success payloads and errors uniformly.
//! - The C caller owns all returned pointers and must call the matching
//!   `vehicle_free_*` function to release them.

pub mod types;

use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};

use vehicle_core::{HttpRequest, HttpResponse, PagingOptions, PercentOpen, UnitSystem, VehicleClient};

use types::*;

// ---------------------------------------------------------------------------
// Client lifecycle
// ---------------------------------------------------------------------------

/// Create a client for vehicle `id` at `base_url`, authenticating with `token`.
///
/// `unit_system` may be null (metric) or `"metric"` / `"imperial"`.
/// Returns null if any other argument is null, if `unit_system` is not a
/// valid unit system, or if an internal panic occurs. The caller must free
/// the returned pointer with `vehicle_client_free`.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_client_new(
    base_url: *const c_char,
    id: *const c_char,
    token: *const c_char,
    unit_system: *const c_char,
) -> *mut FfiVehicleClient {
    catch_unwind(|| {
        let (Some(url), Some(id), Some(token)) =
            (unsafe { from_c_str(base_url) }, unsafe { from_c_str(id) }, unsafe { from_c_str(token) })
        else {
            return std::ptr::null_mut();
        };
        let unit = if unit_system.is_null() {
            UnitSystem::default()
        } else {
            match unsafe { from_c_str(unit_system) }.map(str::parse::<UnitSystem>) {
                Some(Ok(unit)) => unit,
                _ => return std::ptr::null_mut(),
            }
        };
        let client = VehicleClient::new(url, id, token).with_unit_system(unit);
        Box::into_raw(Box::new(FfiVehicleClient { inner: client }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a client created by `vehicle_client_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_client_free(client: *mut FfiVehicleClient) {
    if !client.is_null() {
        let _ = catch_unwind(|| {
            drop(unsafe { Box::from_raw(client) });
        });
    }
}

/// Change the unit system used by requests built after this call.
///
/// Returns a result with `error_code = Validation` when `unit_system` is
/// not `"metric"` or `"imperial"`; the client is left unchanged.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_set_unit_system(
    client: *mut FfiVehicleClient,
    unit_system: *const c_char,
) -> *mut FfiVehicleResult {
    catch_unwind(|| {
        if client.is_null() {
            return FfiVehicleResult::null_arg("client");
        }
        let Some(raw) = (unsafe { from_c_str(unit_system) }) else {
            return FfiVehicleResult::null_arg("unit_system");
        };
        match raw.parse::<UnitSystem>() {
            Ok(unit) => {
                let client = unsafe { &mut *client };
                client.inner.set_unit_system(unit);
                FfiVehicleResult::ok_empty()
            }
            Err(e) => FfiVehicleResult::from_error(e),
        }
    })
    .unwrap_or_else(|_| FfiVehicleResult::panic("panic in vehicle_set_unit_system"))
}

/// Current unit system. A null client reads as metric.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_get_unit_system(client: *const FfiVehicleClient) -> FfiUnitSystem {
    if client.is_null() {
        return FfiUnitSystem::Metric;
    }
    let client = unsafe { &*client };
    client.inner.unit_system().into()
}

// ---------------------------------------------------------------------------
// Build request functions
// ---------------------------------------------------------------------------

/// Run `build` against the client, returning null on null client, build
/// error or panic.
fn build_with(
    client: *const FfiVehicleClient,
    build: impl FnOnce(&VehicleClient) -> vehicle_core::Result<HttpRequest>,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return std::ptr::null_mut();
        }
        let client = unsafe { &*client };
        match build(&client.inner) {
            Ok(req) => FfiHttpRequest::from_core(req),
            Err(_) => std::ptr::null_mut(),
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Build a request for the vehicle's make, model and year.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_info(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_info)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_vin(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_vin)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_location(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_location)
}

/// Build an odometer read tagged with the client's current unit system.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_odometer(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_odometer)
}

/// Build a permissions listing. Negative `limit` / `offset` are omitted.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_permissions(
    client: *const FfiVehicleClient,
    limit: i64,
    offset: i64,
) -> *mut FfiHttpRequest {
    let paging = PagingOptions {
        limit: u32::try_from(limit).ok(),
        offset: u32::try_from(offset).ok(),
    };
    build_with(client, |c| c.build_permissions(paging))
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_disconnect(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_disconnect)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_start_panic(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_start_panic)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_stop_panic(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_stop_panic)
}

/// Returns null if `percent_open` is outside `0.0..=1.0`; call
/// `vehicle_check_percent_open` for the reason.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_open_sunroof(
    client: *const FfiVehicleClient,
    percent_open: f64,
) -> *mut FfiHttpRequest {
    build_with(client, |c| c.build_open_sunroof(percent_open))
}

/// Validate a sunroof fraction without building a request.
///
/// Returns `error_code = Validation` with a message when `percent_open` is
/// outside `0.0..=1.0`, `Ok` otherwise.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_check_percent_open(percent_open: f64) -> *mut FfiVehicleResult {
    catch_unwind(|| match PercentOpen::new(percent_open) {
        Ok(_) => FfiVehicleResult::ok_empty(),
        Err(e) => FfiVehicleResult::from_error(e),
    })
    .unwrap_or_else(|_| FfiVehicleResult::panic("panic in vehicle_check_percent_open"))
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_close_sunroof(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_close_sunroof)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_flash_headlights(
    client: *const FfiVehicleClient,
) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_flash_headlights)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_lock(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_lock)
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_build_unlock(client: *const FfiVehicleClient) -> *mut FfiHttpRequest {
    build_with(client, VehicleClient::build_unlock)
}

// ---------------------------------------------------------------------------
// Parse response functions
// ---------------------------------------------------------------------------

/// Check arguments, convert the response and hand both to `parse`.
fn parse_with(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
    name: &str,
    parse: impl FnOnce(&VehicleClient, HttpResponse) -> *mut FfiVehicleResult,
) -> *mut FfiVehicleResult {
    catch_unwind(AssertUnwindSafe(|| {
        if client.is_null() {
            return FfiVehicleResult::null_arg("client");
        }
        if response.is_null() {
            return FfiVehicleResult::null_arg("response");
        }
        let client = unsafe { &*client };
        let resp = unsafe { &*response };
        parse(&client.inner, resp.to_core())
    }))
    .unwrap_or_else(|_| FfiVehicleResult::panic(&format!("panic in {name}")))
}

/// Parse the reply to any action command or to a disconnect.
///
/// Returns a result with `data_tag = ActionStatus` on success.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_action(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_action", |c, r| match c.parse_action(r) {
        Ok(status) => FfiVehicleResult::ok_action(status),
        Err(e) => FfiVehicleResult::from_error(e),
    })
}

/// Returns a result with `data_tag = Odometer` on success. The distance is
/// exactly the value the API returned.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_odometer(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_odometer", |c, r| match c.parse_odometer(r) {
        Ok(odo) => FfiVehicleResult::ok_odometer(odo),
        Err(e) => FfiVehicleResult::from_error(e),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_permissions(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_permissions", |c, r| {
        match c.parse_permissions(r) {
            Ok(perms) => FfiVehicleResult::ok_permissions(perms),
            Err(e) => FfiVehicleResult::from_error(e),
        }
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_info(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_info", |c, r| match c.parse_info(r) {
        Ok(info) => FfiVehicleResult::ok_info(info),
        Err(e) => FfiVehicleResult::from_error(e),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_vin(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_vin", |c, r| match c.parse_vin(r) {
        Ok(vin) => FfiVehicleResult::ok_vin(vin),
        Err(e) => FfiVehicleResult::from_error(e),
    })
}

#[unsafe(no_mangle)]
pub extern "C" fn vehicle_parse_location(
    client: *const FfiVehicleClient,
    response: *const FfiHttpResponse,
) -> *mut FfiVehicleResult {
    parse_with(client, response, "vehicle_parse_location", |c, r| match c.parse_location(r) {
        Ok(loc) => FfiVehicleResult::ok_location(loc),
        Err(e) => FfiVehicleResult::from_error(e),
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any `vehicle_build_*` function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
}

/// Free a result returned by any `vehicle_parse_*` function or by
/// `vehicle_set_unit_system`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_free_result(result: *mut FfiVehicleResult) {
    if result.is_null() {
        return;
    }
    let _ = catch_unwind(|| unsafe { FfiVehicleResult::free(result) });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn vehicle_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
