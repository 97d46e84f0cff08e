//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type with C-compatible representations:
//! `*mut c_char` instead of `String`, pointer + length instead of `Vec`, and
//! tagged enums with explicit discriminants. Conversion and release helpers
//! live here so `lib.rs` stays focused on the `extern "C"` surface.

use std::ffi::{c_void, CStr, CString};
use std::os::raw::c_char;

use vehicle_core::{
    ActionStatus, HttpMethod, HttpRequest, HttpResponse, Location, Odometer, Permissions,
    UnitSystem, VehicleError, VehicleInfo, Vin,
};

/// Opaque handle to a `VehicleClient`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiVehicleClient {
    pub(crate) inner: vehicle_core::VehicleClient,
}

/// Copy `s` into a heap C string owned by the caller. Interior NULs are dropped.
pub(crate) fn to_c_string(s: impl Into<String>) -> *mut c_char {
    let mut s = s.into();
    s.retain(|c| c != '\0');
    CString::new(s).unwrap_or_default().into_raw()
}

/// Borrow a C string as `&str`. Null or invalid UTF-8 yields `None`.
///
/// # Safety
/// `ptr` must be null or point to a NUL-terminated string that outlives `'a`.
pub(crate) unsafe fn from_c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

/// Release a string produced by `to_c_string`. Null is ignored.
pub(crate) fn free_c_string(ptr: *mut c_char) {
    if !ptr.is_null() {
        drop(unsafe { CString::from_raw(ptr) });
    }
}

// ---------------------------------------------------------------------------
// Unit system
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiUnitSystem {
    Metric = 0,
    Imperial = 1,
}

impl From<UnitSystem> for FfiUnitSystem {
    fn from(u: UnitSystem) -> Self {
        match u {
            UnitSystem::Metric => FfiUnitSystem::Metric,
            UnitSystem::Imperial => FfiUnitSystem::Imperial,
        }
    }
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// HTTP method as a C enum.
#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Delete = 2,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Delete => FfiHttpMethod::Delete,
        }
    }
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// An HTTP request described as C-compatible plain data.
///
/// `url` already contains the query string. Built by `vehicle_build_*`; the
/// C caller executes it and passes the reply to the matching
/// `vehicle_parse_*`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
}

impl FfiHttpRequest {
    /// Convert a core `HttpRequest` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_core(req: HttpRequest) -> *mut Self {
        let url = to_c_string(req.full_url());
        let body = match req.body {
            Some(b) => to_c_string(b),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader { key: to_c_string(k), value: to_c_string(v) })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url,
            headers,
            headers_len,
            body,
        }))
    }

    /// Release everything `from_core` allocated.
    ///
    /// # Safety
    /// `ptr` must come from `from_core` and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let req = unsafe { Box::from_raw(ptr) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() && req.headers_len > 0 {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A response header supplied by the caller. Read, never freed, by this library.
#[repr(C)]
pub struct FfiResponseHeader {
    pub key: *const c_char,
    pub value: *const c_char,
}

/// An HTTP response described as C-compatible plain data.
///
/// The C caller builds this after executing a request and passes a pointer
/// to a `vehicle_parse_*` function. `headers` may be null when
/// `headers_len` is 0.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub headers: *const FfiResponseHeader,
    pub headers_len: u32,
    pub body: *const c_char,
}

impl FfiHttpResponse {
    /// Copy into a core `HttpResponse`. Entries with null or non-UTF-8
    /// strings are skipped; a null body reads as empty.
    pub(crate) fn to_core(&self) -> HttpResponse {
        let body = unsafe { from_c_str(self.body) }.unwrap_or("").to_string();
        let headers = if self.headers.is_null() || self.headers_len == 0 {
            Vec::new()
        } else {
            let raw = unsafe { std::slice::from_raw_parts(self.headers, self.headers_len as usize) };
            raw.iter()
                .filter_map(|h| {
                    let key = unsafe { from_c_str(h.key) }?;
                    let value = unsafe { from_c_str(h.value) }?;
                    Some((key.to_string(), value.to_string()))
                })
                .collect()
        };
        HttpResponse { status: self.status, headers, body }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Error codes returned in `FfiVehicleResult`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiErrorCode {
    Ok = 0,
    Api = 1,
    Validation = 2,
    Transport = 3,
    Deserialization = 4,
    Serialization = 5,
    Config = 6,
    Panic = 7,
    NullArg = 8,
}

/// Tag that tells `vehicle_free_result` what `FfiVehicleResult::data` points to.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiDataTag {
    None = 0,
    ActionStatus = 1,
    Odometer = 2,
    Permissions = 3,
    VehicleInfo = 4,
    Vin = 5,
    Location = 6,
}

#[repr(C)]
pub struct FfiActionStatus {
    pub status: *mut c_char,
}

/// `unit_system` is only meaningful when `has_unit_system` is true.
#[repr(C)]
pub struct FfiOdometer {
    pub distance: f64,
    pub has_unit_system: bool,
    pub unit_system: FfiUnitSystem,
}

#[repr(C)]
pub struct FfiPermissions {
    pub items: *mut *mut c_char,
    pub len: u32,
}

#[repr(C)]
pub struct FfiVehicleInfo {
    pub id: *mut c_char,
    pub make: *mut c_char,
    pub model: *mut c_char,
    pub year: u16,
}

#[repr(C)]
pub struct FfiVin {
    pub vin: *mut c_char,
}

#[repr(C)]
pub struct FfiLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Result envelope for parse operations and `vehicle_set_unit_system`.
///
/// On success `error_code` is `Ok`, `error_message` is null, and `data`
/// points to the payload tagged by `data_tag`. On failure `error_code`
/// describes the category, `error_message` is a human-readable C string,
/// `http_status` is set for `Api` errors, and `data` is null.
#[repr(C)]
pub struct FfiVehicleResult {
    pub error_code: FfiErrorCode,
    pub error_message: *mut c_char,
    pub http_status: u16,
    pub data_tag: FfiDataTag,
    pub data: *mut c_void,
}

impl FfiVehicleResult {
    fn ok<T>(data_tag: FfiDataTag, data: T) -> *mut Self {
        Box::into_raw(Box::new(FfiVehicleResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag,
            data: Box::into_raw(Box::new(data)) as *mut c_void,
        }))
    }

    fn err(error_code: FfiErrorCode, http_status: u16, msg: String) -> *mut Self {
        Box::into_raw(Box::new(FfiVehicleResult {
            error_code,
            error_message: to_c_string(msg),
            http_status,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    /// Success with no payload.
    pub(crate) fn ok_empty() -> *mut Self {
        Box::into_raw(Box::new(FfiVehicleResult {
            error_code: FfiErrorCode::Ok,
            error_message: std::ptr::null_mut(),
            http_status: 0,
            data_tag: FfiDataTag::None,
            data: std::ptr::null_mut(),
        }))
    }

    pub(crate) fn ok_action(status: ActionStatus) -> *mut Self {
        Self::ok(FfiDataTag::ActionStatus, FfiActionStatus { status: to_c_string(status.status) })
    }

    pub(crate) fn ok_odometer(odo: Odometer) -> *mut Self {
        let data = FfiOdometer {
            distance: odo.distance,
            has_unit_system: odo.unit_system.is_some(),
            unit_system: odo.unit_system.unwrap_or_default().into(),
        };
        Self::ok(FfiDataTag::Odometer, data)
    }

    pub(crate) fn ok_permissions(perms: Permissions) -> *mut Self {
        let len = perms.permissions.len() as u32;
        let items = if perms.permissions.is_empty() {
            std::ptr::null_mut()
        } else {
            let strings: Box<[*mut c_char]> =
                perms.permissions.into_iter().map(to_c_string).collect();
            Box::into_raw(strings) as *mut *mut c_char
        };
        Self::ok(FfiDataTag::Permissions, FfiPermissions { items, len })
    }

    pub(crate) fn ok_info(info: VehicleInfo) -> *mut Self {
        let data = FfiVehicleInfo {
            id: to_c_string(info.id),
            make: to_c_string(info.make),
            model: to_c_string(info.model),
            year: info.year,
        };
        Self::ok(FfiDataTag::VehicleInfo, data)
    }

    pub(crate) fn ok_vin(vin: Vin) -> *mut Self {
        Self::ok(FfiDataTag::Vin, FfiVin { vin: to_c_string(vin.vin) })
    }

    pub(crate) fn ok_location(loc: Location) -> *mut Self {
        Self::ok(FfiDataTag::Location, FfiLocation { latitude: loc.latitude, longitude: loc.longitude })
    }

    /// Build an error result from a `VehicleError`.
    pub(crate) fn from_error(err: VehicleError) -> *mut Self {
        let code = match &err {
            VehicleError::Api { .. } => FfiErrorCode::Api,
            VehicleError::Validation(_) => FfiErrorCode::Validation,
            VehicleError::Transport(_) => FfiErrorCode::Transport,
            VehicleError::Deserialization(_) => FfiErrorCode::Deserialization,
            VehicleError::Serialization(_) => FfiErrorCode::Serialization,
            VehicleError::Config(_) => FfiErrorCode::Config,
        };
        Self::err(code, err.status().unwrap_or(0), err.to_string())
    }

    pub(crate) fn null_arg(name: &str) -> *mut Self {
        Self::err(FfiErrorCode::NullArg, 0, format!("null argument: {name}"))
    }

    pub(crate) fn panic(msg: &str) -> *mut Self {
        Self::err(FfiErrorCode::Panic, 0, msg.to_string())
    }

    /// Release the envelope and whatever `data_tag` says `data` points to.
    ///
    /// # Safety
    /// `ptr` must come from one of the constructors above and not have been freed.
    pub(crate) unsafe fn free(ptr: *mut Self) {
        let result = unsafe { Box::from_raw(ptr) };
        free_c_string(result.error_message);
        if result.data.is_null() {
            return;
        }
        match result.data_tag {
            FfiDataTag::ActionStatus => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiActionStatus) };
                free_c_string(data.status);
            }
            FfiDataTag::Odometer => drop(unsafe { Box::from_raw(result.data as *mut FfiOdometer) }),
            FfiDataTag::Permissions => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiPermissions) };
                if !data.items.is_null() && data.len > 0 {
                    let slice = std::ptr::slice_from_raw_parts_mut(data.items, data.len as usize);
                    let items = unsafe { Box::from_raw(slice) };
                    for item in items.iter() {
                        free_c_string(*item);
                    }
                }
            }
            FfiDataTag::VehicleInfo => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiVehicleInfo) };
                free_c_string(data.id);
                free_c_string(data.make);
                free_c_string(data.model);
            }
            FfiDataTag::Vin => {
                let data = unsafe { Box::from_raw(result.data as *mut FfiVin) };
                free_c_string(data.vin);
            }
            FfiDataTag::Location => drop(unsafe { Box::from_raw(result.data as *mut FfiLocation) }),
            FfiDataTag::None => {}
        }
    }
}
