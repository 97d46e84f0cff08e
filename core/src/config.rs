//! Client configuration.
//!
//! Defaults target the production API. `from_env` lets hosts point the SDK
//! at another deployment (or the mock server) without code changes.

use std::time::Duration;

use url::Url;

use crate::error::{Result, VehicleError};
use crate::units::UnitSystem;

/// Production API root, including the version segment.
pub const DEFAULT_BASE_URL: &str = "https://api.smartcar.com/v1.0";

/// `User-Agent` sent with every request: `<sdk-name>:<version>`.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), ":", env!("CARGO_PKG_VERSION"));

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings shared by every handle built from it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    /// API root such as `https://api.smartcar.com/v1.0`, without trailing slash.
    pub base_url: String,
    pub user_agent: String,
    /// Unit system new handles start with.
    pub unit_system: UnitSystem,
    /// Total request timeout applied by `ReqwestTransport`.
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            unit_system: UnitSystem::default(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Config for `base_url` with every other field defaulted.
    pub fn with_base_url(base_url: &str) -> Result<Self> {
        Ok(Self { base_url: normalize_base_url(base_url)?, ..Self::default() })
    }

    /// Read overrides from the environment.
    ///
    /// - `VEHICLE_API_URL`: API root
    /// - `VEHICLE_API_TIMEOUT_SECS`: request timeout in whole seconds
    /// - `VEHICLE_UNIT_SYSTEM`: `metric` or `imperial`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(url) = lookup("VEHICLE_API_URL") {
            config.base_url = normalize_base_url(&url)?;
        }
        if let Some(secs) = lookup("VEHICLE_API_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                VehicleError::Config(format!("VEHICLE_API_TIMEOUT_SECS is not a number: '{secs}'"))
            })?;
            if secs == 0 {
                return Err(VehicleError::Config(
                    "VEHICLE_API_TIMEOUT_SECS must be greater than zero".to_string(),
                ));
            }
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(unit) = lookup("VEHICLE_UNIT_SYSTEM") {
            config.unit_system = unit.trim().parse()?;
        }
        Ok(config)
    }
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    let parsed = Url::parse(trimmed)?;
    if parsed.cannot_be_a_base() {
        return Err(VehicleError::Config(format!("base url cannot be a base: '{raw}'")));
    }
    Ok(trimmed.to_string())
}
