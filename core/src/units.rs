//! Unit system selection for unit-bearing reads.
//!
//! The API converts distances itself; the client only names the unit system
//! it wants through the `sc-unit-system` request header and passes numeric
//! values through untouched.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VehicleError;

/// Request header naming the unit system for unit-bearing reads. The API
/// echoes it on the response.
pub const UNIT_SYSTEM_HEADER: &str = "sc-unit-system";

/// Measurement convention requested for distance-like fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = VehicleError;

    /// Accepts exactly `metric` or `imperial`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(VehicleError::Validation(format!(
                "unit system must be one of 'metric' or 'imperial', got '{other}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_metric() {
        assert_eq!(UnitSystem::default(), UnitSystem::Metric);
    }

    #[test]
    fn valid_values_parse_and_display_back() {
        for unit in ["metric", "imperial"] {
            let parsed: UnitSystem = unit.parse().unwrap();
            assert_eq!(parsed.to_string(), unit);
        }
    }

    #[test]
    fn invalid_values_mention_unit() {
        for bad in ["", "Metric", "IMPERIAL", "si", "potato"] {
            let err = bad.parse::<UnitSystem>().unwrap_err();
            assert!(matches!(err, VehicleError::Validation(_)), "{bad}");
            assert!(err.to_string().contains("unit"), "{bad}: {err}");
        }
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&UnitSystem::Imperial).unwrap(), r#""imperial""#);
        let back: UnitSystem = serde_json::from_str(r#""metric""#).unwrap();
        assert_eq!(back, UnitSystem::Metric);
    }
}
