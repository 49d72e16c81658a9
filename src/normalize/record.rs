//! Observation record types shared by the fetch clients and the normalizer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A station measurement variable, identified by its short GHCN-style code.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Variable {
    /// Daily maximum temperature (`TMAX`).
    Tmax,
    /// Daily minimum temperature (`TMIN`).
    Tmin,
    /// Any other station field, carried by its raw code (e.g. `PRCP`).
    Other(String),
}

impl Variable {
    /// The provider code for this variable.
    pub fn code(&self) -> &str {
        match self {
            Variable::Tmax => "TMAX",
            Variable::Tmin => "TMIN",
            Variable::Other(code) => code,
        }
    }

    /// Parses a provider code. Unknown codes are preserved as [`Variable::Other`].
    pub fn from_code(code: &str) -> Variable {
        match code {
            "TMAX" => Variable::Tmax,
            "TMIN" => Variable::Tmin,
            other => Variable::Other(other.to_string()),
        }
    }

    /// Temperature variables arrive in tenths of a degree Celsius and get
    /// converted to the configured unit; everything else passes through raw.
    pub(crate) fn is_temperature(&self) -> bool {
        matches!(self, Variable::Tmax | Variable::Tmin)
    }
}

impl From<String> for Variable {
    fn from(code: String) -> Self {
        Variable::from_code(&code)
    }
}

impl From<Variable> for String {
    fn from(variable: Variable) -> Self {
        variable.code().to_string()
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One raw observation as delivered by a provider, before any validation.
///
/// Deserializes directly from a CDO `/data` result row; the `date` stays a
/// string until the normalizer parses and validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawObservation {
    /// ISO-8601 calendar date string, possibly with a `T00:00:00` suffix.
    pub date: String,
    /// Measured variable code.
    #[serde(rename = "datatype")]
    pub variable: Variable,
    /// Measured value in provider units (tenths of °C for temperatures).
    pub value: f64,
    /// Provider station identifier, when the feed carries one.
    #[serde(default)]
    pub station: Option<String>,
}

/// An observation with its date validated and projected onto the aligned
/// day-of-year axis, and its value converted to the configured unit.
///
/// Derived deterministically from a [`RawObservation`]; never edited after
/// construction. No record ever has `month == 2 && day == 29`, and `doy` is
/// always in `1..=365`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedRecord {
    pub date: NaiveDate,
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub doy: u16,
    pub variable: Variable,
    pub value: f64,
}

/// Target unit for temperature variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TemperatureUnit {
    /// Degrees Fahrenheit. The default, matching the historical output files.
    #[default]
    Fahrenheit,
    /// Degrees Celsius.
    Celsius,
}

impl TemperatureUnit {
    /// Converts a provider value in tenths of a degree Celsius.
    pub fn from_tenths_celsius(self, tenths: f64) -> f64 {
        let celsius = tenths / 10.0;
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variable_codes_round_trip() {
        for code in ["TMAX", "TMIN", "PRCP", "SNOW"] {
            assert_eq!(Variable::from_code(code).code(), code);
        }
        assert_eq!(Variable::from_code("TMAX"), Variable::Tmax);
        assert_eq!(Variable::from_code("TMIN"), Variable::Tmin);
    }

    #[test]
    fn deserializes_a_cdo_result_row() {
        let json = r#"{
            "date": "1948-07-01T00:00:00",
            "datatype": "TMAX",
            "station": "GHCND:USC00044715",
            "attributes": ",,0,2400",
            "value": 217
        }"#;
        let obs: RawObservation = serde_json::from_str(json).unwrap();
        assert_eq!(obs.variable, Variable::Tmax);
        assert_eq!(obs.value, 217.0);
        assert_eq!(obs.station.as_deref(), Some("GHCND:USC00044715"));
    }

    #[test]
    fn tenths_celsius_conversion() {
        assert_eq!(TemperatureUnit::Fahrenheit.from_tenths_celsius(150.0), 59.0);
        assert_eq!(TemperatureUnit::Celsius.from_tenths_celsius(150.0), 15.0);
        assert_eq!(TemperatureUnit::Fahrenheit.from_tenths_celsius(0.0), 32.0);
        assert_eq!(TemperatureUnit::Fahrenheit.from_tenths_celsius(-400.0), -40.0);
    }
}
