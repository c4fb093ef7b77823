//! Hardware data types: power state, raw SDR rows, FRU identity, fan mode, normalized readings.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Result of a chassis power status query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerState {
    /// No IPMI session could be established with the BMC.
    Unreachable,
    Off,
    On,
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Unreachable => write!(f, "unreachable"),
            PowerState::Off => write!(f, "off"),
            PowerState::On => write!(f, "on"),
        }
    }
}

/// One line of `ipmitool -c sdr elist all`, label and reading only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSensorRow {
    pub label: String,
    pub reading: String,
}

impl RawSensorRow {
    pub fn new(label: impl Into<String>, reading: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            reading: reading.into(),
        }
    }
}

/// FRU product fields of the managed server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentity {
    pub manufacturer: String,
    pub model: String,
    pub serial: String,
    pub host: String,
}

/// BMC fan control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FanMode {
    Auto,
    Manual,
}

impl FanMode {
    /// "auto" selects automatic control, anything else manual.
    pub fn from_payload(payload: &str) -> Self {
        if payload.trim().eq_ignore_ascii_case("auto") {
            FanMode::Auto
        } else {
            FanMode::Manual
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FanMode::Auto => "auto",
            FanMode::Manual => "manual",
        }
    }
}

/// Fan duty cycle, guaranteed to be within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct FanPercent(u8);

impl FanPercent {
    pub const FULL: FanPercent = FanPercent(100);

    pub fn value(&self) -> u8 {
        self.0
    }

    /// Parse an MQTT payload such as "45".
    pub fn from_payload(payload: &str) -> Result<Self, ValidationError> {
        let trimmed = payload.trim();
        let value: i64 = trimmed
            .parse()
            .map_err(|_| ValidationError::NotAnInteger(trimmed.to_string()))?;
        Self::try_from(value)
    }
}

impl TryFrom<i64> for FanPercent {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if (0..=100).contains(&value) {
            Ok(FanPercent(value as u8))
        } else {
            Err(ValidationError::PercentOutOfRange(value))
        }
    }
}

impl From<FanPercent> for u8 {
    fn from(percent: FanPercent) -> Self {
        percent.0
    }
}

impl fmt::Display for FanPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed set of sensor categories the bridge republishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorCategory {
    Fan,
    Temperature,
    Power,
}

/// Numeric reading. Fans and power stay integral, temperatures are converted to °F.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SensorValue {
    Integer(i64),
    Decimal(f64),
}

impl fmt::Display for SensorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SensorValue::Integer(v) => write!(f, "{}", v),
            SensorValue::Decimal(v) => write!(f, "{:.2}", v),
        }
    }
}

/// Normalized sensor reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Topic-safe identifier, also the suffix of the discovery unique id.
    pub name: String,
    /// Human readable name shown in Home Assistant.
    pub label: String,
    pub value: SensorValue,
    pub category: SensorCategory,
}
