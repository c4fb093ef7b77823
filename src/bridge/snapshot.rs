//! One-shot BMC snapshot for `--test`: everything a poll cycle would read, nothing published.

use serde::Serialize;

use crate::bridge::discovery::{build_discovery, DiscoveryMessage};
use crate::error::Result;
use crate::hardware::types::{DeviceIdentity, PowerState, SensorReading};
use crate::hardware::HardwareAdapter;
use crate::mqtt::topics::Topics;
use crate::sensors::normalize;

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotReport {
    pub power: PowerState,
    pub identity: Option<DeviceIdentity>,
    pub readings: Vec<SensorReading>,
    pub discovery: Vec<DiscoveryMessage>,
}

/// Sensors and identity are only read while the server is powered on.
pub async fn run_snapshot(
    adapter: &dyn HardwareAdapter,
    topics: &Topics,
) -> Result<SnapshotReport> {
    let power = adapter.power_status().await?;
    if power != PowerState::On {
        return Ok(SnapshotReport {
            power,
            identity: None,
            readings: Vec::new(),
            discovery: Vec::new(),
        });
    }

    let identity = adapter.device_info().await?;
    let readings = normalize(&adapter.sensor_list().await?);
    let discovery = build_discovery(&identity, &readings, topics).descriptors;

    Ok(SnapshotReport {
        power,
        identity: Some(identity),
        readings,
        discovery,
    })
}
