//! HardwareAdapter trait definition and IPMI implementation.

use async_trait::async_trait;

pub mod ipmi;
pub mod types;

pub use ipmi::ipmi_adapter::IpmiAdapter;

use crate::error::AdapterError;
use types::{DeviceIdentity, FanMode, FanPercent, PowerState, RawSensorRow};

/// Management calls against the one BMC this bridge serves.
/// Each call is a single external invocation; retries belong to the caller.
#[async_trait]
pub trait HardwareAdapter: Send + Sync {
    /// Chassis power state, distinguishing an unreachable BMC from a powered-off server.
    async fn power_status(&self) -> Result<PowerState, AdapterError>;

    /// Raw SDR rows in BMC order.
    async fn sensor_list(&self) -> Result<Vec<RawSensorRow>, AdapterError>;

    /// FRU product identity.
    async fn device_info(&self) -> Result<DeviceIdentity, AdapterError>;

    async fn set_power(&self, on: bool) -> Result<(), AdapterError>;

    async fn set_fan_mode(&self, mode: FanMode) -> Result<(), AdapterError>;

    /// Set all fans to a fixed duty cycle. Only meaningful in manual fan mode.
    async fn set_fan_speed(&self, percent: FanPercent) -> Result<(), AdapterError>;
}
