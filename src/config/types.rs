//! Bridge configuration structs and defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const DEFAULT_IPMI_USERNAME: &str = "root";
pub const DEFAULT_IPMI_PASSWORD: &str = "calvin";
pub const DEFAULT_MQTT_SERVER: &str = "127.0.0.1";
pub const DEFAULT_MQTT_PORT: u16 = 1883;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_SETTLE_DELAY_SECS: u64 = 10;
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_DISCOVERY_PREFIX: &str = "homeassistant";
pub const DEFAULT_MANUAL_FAN_PERCENT: u8 = 20;

const REDACTED: &str = "********";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    pub ipmi: IpmiSettings,
    pub mqtt: MqttSettings,
    pub bridge: BridgeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IpmiSettings {
    pub host: String,
    pub username: String,
    pub password: String,
    pub command_timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttSettings {
    pub server: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub client_id: String,
    pub keep_alive_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeSettings {
    pub poll_interval_secs: u64,
    /// Wait after power-on before re-enabling automatic fan control.
    pub settle_delay_secs: u64,
    pub discovery_prefix: String,
    /// Duty cycle applied when switching to manual fan mode.
    pub manual_fan_percent: u8,
    pub log_level: String,
}

impl BridgeConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.bridge.poll_interval_secs)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_secs(self.bridge.settle_delay_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.ipmi.command_timeout_secs)
    }

    /// MQTT credentials are only used when both halves are present.
    pub fn mqtt_credentials(&self) -> Option<(&str, &str)> {
        match (&self.mqtt.username, &self.mqtt.password) {
            (Some(user), Some(pass)) => Some((user.as_str(), pass.as_str())),
            _ => None,
        }
    }

    /// Copy with passwords masked, for `--show-config` and startup logs.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.ipmi.password = REDACTED.to_string();
        if copy.mqtt.password.is_some() {
            copy.mqtt.password = Some(REDACTED.to_string());
        }
        copy
    }
}
