//! Home Assistant MQTT discovery documents and the matching current-value map.
//! Pure: builds topics and payloads, never publishes.

use std::collections::HashMap;

use serde::Serialize;
use tracing::debug;

use crate::hardware::types::{DeviceIdentity, FanMode, SensorCategory, SensorReading};
use crate::mqtt::topics::{
    Component, Topics, AVAILABILITY, POWER_SWITCH, RESERVED_STATES, SENSE_AVAILABILITY, SYS_FAN,
    SYS_FAN_MODE, SYS_FAN_PERCENT,
};

pub const FAN_SPEED_MIN: u8 = 10;
pub const FAN_SPEED_MAX: u8 = 100;
pub const UNIT_WATTS: &str = "W";
pub const UNIT_FAHRENHEIT: &str = "°F";
pub const UNIT_RPM: &str = "rpm";
pub const FAN_ICON: &str = "mdi:fan";
const STATE_CLASS_MEASUREMENT: &str = "measurement";

/// Device block shared by every entity of one server. Abbreviated keys per HA discovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceRef {
    #[serde(rename = "cu")]
    pub configuration_url: String,
    #[serde(rename = "ids")]
    pub identifiers: Vec<String>,
    #[serde(rename = "mf")]
    pub manufacturer: String,
    #[serde(rename = "mdl")]
    pub model: String,
    pub name: String,
}

impl DeviceRef {
    pub fn from_identity(identity: &DeviceIdentity) -> Self {
        Self {
            configuration_url: format!("https://{}", identity.host),
            identifiers: vec![identity.serial.clone()],
            manufacturer: identity.manufacturer.clone(),
            model: identity.model.clone(),
            name: format!("{} {}", identity.model, identity.serial),
        }
    }
}

/// One discovery document. Optional fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Descriptor {
    #[serde(rename = "uniq_id")]
    pub unique_id: String,
    pub name: String,
    #[serde(rename = "dev")]
    pub device: DeviceRef,
    #[serde(rename = "avty_t")]
    pub availability_topic: String,
    #[serde(rename = "stat_t")]
    pub state_topic: String,
    #[serde(rename = "cmd_t", skip_serializing_if = "Option::is_none")]
    pub command_topic: Option<String>,
    #[serde(rename = "unit_of_meas", skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(rename = "dev_cla", skip_serializing_if = "Option::is_none")]
    pub device_class: Option<String>,
    #[serde(rename = "stat_cla", skip_serializing_if = "Option::is_none")]
    pub state_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(rename = "pr_mode_stat_t", skip_serializing_if = "Option::is_none")]
    pub preset_mode_state_topic: Option<String>,
    #[serde(rename = "pr_mode_cmd_t", skip_serializing_if = "Option::is_none")]
    pub preset_mode_command_topic: Option<String>,
    #[serde(rename = "pr_modes", skip_serializing_if = "Option::is_none")]
    pub preset_modes: Option<Vec<String>>,
    #[serde(rename = "pct_stat_t", skip_serializing_if = "Option::is_none")]
    pub percentage_state_topic: Option<String>,
    #[serde(rename = "pct_cmd_t", skip_serializing_if = "Option::is_none")]
    pub percentage_command_topic: Option<String>,
    #[serde(rename = "spd_rng_min", skip_serializing_if = "Option::is_none")]
    pub speed_range_min: Option<u8>,
    #[serde(rename = "spd_rng_max", skip_serializing_if = "Option::is_none")]
    pub speed_range_max: Option<u8>,
}

impl Descriptor {
    fn base(
        unique_id: String,
        name: &str,
        device: &DeviceRef,
        availability: String,
        state: String,
    ) -> Self {
        Self {
            unique_id,
            name: name.to_string(),
            device: device.clone(),
            availability_topic: availability,
            state_topic: state,
            command_topic: None,
            unit: None,
            device_class: None,
            state_class: None,
            icon: None,
            preset_mode_state_topic: None,
            preset_mode_command_topic: None,
            preset_modes: None,
            percentage_state_topic: None,
            percentage_command_topic: None,
            speed_range_min: None,
            speed_range_max: None,
        }
    }
}

/// A descriptor and the topic it is announced on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiscoveryMessage {
    pub topic: String,
    pub descriptor: Descriptor,
}

impl DiscoveryMessage {
    pub fn payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.descriptor)
    }
}

/// Everything one powered-on cycle can publish about the sensors.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DiscoveryBundle {
    pub descriptors: Vec<DiscoveryMessage>,
    /// Canonical sensor name -> state payload, in first-seen order.
    pub values: Vec<(String, String)>,
}

impl DiscoveryBundle {
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }
}

/// Build descriptors for the power switch, the system fan and every sensor,
/// plus the value map. Deterministic for a given input.
pub fn build_discovery(
    identity: &DeviceIdentity,
    sensors: &[SensorReading],
    topics: &Topics,
) -> DiscoveryBundle {
    let device = DeviceRef::from_identity(identity);
    let h = topics.safe_host();
    let mut bundle = DiscoveryBundle::default();

    let mut power = Descriptor::base(
        format!("{}_{}", h, POWER_SWITCH),
        "Power",
        &device,
        topics.state(AVAILABILITY),
        topics.state(POWER_SWITCH),
    );
    power.command_topic = Some(topics.command(POWER_SWITCH));
    bundle.descriptors.push(DiscoveryMessage {
        topic: topics.discovery(Component::Switch, POWER_SWITCH),
        descriptor: power,
    });

    let mut fan = Descriptor::base(
        format!("{}_{}", h, SYS_FAN),
        "System Fans",
        &device,
        topics.state(AVAILABILITY),
        topics.state(SYS_FAN),
    );
    fan.command_topic = Some(topics.command(SYS_FAN));
    fan.preset_mode_state_topic = Some(topics.state(SYS_FAN_MODE));
    fan.preset_mode_command_topic = Some(topics.command(SYS_FAN_MODE));
    fan.preset_modes = Some(vec![
        FanMode::Auto.as_str().to_string(),
        FanMode::Manual.as_str().to_string(),
    ]);
    fan.percentage_state_topic = Some(topics.state(SYS_FAN_PERCENT));
    fan.percentage_command_topic = Some(topics.command(SYS_FAN_PERCENT));
    fan.speed_range_min = Some(FAN_SPEED_MIN);
    fan.speed_range_max = Some(FAN_SPEED_MAX);
    bundle.descriptors.push(DiscoveryMessage {
        topic: topics.discovery(Component::Fan, SYS_FAN),
        descriptor: fan,
    });

    // Repeated names keep their first position and the last reading.
    let mut seen: HashMap<String, usize> = HashMap::new();

    for sensor in sensors {
        if RESERVED_STATES.iter().any(|r| r.eq_ignore_ascii_case(&sensor.name)) {
            debug!("Sensor '{}' collides with a bridge topic, not republished", sensor.name);
            continue;
        }

        let mut descriptor = Descriptor::base(
            format!("{}_{}", h, sensor.name),
            &sensor.label,
            &device,
            topics.state(SENSE_AVAILABILITY),
            topics.state(&sensor.name),
        );
        descriptor.state_class = Some(STATE_CLASS_MEASUREMENT.to_string());
        match sensor.category {
            SensorCategory::Power => {
                descriptor.unit = Some(UNIT_WATTS.to_string());
                descriptor.device_class = Some("power".to_string());
            }
            SensorCategory::Temperature => {
                descriptor.unit = Some(UNIT_FAHRENHEIT.to_string());
                descriptor.device_class = Some("temperature".to_string());
            }
            SensorCategory::Fan => {
                descriptor.unit = Some(UNIT_RPM.to_string());
                descriptor.icon = Some(FAN_ICON.to_string());
            }
        }

        let message = DiscoveryMessage {
            topic: topics.discovery(Component::Sensor, &sensor.name),
            descriptor,
        };
        let value = sensor.value.to_string();

        match seen.get(&sensor.name) {
            Some(&idx) => {
                bundle.values[idx].1 = value;
                if let Some(existing) = bundle
                    .descriptors
                    .iter_mut()
                    .find(|m| m.topic == message.topic)
                {
                    *existing = message;
                }
            }
            None => {
                seen.insert(sensor.name.clone(), bundle.values.len());
                bundle.values.push((sensor.name.clone(), value));
                bundle.descriptors.push(message);
            }
        }
    }

    bundle
}
