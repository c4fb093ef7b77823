//! Resolve command-line/environment arguments into a validated BridgeConfig.

use tracing::warn;

use crate::app::cli::Args;
use crate::config::types::{BridgeConfig, BridgeSettings, IpmiSettings, MqttSettings};
use crate::error::ConfigError;
use crate::mqtt::topics::sanitize_host;

const MQTT_KEEP_ALIVE_SECS: u64 = 30;

pub fn load_config(args: &Args) -> Result<BridgeConfig, ConfigError> {
    let host = args
        .ipmi_server
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or(ConfigError::MissingHost)?
        .to_string();

    if args.poll_interval == 0 {
        return Err(ConfigError::invalid("POLL_INTERVAL", "must be at least 1 second"));
    }
    if args.command_timeout == 0 {
        return Err(ConfigError::invalid("IPMI_COMMAND_TIMEOUT", "must be at least 1 second"));
    }
    if args.manual_fan_percent > 100 {
        return Err(ConfigError::invalid(
            "MANUAL_FAN_PERCENT",
            format!("{} is outside 0-100", args.manual_fan_percent),
        ));
    }
    if args.discovery_prefix.trim().is_empty() {
        return Err(ConfigError::invalid("DISCOVERY_PREFIX", "must not be empty"));
    }

    let client_id = args
        .mqtt_client_id
        .clone()
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| format!("ipmi_{}", sanitize_host(&host)));

    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());
    let mqtt_username = non_empty(&args.mqtt_username);
    let mqtt_password = non_empty(&args.mqtt_password);
    if mqtt_username.is_some() != mqtt_password.is_some() {
        warn!("MQTT_USERNAME and MQTT_PASSWORD must both be set; connecting anonymously");
    }

    Ok(BridgeConfig {
        ipmi: IpmiSettings {
            host,
            username: args.ipmi_username.clone(),
            password: args.ipmi_password.clone(),
            command_timeout_secs: args.command_timeout,
        },
        mqtt: MqttSettings {
            server: args.mqtt_server.clone(),
            port: args.mqtt_port,
            username: mqtt_username,
            password: mqtt_password,
            client_id,
            keep_alive_secs: MQTT_KEEP_ALIVE_SECS,
        },
        bridge: BridgeSettings {
            poll_interval_secs: args.poll_interval,
            settle_delay_secs: args.settle_delay,
            discovery_prefix: args.discovery_prefix.trim().to_string(),
            manual_fan_percent: args.manual_fan_percent,
            log_level: args.log_level.clone(),
        },
    })
}

/// Extra guidance printed under a fatal configuration error.
pub fn startup_hint(error: &ConfigError) -> Option<&'static str> {
    match error {
        ConfigError::MissingHost => {
            Some("Must provide environment variables: IPMI_SERVER, MQTT_SERVER")
        }
        ConfigError::Invalid { .. } => None,
    }
}
