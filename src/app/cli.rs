//! Command-line argument definitions (clap). Every option also reads its environment variable.

use clap::Parser;

use crate::config::types::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_DISCOVERY_PREFIX, DEFAULT_IPMI_PASSWORD,
    DEFAULT_IPMI_USERNAME, DEFAULT_MANUAL_FAN_PERCENT, DEFAULT_MQTT_PORT, DEFAULT_MQTT_SERVER,
    DEFAULT_POLL_INTERVAL_SECS, DEFAULT_SETTLE_DELAY_SECS,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "pankha-ipmi-bridge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pankha IPMI to MQTT bridge with Home Assistant discovery", long_about = None)]
pub struct Args {
    // === IPMI ===
    /// BMC host address (required)
    #[arg(long = "ipmi-server", env = "IPMI_SERVER", help_heading = "IPMI")]
    pub ipmi_server: Option<String>,

    /// BMC username
    #[arg(
        long = "ipmi-username",
        env = "IPMI_USERNAME",
        default_value = DEFAULT_IPMI_USERNAME,
        help_heading = "IPMI",
    )]
    pub ipmi_username: String,

    /// BMC password
    #[arg(
        long = "ipmi-password",
        env = "IPMI_PASSWORD",
        default_value = DEFAULT_IPMI_PASSWORD,
        hide_default_value = true,
        hide_env_values = true,
        help_heading = "IPMI",
    )]
    pub ipmi_password: String,

    /// Seconds before an ipmitool call is abandoned
    #[arg(
        long = "command-timeout",
        env = "IPMI_COMMAND_TIMEOUT",
        default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS,
        help_heading = "IPMI",
    )]
    pub command_timeout: u64,

    // === MQTT ===
    /// MQTT broker host
    #[arg(
        long = "mqtt-server",
        env = "MQTT_SERVER",
        default_value = DEFAULT_MQTT_SERVER,
        help_heading = "MQTT",
    )]
    pub mqtt_server: String,

    /// MQTT broker port
    #[arg(
        long = "mqtt-port",
        env = "MQTT_PORT",
        default_value_t = DEFAULT_MQTT_PORT,
        help_heading = "MQTT",
    )]
    pub mqtt_port: u16,

    /// MQTT username (used together with --mqtt-password)
    #[arg(long = "mqtt-username", env = "MQTT_USERNAME", help_heading = "MQTT")]
    pub mqtt_username: Option<String>,

    /// MQTT password (used together with --mqtt-username)
    #[arg(
        long = "mqtt-password",
        env = "MQTT_PASSWORD",
        hide_env_values = true,
        help_heading = "MQTT",
    )]
    pub mqtt_password: Option<String>,

    /// MQTT client identifier [default: ipmi_<host>]
    #[arg(long = "mqtt-client-id", env = "MQTT_CLIENT_ID", help_heading = "MQTT")]
    pub mqtt_client_id: Option<String>,

    // === Bridge ===
    /// Seconds between poll cycles
    #[arg(
        long = "poll-interval",
        env = "POLL_INTERVAL",
        default_value_t = DEFAULT_POLL_INTERVAL_SECS,
        help_heading = "Bridge",
    )]
    pub poll_interval: u64,

    /// Seconds to wait after power-on before restoring automatic fan control
    #[arg(
        long = "settle-delay",
        env = "SETTLE_DELAY",
        default_value_t = DEFAULT_SETTLE_DELAY_SECS,
        help_heading = "Bridge",
    )]
    pub settle_delay: u64,

    /// Home Assistant discovery topic prefix
    #[arg(
        long = "discovery-prefix",
        env = "DISCOVERY_PREFIX",
        default_value = DEFAULT_DISCOVERY_PREFIX,
        help_heading = "Bridge",
    )]
    pub discovery_prefix: String,

    /// Fan duty cycle applied when switching to manual mode (0-100)
    #[arg(
        long = "manual-fan-percent",
        env = "MANUAL_FAN_PERCENT",
        default_value_t = DEFAULT_MANUAL_FAN_PERCENT,
        help_heading = "Bridge",
    )]
    pub manual_fan_percent: u8,

    // === Logs & Debug ===
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR, CRITICAL)
    #[arg(
        long = "log-level",
        env = "LOG_LEVEL",
        default_value = "info",
        help_heading = "Logs & Debug",
    )]
    pub log_level: String,

    /// Print the resolved configuration (passwords masked) and exit
    #[arg(long = "show-config", help_heading = "Logs & Debug")]
    pub show_config: bool,

    /// Test mode: poll the BMC once, print readings and discovery documents, exit
    #[arg(long, help_heading = "Logs & Debug")]
    pub test: bool,
}
