//! Host-scoped MQTT topic names and inbound command topic parsing.

/// Root of every state and command topic.
pub const TOPIC_ROOT: &str = "ipmi";

pub const AVAILABILITY: &str = "availability";
pub const SENSE_AVAILABILITY: &str = "sense_availability";
pub const POWER_SWITCH: &str = "power_switch";
pub const SYS_FAN: &str = "sys_fan";
pub const SYS_FAN_MODE: &str = "sys_fan_mode";
pub const SYS_FAN_PERCENT: &str = "sys_fan_percent";

/// Names owned by the bridge itself; dynamic sensors never publish to these.
pub const RESERVED_STATES: [&str; 6] = [
    AVAILABILITY,
    SENSE_AVAILABILITY,
    POWER_SWITCH,
    SYS_FAN,
    SYS_FAN_MODE,
    SYS_FAN_PERCENT,
];

pub const ONLINE: &str = "online";
pub const OFFLINE: &str = "offline";
pub const ON: &str = "ON";
pub const OFF: &str = "OFF";

/// Closed set of subscribed command topics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    PowerSwitch,
    /// Fan on/off from the Home Assistant fan entity. Server fans cannot be switched off.
    FanSwitch,
    FanMode,
    FanPercent,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::PowerSwitch,
        CommandKind::FanSwitch,
        CommandKind::FanMode,
        CommandKind::FanPercent,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            CommandKind::PowerSwitch => POWER_SWITCH,
            CommandKind::FanSwitch => SYS_FAN,
            CommandKind::FanMode => SYS_FAN_MODE,
            CommandKind::FanPercent => SYS_FAN_PERCENT,
        }
    }
}

/// Home Assistant entity platform of a discovery document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Switch,
    Fan,
    Sensor,
}

impl Component {
    pub fn as_str(&self) -> &'static str {
        match self {
            Component::Switch => "switch",
            Component::Fan => "fan",
            Component::Sensor => "sensor",
        }
    }
}

/// Replace separators that are not welcome in topic levels or unique ids:
/// "10.0.0.5" -> "10_0_0_5".
pub fn sanitize_host(host: &str) -> String {
    host.trim()
        .chars()
        .map(|c| match c {
            '.' | ':' | '/' | '+' | '#' | ' ' => '_',
            other => other,
        })
        .collect()
}

/// Topic map for one BMC.
#[derive(Debug, Clone)]
pub struct Topics {
    safe_host: String,
    discovery_prefix: String,
}

impl Topics {
    pub fn new(host: &str, discovery_prefix: &str) -> Self {
        Self {
            safe_host: sanitize_host(host),
            discovery_prefix: discovery_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn safe_host(&self) -> &str {
        &self.safe_host
    }

    /// `ipmi/{h}/get/{name}`
    pub fn state(&self, name: &str) -> String {
        format!("{}/{}/get/{}", TOPIC_ROOT, self.safe_host, name)
    }

    /// `ipmi/{h}/set/{name}`
    pub fn command(&self, name: &str) -> String {
        format!("{}/{}/set/{}", TOPIC_ROOT, self.safe_host, name)
    }

    pub fn command_topic(&self, kind: CommandKind) -> String {
        self.command(kind.suffix())
    }

    pub fn command_subscriptions(&self) -> Vec<String> {
        CommandKind::ALL.iter().map(|k| self.command_topic(*k)).collect()
    }

    /// `{prefix}/{component}/ipmi_{h}/{entity}/config`
    pub fn discovery(&self, component: Component, entity: &str) -> String {
        format!(
            "{}/{}/ipmi_{}/{}/config",
            self.discovery_prefix,
            component.as_str(),
            self.safe_host,
            entity
        )
    }

    /// Match an inbound topic against this host's command topics.
    pub fn parse_command(&self, topic: &str) -> Option<CommandKind> {
        let prefix = format!("{}/{}/set/", TOPIC_ROOT, self.safe_host);
        let suffix = topic.strip_prefix(&prefix)?;
        CommandKind::ALL.into_iter().find(|k| k.suffix() == suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_is_sanitized() {
        assert_eq!(sanitize_host("10.82.1.92"), "10_82_1_92");
        assert_eq!(sanitize_host("fe80::1"), "fe80__1");
        assert_eq!(sanitize_host("idrac-r640.lan"), "idrac-r640_lan");
    }

    #[test]
    fn state_command_and_discovery_topics() {
        let t = Topics::new("10.0.0.5", "homeassistant");
        assert_eq!(t.state(AVAILABILITY), "ipmi/10_0_0_5/get/availability");
        assert_eq!(t.command(POWER_SWITCH), "ipmi/10_0_0_5/set/power_switch");
        assert_eq!(
            t.discovery(Component::Sensor, "Inlet_Temp"),
            "homeassistant/sensor/ipmi_10_0_0_5/Inlet_Temp/config"
        );
        assert_eq!(
            t.command_subscriptions(),
            vec![
                "ipmi/10_0_0_5/set/power_switch",
                "ipmi/10_0_0_5/set/sys_fan",
                "ipmi/10_0_0_5/set/sys_fan_mode",
                "ipmi/10_0_0_5/set/sys_fan_percent",
            ]
        );
    }

    #[test]
    fn command_topics_match_exactly() {
        let t = Topics::new("10.0.0.5", "homeassistant/");
        assert_eq!(
            t.parse_command("ipmi/10_0_0_5/set/power_switch"),
            Some(CommandKind::PowerSwitch)
        );
        assert_eq!(t.parse_command("ipmi/10_0_0_5/set/sys_fan"), Some(CommandKind::FanSwitch));
        assert_eq!(t.parse_command("ipmi/10_0_0_5/set/sys_fan_mode"), Some(CommandKind::FanMode));
        assert_eq!(
            t.parse_command("ipmi/10_0_0_5/set/sys_fan_percent"),
            Some(CommandKind::FanPercent)
        );
        assert_eq!(t.parse_command("ipmi/10_0_0_6/set/power_switch"), None);
        assert_eq!(t.parse_command("ipmi/10_0_0_5/get/power_switch"), None);
        assert_eq!(t.parse_command("ipmi/10_0_0_5/set/sys_fan_percent/extra"), None);
        assert_eq!(
            t.discovery(Component::Fan, SYS_FAN),
            "homeassistant/fan/ipmi_10_0_0_5/sys_fan/config"
        );
    }
}
