//! MQTT connection: client options, last will, and the event loop task that
//! re-subscribes on every ConnAck and forwards inbound publishes to the dispatcher.

use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, LastWill, MqttOptions, Packet, QoS};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, warn};

use crate::config::types::BridgeConfig;
use crate::error::TransportError;
use crate::mqtt::topics::{Topics, AVAILABILITY, OFFLINE};

/// Pending requests rumqttc buffers before `try_publish` starts failing.
const REQUEST_CHANNEL_CAPACITY: usize = 64;
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// One message received on a subscribed topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub topic: String,
    pub payload: String,
}

pub fn build_options(config: &BridgeConfig, topics: &Topics) -> MqttOptions {
    let mut options = MqttOptions::new(
        config.mqtt.client_id.clone(),
        config.mqtt.server.clone(),
        config.mqtt.port,
    );
    options.set_keep_alive(Duration::from_secs(config.mqtt.keep_alive_secs));
    options.set_last_will(LastWill::new(
        topics.state(AVAILABILITY),
        OFFLINE.as_bytes().to_vec(),
        QoS::AtMostOnce,
        true,
    ));
    if let Some((username, password)) = config.mqtt_credentials() {
        options.set_credentials(username, password);
    }
    options
}

pub fn connect(config: &BridgeConfig, topics: &Topics) -> (AsyncClient, EventLoop) {
    info!(
        "Connecting to MQTT broker {}:{} as {}",
        config.mqtt.server, config.mqtt.port, config.mqtt.client_id
    );
    AsyncClient::new(build_options(config, topics), REQUEST_CHANNEL_CAPACITY)
}

/// Drive the connection forever. rumqttc reconnects on the next poll after an error.
pub async fn run_event_loop(
    mut eventloop: EventLoop,
    client: AsyncClient,
    subscriptions: Vec<String>,
    inbound: UnboundedSender<InboundMessage>,
) {
    loop {
        match eventloop.poll().await {
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let message = InboundMessage {
                    topic: publish.topic.clone(),
                    payload: String::from_utf8_lossy(&publish.payload).to_string(),
                };
                debug!("MQTT message on {}: {}", message.topic, message.payload);
                if inbound.send(message).is_err() {
                    warn!("Command dispatcher has stopped, leaving MQTT event loop");
                    return;
                }
            }
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                info!("MQTT server is connected!");
                // The broker may have dropped our session; subscribe again every time.
                for topic in &subscriptions {
                    match client.try_subscribe(topic.clone(), QoS::AtMostOnce) {
                        Ok(()) => debug!("Subscribed to {}", topic),
                        Err(e) => error!(
                            "{}",
                            TransportError::Subscribe {
                                topic: topic.clone(),
                                message: e.to_string(),
                            }
                        ),
                    }
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                error!("MQTT server has disconnected!");
            }
            Ok(_) => {}
            Err(e) => {
                error!("MQTT connection error: {}", e);
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::{BridgeSettings, IpmiSettings, MqttSettings};

    fn config(username: Option<&str>, password: Option<&str>) -> BridgeConfig {
        BridgeConfig {
            ipmi: IpmiSettings {
                host: "10.0.0.5".to_string(),
                username: "root".to_string(),
                password: "calvin".to_string(),
                command_timeout_secs: 30,
            },
            mqtt: MqttSettings {
                server: "broker.lan".to_string(),
                port: 1884,
                username: username.map(str::to_string),
                password: password.map(str::to_string),
                client_id: "ipmi_10_0_0_5".to_string(),
                keep_alive_secs: 30,
            },
            bridge: BridgeSettings {
                poll_interval_secs: 30,
                settle_delay_secs: 10,
                discovery_prefix: "homeassistant".to_string(),
                manual_fan_percent: 20,
                log_level: "info".to_string(),
            },
        }
    }

    #[test]
    fn options_carry_identity_will_and_credentials() {
        let topics = Topics::new("10.0.0.5", "homeassistant");
        let options = build_options(&config(Some("ha"), Some("secret")), &topics);

        assert_eq!(options.client_id(), "ipmi_10_0_0_5");
        assert_eq!(options.broker_address(), ("broker.lan".to_string(), 1884));
        assert_eq!(options.keep_alive(), Duration::from_secs(30));
        assert_eq!(options.credentials(), Some(("ha".to_string(), "secret".to_string())));

        let will = options.last_will().unwrap();
        assert_eq!(will.topic, "ipmi/10_0_0_5/get/availability");
        assert_eq!(&will.message[..], b"offline");
        assert!(will.retain);
    }

    #[test]
    fn anonymous_without_password() {
        let topics = Topics::new("10.0.0.5", "homeassistant");
        let options = build_options(&config(Some("ha"), None), &topics);
        assert_eq!(options.credentials(), None);
    }
}
