//! Bridge runner: wires the IPMI adapter, MQTT client and session together and
//! runs the poll loop, command dispatcher and MQTT event loop until a shutdown signal.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{info, warn};

use crate::bridge::session::BridgeSession;
use crate::config::types::BridgeConfig;
use crate::hardware::types::FanPercent;
use crate::hardware::IpmiAdapter;
use crate::mqtt::client::{self, InboundMessage};
use crate::mqtt::publisher::MqttPublisher;
use crate::mqtt::topics::Topics;
use crate::system::executor::{IpmitoolRunner, LanplusTarget};

/// Production IPMI adapter for the configured BMC.
pub fn ipmi_adapter(config: &BridgeConfig) -> IpmiAdapter<IpmitoolRunner> {
    let target = LanplusTarget {
        host: config.ipmi.host.clone(),
        username: config.ipmi.username.clone(),
        password: config.ipmi.password.clone(),
    };
    IpmiAdapter::new(
        IpmitoolRunner::new(target, config.command_timeout()),
        config.ipmi.host.clone(),
    )
}

/// Handle inbound commands one at a time. A settle delay blocks this task only.
pub async fn run_dispatcher(
    session: Arc<BridgeSession>,
    mut inbound: UnboundedReceiver<InboundMessage>,
) {
    while let Some(message) = inbound.recv().await {
        session.handle_message(&message.topic, &message.payload).await;
    }
}

pub async fn run(config: BridgeConfig) -> Result<()> {
    let topics = Topics::new(&config.ipmi.host, &config.bridge.discovery_prefix);
    let manual_percent = FanPercent::try_from(i64::from(config.bridge.manual_fan_percent))
        .context("Invalid manual fan percent")?;

    let (mqtt_client, eventloop) = client::connect(&config, &topics);
    let publisher = Arc::new(MqttPublisher::new(mqtt_client.clone()));
    let adapter = Arc::new(ipmi_adapter(&config));

    let session = Arc::new(
        BridgeSession::new(adapter, publisher, topics.clone())
            .with_settle_delay(config.settle_delay())
            .with_manual_fan_percent(manual_percent),
    );

    let (tx, rx) = mpsc::unbounded_channel();
    let mqtt_task = tokio::spawn(client::run_event_loop(
        eventloop,
        mqtt_client.clone(),
        topics.command_subscriptions(),
        tx,
    ));
    let dispatcher_task = tokio::spawn(run_dispatcher(Arc::clone(&session), rx));
    let poll_task = tokio::spawn(Arc::clone(&session).run_poll_loop(config.poll_interval()));

    shutdown_signal().await;
    info!("Shutdown signal received");

    poll_task.abort();
    dispatcher_task.abort();
    // Best effort: queued publishes may not reach the broker.
    if let Err(e) = mqtt_client.try_disconnect() {
        warn!("MQTT disconnect failed: {}", e);
    }
    mqtt_task.abort();

    info!("Bridge shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await.ok();
    }
}
