//! Bridge session: availability state machine and poll loop for one BMC.
//!
//! Each cycle reads the chassis power state and publishes exactly one of three
//! pictures: offline (BMC unreachable), powered off (fixed defaults, sensors
//! unavailable) or powered on (live readings). Discovery documents go out once
//! per process, on the first powered-on cycle that gets all of them queued.

use std::mem::discriminant;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::bridge::discovery::build_discovery;
use crate::config::types::{DEFAULT_MANUAL_FAN_PERCENT, DEFAULT_SETTLE_DELAY_SECS};
use crate::error::Result;
use crate::hardware::types::{DeviceIdentity, FanMode, FanPercent, PowerState};
use crate::hardware::HardwareAdapter;
use crate::mqtt::publisher::Publisher;
use crate::mqtt::topics::{
    Topics, AVAILABILITY, OFF, OFFLINE, ON, ONLINE, POWER_SWITCH, SENSE_AVAILABILITY, SYS_FAN,
    SYS_FAN_MODE, SYS_FAN_PERCENT,
};
use crate::sensors::normalize;

/// What one poll cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// BMC unreachable; only availability published.
    Offline,
    /// Server powered off; default fan state published.
    PoweredOff,
    /// Live readings published. `announced` is true on the cycle that sent discovery.
    PoweredOn { sensors: usize, announced: bool },
    /// The cycle was abandoned. Publications made before the failure stay.
    Failed(String),
}

pub struct BridgeSession {
    pub(crate) adapter: Arc<dyn HardwareAdapter>,
    pub(crate) publisher: Arc<dyn Publisher>,
    pub(crate) topics: Topics,
    pub(crate) settle_delay: Duration,
    pub(crate) manual_fan_percent: FanPercent,
    discovered: AtomicBool,
}

impl BridgeSession {
    pub fn new(
        adapter: Arc<dyn HardwareAdapter>,
        publisher: Arc<dyn Publisher>,
        topics: Topics,
    ) -> Self {
        Self {
            adapter,
            publisher,
            topics,
            settle_delay: Duration::from_secs(DEFAULT_SETTLE_DELAY_SECS),
            manual_fan_percent: FanPercent::try_from(i64::from(DEFAULT_MANUAL_FAN_PERCENT))
                .unwrap_or(FanPercent::FULL),
            discovered: AtomicBool::new(false),
        }
    }

    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    pub fn with_manual_fan_percent(mut self, percent: FanPercent) -> Self {
        self.manual_fan_percent = percent;
        self
    }

    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// True once every discovery document has been queued. Never reset after that.
    pub fn is_discovered(&self) -> bool {
        self.discovered.load(Ordering::SeqCst)
    }

    /// Publish a retained state value. Transport failures are logged, not returned.
    pub(crate) async fn publish_state(&self, name: &str, payload: impl Into<String>) {
        let topic = self.topics.state(name);
        if let Err(e) = self.publisher.publish(&topic, payload.into(), true).await {
            warn!("{}", e);
        }
    }

    /// Run one cycle and report what happened. Never panics or propagates.
    pub async fn poll_cycle(&self) -> CycleOutcome {
        match self.try_poll_cycle().await {
            Ok(outcome) => outcome,
            Err(e) => CycleOutcome::Failed(e.to_string()),
        }
    }

    async fn try_poll_cycle(&self) -> Result<CycleOutcome> {
        match self.adapter.power_status().await? {
            PowerState::Unreachable => {
                self.publish_state(AVAILABILITY, OFFLINE).await;
                self.publish_state(SENSE_AVAILABILITY, OFFLINE).await;
                Ok(CycleOutcome::Offline)
            }
            PowerState::Off => {
                self.publish_state(AVAILABILITY, ONLINE).await;
                self.publish_state(SENSE_AVAILABILITY, OFFLINE).await;
                // A powered-off Dell BMC reports automatic control at full headroom.
                self.publish_state(POWER_SWITCH, OFF).await;
                self.publish_state(SYS_FAN, OFF).await;
                self.publish_state(SYS_FAN_MODE, FanMode::Auto.as_str()).await;
                self.publish_state(SYS_FAN_PERCENT, FanPercent::FULL.to_string()).await;
                Ok(CycleOutcome::PoweredOff)
            }
            PowerState::On => self.publish_powered_on().await,
        }
    }

    async fn publish_powered_on(&self) -> Result<CycleOutcome> {
        // Gather everything before the first publication so a failed read
        // leaves the previous retained picture untouched.
        let identity = self.adapter.device_info().await?;
        let rows = self.adapter.sensor_list().await?;
        let readings = normalize(&rows);
        let bundle = build_discovery(&identity, &readings, &self.topics);

        let announcements = if self.is_discovered() {
            Vec::new()
        } else {
            bundle
                .descriptors
                .iter()
                .map(|m| -> Result<(String, String)> { Ok((m.topic.clone(), m.payload()?)) })
                .collect::<Result<Vec<_>>>()?
        };

        self.publish_state(AVAILABILITY, ONLINE).await;
        self.publish_state(SENSE_AVAILABILITY, ONLINE).await;
        for (name, value) in &bundle.values {
            self.publish_state(name, value.clone()).await;
        }
        self.publish_state(POWER_SWITCH, ON).await;
        self.publish_state(SYS_FAN, ON).await;

        let claimed = !announcements.is_empty()
            && self
                .discovered
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok();
        let announced = claimed && self.announce(&identity, announcements).await;

        Ok(CycleOutcome::PoweredOn {
            sensors: bundle.values.len(),
            announced,
        })
    }

    /// Send the discovery documents. If any could not be queued the flag is
    /// released and the whole set goes out again on the next powered-on cycle.
    async fn announce(&self, identity: &DeviceIdentity, documents: Vec<(String, String)>) -> bool {
        let total = documents.len();
        info!(
            "Announcing {} discovery documents for {} {} ({})",
            total, identity.manufacturer, identity.model, identity.serial
        );

        let mut failed = 0;
        for (topic, payload) in documents {
            if let Err(e) = self.publisher.publish(&topic, payload, false).await {
                warn!("{}", e);
                failed += 1;
            }
        }

        if failed > 0 {
            warn!(
                "{} of {} discovery documents were not queued, retrying next cycle",
                failed, total
            );
            self.discovered.store(false, Ordering::SeqCst);
            return false;
        }
        true
    }

    /// Poll forever at a fixed interval. The first cycle runs immediately.
    pub async fn run_poll_loop(self: Arc<Self>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Starting poll loop for {} every {}s",
            self.topics.safe_host(),
            interval.as_secs()
        );

        let mut last: Option<CycleOutcome> = None;
        loop {
            ticker.tick().await;
            let outcome = self.poll_cycle().await;

            let changed = last
                .as_ref()
                .map(|l| discriminant(l) != discriminant(&outcome))
                .unwrap_or(true);

            match &outcome {
                CycleOutcome::Failed(reason) => warn!("Poll cycle failed: {}", reason),
                CycleOutcome::Offline if changed => {
                    warn!("BMC {} is unreachable", self.topics.safe_host())
                }
                CycleOutcome::PoweredOff if changed => info!("Server is powered off"),
                CycleOutcome::PoweredOn { sensors, .. } if changed => {
                    info!("Server is powered on, publishing {} sensors", sensors)
                }
                other => debug!("Poll cycle: {:?}", other),
            }

            last = Some(outcome);
        }
    }
}
