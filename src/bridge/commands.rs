//! MQTT command handling: maps inbound set topics onto BMC power and fan calls.

use tracing::{debug, error, info, warn};

use crate::error::{BridgeError, Result};
use crate::hardware::types::{FanMode, FanPercent};
use crate::mqtt::topics::{
    CommandKind, OFF, ON, POWER_SWITCH, SYS_FAN, SYS_FAN_MODE, SYS_FAN_PERCENT,
};

use super::session::BridgeSession;

/// What happened to one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Applied(CommandKind),
    /// Topic is not one we act on.
    Ignored,
    /// Payload failed validation; no hardware call was made.
    Rejected(String),
    /// The hardware call failed.
    Failed(String),
}

/// "ON" switches power on, anything else off.
fn is_on(payload: &str) -> bool {
    payload.trim().eq_ignore_ascii_case(ON)
}

impl BridgeSession {
    pub async fn handle_message(&self, topic: &str, payload: &str) -> CommandOutcome {
        let Some(kind) = self.topics.parse_command(topic) else {
            debug!("Ignoring message on {}", topic);
            return CommandOutcome::Ignored;
        };

        debug!("Processing command {:?} with payload: {}", kind, payload);

        let result = match kind {
            CommandKind::PowerSwitch => self.apply_power(is_on(payload)).await,
            CommandKind::FanMode => self.apply_fan_mode(FanMode::from_payload(payload)).await,
            CommandKind::FanPercent => match FanPercent::from_payload(payload) {
                Ok(percent) => self.apply_fan_speed(percent).await,
                Err(e) => Err(e.into()),
            },
            CommandKind::FanSwitch => {
                debug!("Ignoring fan on/off request '{}': server fans cannot be switched", payload);
                return CommandOutcome::Ignored;
            }
        };

        match result {
            Ok(()) => CommandOutcome::Applied(kind),
            Err(BridgeError::Validation(e)) => {
                warn!("Rejected {} command: {}", kind.suffix(), e);
                CommandOutcome::Rejected(e.to_string())
            }
            Err(e) => {
                error!("{} command failed: {}", kind.suffix(), e);
                CommandOutcome::Failed(e.to_string())
            }
        }
    }

    /// Power off reports OFF first: the BMC is briefly unqueryable afterwards.
    /// Power on waits for the firmware to settle, then restores automatic fan control.
    pub(crate) async fn apply_power(&self, on: bool) -> Result<()> {
        if !on {
            self.publish_state(SYS_FAN, OFF).await;
            self.publish_state(POWER_SWITCH, OFF).await;
            self.adapter.set_power(false).await?;
            return Ok(());
        }

        self.adapter.set_power(true).await?;
        self.publish_state(POWER_SWITCH, ON).await;
        self.publish_state(SYS_FAN, ON).await;

        info!(
            "Waiting {}s for the BMC to settle before restoring automatic fan control",
            self.settle_delay.as_secs()
        );
        tokio::time::sleep(self.settle_delay).await;

        self.apply_fan_mode(FanMode::Auto).await
    }

    /// Auto reports full headroom. Manual applies the configured duty cycle
    /// without reporting it; the next explicit speed command does.
    pub(crate) async fn apply_fan_mode(&self, mode: FanMode) -> Result<()> {
        self.adapter.set_fan_mode(mode).await?;
        self.publish_state(SYS_FAN_MODE, mode.as_str()).await;

        match mode {
            FanMode::Auto => {
                self.publish_state(SYS_FAN_PERCENT, FanPercent::FULL.to_string()).await;
            }
            FanMode::Manual => {
                self.adapter.set_fan_speed(self.manual_fan_percent).await?;
            }
        }

        Ok(())
    }

    pub(crate) async fn apply_fan_speed(&self, percent: FanPercent) -> Result<()> {
        self.adapter.set_fan_speed(percent).await?;
        self.publish_state(SYS_FAN_PERCENT, percent.to_string()).await;
        Ok(())
    }
}
