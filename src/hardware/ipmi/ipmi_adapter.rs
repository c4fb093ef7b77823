//! IPMI adapter: HardwareAdapter over fixed ipmitool argument templates.
//! Dell OEM raw commands (0x30 0x30) drive the fan mode and duty cycle.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::AdapterError;
use crate::hardware::types::{DeviceIdentity, FanMode, FanPercent, PowerState, RawSensorRow};
use crate::hardware::HardwareAdapter;
use crate::system::executor::{describe, CommandRunner};
use crate::system::parser;

/// OEM netfn/command prefix for Dell iDRAC fan control.
const RAW_FAN_PREFIX: [&str; 3] = ["raw", "0x30", "0x30"];

pub struct IpmiAdapter<R: CommandRunner> {
    runner: R,
    host: String,
}

impl<R: CommandRunner> IpmiAdapter<R> {
    pub fn new(runner: R, host: impl Into<String>) -> Self {
        Self {
            runner,
            host: host.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run a call and require a zero exit status.
    async fn run(&self, args: Vec<String>) -> Result<String, AdapterError> {
        let output = self.runner.invoke(&args).await?;
        output.into_stdout(&describe(&args))
    }
}

fn args(parts: &[&str]) -> Vec<String> {
    parts.iter().map(|p| p.to_string()).collect()
}

/// `raw 0x30 0x30 0x01 0x01` enables automatic control, `0x00` hands it to us.
pub fn fan_mode_args(mode: FanMode) -> Vec<String> {
    let flag = match mode {
        FanMode::Auto => "0x01",
        FanMode::Manual => "0x00",
    };
    let mut v = args(&RAW_FAN_PREFIX);
    v.extend(args(&["0x01", flag]));
    v
}

/// `raw 0x30 0x30 0x02 0xff <percent>` sets every fan (0xff) to the duty cycle.
pub fn fan_speed_args(percent: FanPercent) -> Vec<String> {
    let mut v = args(&RAW_FAN_PREFIX);
    v.extend(args(&["0x02", "0xff"]));
    v.push(format!("0x{:02x}", percent.value()));
    v
}

#[async_trait]
impl<R: CommandRunner> HardwareAdapter for IpmiAdapter<R> {
    async fn power_status(&self) -> Result<PowerState, AdapterError> {
        let args = args(&["-c", "chassis", "power", "status"]);
        let output = self.runner.invoke(&args).await?;
        let text = output.combined();
        let state = parser::parse_power_status(&text);

        // ipmitool exits non-zero when the session cannot be established;
        // that is the unreachable state, not a failed call.
        if state == PowerState::Unreachable || output.success {
            debug!("Chassis power status for {}: {}", self.host, state);
            Ok(state)
        } else {
            Err(AdapterError::Failed {
                command: describe(&args),
                status: output.status,
                output: text,
            })
        }
    }

    async fn sensor_list(&self) -> Result<Vec<RawSensorRow>, AdapterError> {
        let csv = self.run(args(&["-c", "sdr", "elist", "all"])).await?;
        let rows = parser::parse_sdr_rows(&csv);
        debug!("Read {} SDR rows from {}", rows.len(), self.host);
        Ok(rows)
    }

    async fn device_info(&self) -> Result<DeviceIdentity, AdapterError> {
        let fru = self.run(args(&["-c", "fru", "print", "0"])).await?;
        parser::parse_fru(&fru, &self.host)
    }

    async fn set_power(&self, on: bool) -> Result<(), AdapterError> {
        let state = if on { "on" } else { "off" };
        info!("Setting chassis power {} on {}", state, self.host);
        self.run(args(&["chassis", "power", state])).await?;
        Ok(())
    }

    async fn set_fan_mode(&self, mode: FanMode) -> Result<(), AdapterError> {
        info!("Setting fan mode {} on {}", mode.as_str(), self.host);
        self.run(fan_mode_args(mode)).await?;
        Ok(())
    }

    async fn set_fan_speed(&self, percent: FanPercent) -> Result<(), AdapterError> {
        info!("Setting fan speed {}% on {}", percent, self.host);
        self.run(fan_speed_args(percent)).await?;
        Ok(())
    }
}
