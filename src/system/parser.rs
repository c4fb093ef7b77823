//! ipmitool text output parsers: chassis power status, CSV SDR rows, FRU product fields.

use crate::error::AdapterError;
use crate::hardware::types::{DeviceIdentity, PowerState, RawSensorRow};

/// Classify `chassis power status` output.
/// "power is on" wins, then "unable to establish" (no session), everything else is off.
pub fn parse_power_status(output: &str) -> PowerState {
    let lower = output.to_lowercase();
    if lower.contains("power is on") {
        PowerState::On
    } else if lower.contains("unable to establish") {
        PowerState::Unreachable
    } else {
        PowerState::Off
    }
}

/// Parse CSV SDR output into label/reading pairs, in output order.
/// Input: "Fan1,3360,RPM,ok\nInlet Temp,21,degrees C,ok\n..."
pub fn parse_sdr_rows(csv: &str) -> Vec<RawSensorRow> {
    csv.lines()
        .filter_map(|line| {
            let mut cols = line.split(',');
            let label = cols.next()?.trim();
            let reading = cols.next()?.trim();
            if label.is_empty() {
                return None;
            }
            Some(RawSensorRow::new(label, reading))
        })
        .collect()
}

/// Parse `fru print 0` into the product identity of the server at `host`.
pub fn parse_fru(output: &str, host: &str) -> Result<DeviceIdentity, AdapterError> {
    let field = |name: &str| {
        parse_fru_field(output, name).ok_or_else(|| AdapterError::parse(name, output))
    };

    Ok(DeviceIdentity {
        manufacturer: field("Product Manufacturer")?,
        model: field("Product Name")?,
        serial: field("Product Serial")?,
        host: host.to_string(),
    })
}

/// Value of the first `key : value` line whose key is exactly `field`.
fn parse_fru_field(output: &str, field: &str) -> Option<String> {
    output
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim() == field)
        .map(|(_, value)| value.trim().to_string())
}
