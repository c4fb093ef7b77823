//! Sensor normalizer: turns raw SDR rows into canonical names, categories and units.
//! Temperatures are republished in °F; fans (rpm) and power (W) pass through.

use tracing::debug;

use crate::hardware::types::{RawSensorRow, SensorCategory, SensorReading, SensorValue};

/// How a row label is handled, decided once per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Fan,
    NamedTemperature,
    GenericTemperature,
    Power,
}

/// First matching rule wins.
fn classify(label: &str) -> Option<Rule> {
    let lower = label.trim().to_lowercase();
    if lower.contains("fan") && !lower.contains("redundancy") {
        Some(Rule::Fan)
    } else if lower == "inlet temp" || lower == "exhaust temp" {
        Some(Rule::NamedTemperature)
    } else if lower.contains("temp") {
        Some(Rule::GenericTemperature)
    } else if lower.contains("power consumption") || lower.contains("pwr consumption") {
        Some(Rule::Power)
    } else {
        None
    }
}

/// Celsius to Fahrenheit, rounded to two decimals.
pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    ((celsius * 1.8 + 32.0) * 100.0).round() / 100.0
}

/// Label with whitespace runs replaced by underscores: "Inlet Temp" -> "Inlet_Temp".
pub fn canonical_name(label: &str) -> String {
    label.split_whitespace().collect::<Vec<_>>().join("_")
}

/// Integer categories accept "80" as well as "80.00".
fn parse_integer(reading: &str) -> Option<i64> {
    let reading = reading.trim();
    reading
        .parse::<i64>()
        .ok()
        .or_else(|| reading.parse::<f64>().ok().filter(|v| v.is_finite()).map(|v| v as i64))
}

fn parse_decimal(reading: &str) -> Option<f64> {
    reading.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Normalize rows in order. Rows without a numeric reading ("na") are skipped.
/// Every generic temperature row takes a `Temp{N}` index, readable or not, so a
/// sensor keeps its name while a neighbour reads "na".
pub fn normalize(rows: &[RawSensorRow]) -> Vec<SensorReading> {
    let mut readings = Vec::new();
    let mut temp_counter = 1;

    for row in rows {
        let Some(rule) = classify(&row.label) else {
            continue;
        };

        let reading = match rule {
            Rule::Fan | Rule::Power => parse_integer(&row.reading).map(|v| {
                let category = if rule == Rule::Fan {
                    SensorCategory::Fan
                } else {
                    SensorCategory::Power
                };
                SensorReading {
                    name: canonical_name(&row.label),
                    label: row.label.trim().to_string(),
                    value: SensorValue::Integer(v),
                    category,
                }
            }),
            Rule::NamedTemperature => parse_decimal(&row.reading).map(|c| SensorReading {
                name: canonical_name(&row.label),
                label: row.label.trim().to_string(),
                value: SensorValue::Decimal(celsius_to_fahrenheit(c)),
                category: SensorCategory::Temperature,
            }),
            Rule::GenericTemperature => {
                let name = format!("Temp{}", temp_counter);
                temp_counter += 1;
                parse_decimal(&row.reading).map(|c| SensorReading {
                    label: name.clone(),
                    name,
                    value: SensorValue::Decimal(celsius_to_fahrenheit(c)),
                    category: SensorCategory::Temperature,
                })
            }
        };

        match reading {
            Some(r) => readings.push(r),
            None => debug!("Skipping sensor '{}' with reading '{}'", row.label, row.reading),
        }
    }

    readings
}
