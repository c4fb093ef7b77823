//! Pankha IPMI bridge: polls a BMC through ipmitool, republishes power, thermal
//! and fan state over MQTT with Home Assistant discovery, and applies power and
//! fan commands received from MQTT.

pub mod app;
pub mod bridge;
pub mod config;
pub mod error;
pub mod hardware;
pub mod mqtt;
pub mod sensors;
pub mod system;
