//! MQTT transport: topic map, publisher seam and rumqttc connection.

pub mod client;
pub mod publisher;
pub mod topics;
