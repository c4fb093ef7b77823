//! Publisher seam between the bridge session and the MQTT client.

use async_trait::async_trait;
use rumqttc::{AsyncClient, QoS};
use tracing::trace;

use crate::error::TransportError;

/// Fire-and-forget publication. Retained messages represent current state.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        retained: bool,
    ) -> Result<(), TransportError>;
}

/// rumqttc backed publisher. Cloning shares the underlying request channel.
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn new(client: AsyncClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &AsyncClient {
        &self.client
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        retained: bool,
    ) -> Result<(), TransportError> {
        trace!("MQTT publish {} = {} (retain={})", topic, payload, retained);
        // try_publish never waits on a full request queue; a backed-up
        // connection drops the value and the next poll republishes it.
        self.client
            .try_publish(topic, QoS::AtMostOnce, retained, payload.into_bytes())
            .map_err(|e| TransportError::Publish {
                topic: topic.to_string(),
                message: e.to_string(),
            })
    }
}
