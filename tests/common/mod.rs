//! Test doubles shared by the integration tests: a scripted BMC, a recording
//! publisher and a scripted ipmitool runner. Hardware calls and publications
//! land in one event log so tests can assert their relative order.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::time::Instant;

use pankha_ipmi_bridge::bridge::BridgeSession;
use pankha_ipmi_bridge::error::{AdapterError, TransportError};
use pankha_ipmi_bridge::hardware::types::{
    DeviceIdentity, FanMode, FanPercent, PowerState, RawSensorRow,
};
use pankha_ipmi_bridge::hardware::HardwareAdapter;
use pankha_ipmi_bridge::mqtt::publisher::Publisher;
use pankha_ipmi_bridge::mqtt::topics::Topics;
use pankha_ipmi_bridge::system::executor::{CommandOutput, CommandRunner};

pub const HOST: &str = "10.0.0.5";

#[derive(Debug, Clone, PartialEq)]
pub enum HardwareCall {
    PowerStatus,
    SensorList,
    DeviceInfo,
    SetPower(bool),
    SetFanMode(FanMode),
    SetFanSpeed(u8),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub topic: String,
    pub payload: String,
    pub retained: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Hardware(HardwareCall),
    Publish(Published),
}

#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<(Instant, Event)>>,
}

impl EventLog {
    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push((Instant::now(), event));
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().iter().map(|(_, e)| e.clone()).collect()
    }

    pub fn timed(&self) -> Vec<(Instant, Event)> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<HardwareCall> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Hardware(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    pub fn published(&self) -> Vec<Published> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Publish(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    /// (topic, payload) pairs of retained state publications.
    pub fn states(&self) -> Vec<(String, String)> {
        self.published()
            .into_iter()
            .filter(|p| p.retained)
            .map(|p| (p.topic, p.payload))
            .collect()
    }

    /// Non-retained publications, i.e. discovery documents.
    pub fn announcements(&self) -> Vec<Published> {
        self.published().into_iter().filter(|p| !p.retained).collect()
    }
}

pub fn state(name: &str) -> String {
    format!("ipmi/10_0_0_5/get/{}", name)
}

pub fn command(name: &str) -> String {
    format!("ipmi/10_0_0_5/set/{}", name)
}

pub fn pair(name: &str, payload: &str) -> (String, String) {
    (state(name), payload.to_string())
}

/// BMC whose power state and SDR rows the test controls.
pub struct FakeAdapter {
    log: Arc<EventLog>,
    power: Mutex<Result<PowerState, String>>,
    rows: Mutex<Vec<RawSensorRow>>,
    fail_sensors: Mutex<bool>,
    fail_mutations: Mutex<bool>,
}

impl FakeAdapter {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            power: Mutex::new(Ok(PowerState::On)),
            rows: Mutex::new(Vec::new()),
            fail_sensors: Mutex::new(false),
            fail_mutations: Mutex::new(false),
        }
    }

    pub fn set_power_state(&self, state: PowerState) {
        *self.power.lock().unwrap() = Ok(state);
    }

    pub fn fail_power_status(&self, message: &str) {
        *self.power.lock().unwrap() = Err(message.to_string());
    }

    pub fn set_rows(&self, rows: &[(&str, &str)]) {
        *self.rows.lock().unwrap() = rows
            .iter()
            .map(|(l, r)| RawSensorRow::new(*l, *r))
            .collect();
    }

    pub fn fail_sensors(&self, fail: bool) {
        *self.fail_sensors.lock().unwrap() = fail;
    }

    pub fn fail_mutations(&self, fail: bool) {
        *self.fail_mutations.lock().unwrap() = fail;
    }

    fn mutation(&self, call: HardwareCall) -> Result<(), AdapterError> {
        self.log.push(Event::Hardware(call.clone()));
        if *self.fail_mutations.lock().unwrap() {
            return Err(AdapterError::Failed {
                command: format!("{:?}", call),
                status: "exit status: 1".to_string(),
                output: "Error: command failed".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl HardwareAdapter for FakeAdapter {
    async fn power_status(&self) -> Result<PowerState, AdapterError> {
        self.log.push(Event::Hardware(HardwareCall::PowerStatus));
        self.power
            .lock()
            .unwrap()
            .clone()
            .map_err(|output| AdapterError::Failed {
                command: "ipmitool -c chassis power status".to_string(),
                status: "exit status: 1".to_string(),
                output,
            })
    }

    async fn sensor_list(&self) -> Result<Vec<RawSensorRow>, AdapterError> {
        self.log.push(Event::Hardware(HardwareCall::SensorList));
        if *self.fail_sensors.lock().unwrap() {
            return Err(AdapterError::Timeout {
                command: "ipmitool -c sdr elist all".to_string(),
                secs: 30,
            });
        }
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn device_info(&self) -> Result<DeviceIdentity, AdapterError> {
        self.log.push(Event::Hardware(HardwareCall::DeviceInfo));
        Ok(DeviceIdentity {
            manufacturer: "DELL".to_string(),
            model: "PowerEdge R640".to_string(),
            serial: "7XJ4PQ2".to_string(),
            host: HOST.to_string(),
        })
    }

    async fn set_power(&self, on: bool) -> Result<(), AdapterError> {
        self.mutation(HardwareCall::SetPower(on))
    }

    async fn set_fan_mode(&self, mode: FanMode) -> Result<(), AdapterError> {
        self.mutation(HardwareCall::SetFanMode(mode))
    }

    async fn set_fan_speed(&self, percent: FanPercent) -> Result<(), AdapterError> {
        self.mutation(HardwareCall::SetFanSpeed(percent.value()))
    }
}

pub struct RecordingPublisher {
    log: Arc<EventLog>,
    reject_announcements: Mutex<bool>,
}

impl RecordingPublisher {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            reject_announcements: Mutex::new(false),
        }
    }

    /// Refuse non-retained publications, as a full request queue would.
    pub fn reject_announcements(&self, reject: bool) {
        *self.reject_announcements.lock().unwrap() = reject;
    }
}

#[async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: String,
        retained: bool,
    ) -> Result<(), TransportError> {
        if !retained && *self.reject_announcements.lock().unwrap() {
            return Err(TransportError::Publish {
                topic: topic.to_string(),
                message: "request channel full".to_string(),
            });
        }
        self.log.push(Event::Publish(Published {
            topic: topic.to_string(),
            payload,
            retained,
        }));
        Ok(())
    }
}

/// Publisher whose broker is gone.
pub struct FailingPublisher;

#[async_trait]
impl Publisher for FailingPublisher {
    async fn publish(
        &self,
        topic: &str,
        _payload: String,
        _retained: bool,
    ) -> Result<(), TransportError> {
        Err(TransportError::Publish {
            topic: topic.to_string(),
            message: "request channel full".to_string(),
        })
    }
}

pub struct Harness {
    pub log: Arc<EventLog>,
    pub adapter: Arc<FakeAdapter>,
    pub publisher: Arc<RecordingPublisher>,
    pub session: Arc<BridgeSession>,
}

pub fn harness() -> Harness {
    let log = Arc::new(EventLog::default());
    let adapter = Arc::new(FakeAdapter::new(Arc::clone(&log)));
    let publisher = Arc::new(RecordingPublisher::new(Arc::clone(&log)));
    let session = Arc::new(BridgeSession::new(
        adapter.clone(),
        publisher.clone(),
        Topics::new(HOST, "homeassistant"),
    ));
    Harness {
        log,
        adapter,
        publisher,
        session,
    }
}

/// ipmitool stand-in: answers by the space-joined argument vector.
#[derive(Default)]
pub struct ScriptedRunner {
    responses: HashMap<String, CommandOutput>,
    pub invocations: Mutex<Vec<Vec<String>>>,
}

impl ScriptedRunner {
    pub fn with(mut self, args: &str, output: CommandOutput) -> Self {
        self.responses.insert(args.to_string(), output);
        self
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().unwrap().iter().map(|a| a.join(" ")).collect()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn invoke(&self, args: &[String]) -> Result<CommandOutput, AdapterError> {
        self.invocations.lock().unwrap().push(args.to_vec());
        let key = args.join(" ");
        match self.responses.get(&key) {
            Some(output) => Ok(output.clone()),
            None => Err(AdapterError::Spawn {
                command: format!("ipmitool {}", key),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "ipmitool not found"),
            }),
        }
    }
}
