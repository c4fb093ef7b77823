mod common;

use common::{ScriptedRunner, HOST};
use pankha_ipmi_bridge::error::AdapterError;
use pankha_ipmi_bridge::hardware::types::{FanMode, FanPercent, PowerState, RawSensorRow};
use pankha_ipmi_bridge::hardware::{HardwareAdapter, IpmiAdapter};
use pankha_ipmi_bridge::system::executor::CommandOutput;

const POWER_STATUS: &str = "-c chassis power status";

const SDR: &str = "Fan1,3360,RPM,ok,7.1,
Fan Redundancy,0,unspecified,ok,7.1,Fully Redundant
Inlet Temp,21,degrees C,ok,7.1,
Temp,na,degrees C,ns,3.1,
Pwr Consumption,84,Watts,ok,7.1,
";

const FRU: &str = "FRU Device Description : Builtin FRU Device (ID 0)
 Board Mfg Date        : Mon Feb 26 14:29:00 2018
 Board Mfg             : DELL
 Product Manufacturer  : DELL
 Product Name          : PowerEdge R640
 Product Serial        : 7XJ4PQ2
";

fn adapter(runner: ScriptedRunner) -> IpmiAdapter<ScriptedRunner> {
    IpmiAdapter::new(runner, HOST)
}

#[tokio::test]
async fn power_status_states() {
    let on = adapter(
        ScriptedRunner::default().with(POWER_STATUS, CommandOutput::ok("Chassis Power is on\n")),
    );
    assert_eq!(on.power_status().await.unwrap(), PowerState::On);

    let off = adapter(
        ScriptedRunner::default().with(POWER_STATUS, CommandOutput::ok("Chassis Power is off\n")),
    );
    assert_eq!(off.power_status().await.unwrap(), PowerState::Off);
}

#[tokio::test]
async fn unreachable_bmc_is_a_state_not_an_error() {
    let runner = ScriptedRunner::default().with(
        POWER_STATUS,
        CommandOutput::failed("Error: Unable to establish IPMI v2 / RMCP+ session\n"),
    );
    assert_eq!(adapter(runner).power_status().await.unwrap(), PowerState::Unreachable);
}

#[tokio::test]
async fn other_power_status_failures_are_errors() {
    let runner = ScriptedRunner::default().with(
        POWER_STATUS,
        CommandOutput::failed("Error: Unable to get Chassis Power Status\n"),
    );
    match adapter(runner).power_status().await {
        Err(AdapterError::Failed { command, output, .. }) => {
            assert_eq!(command, "ipmitool -c chassis power status");
            assert!(output.contains("Unable to get Chassis Power Status"));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[tokio::test]
async fn spawn_failure_propagates() {
    let result = adapter(ScriptedRunner::default()).power_status().await;
    assert!(matches!(result, Err(AdapterError::Spawn { .. })));
}

#[tokio::test]
async fn sensor_list_returns_label_and_reading_in_order() {
    let runner = ScriptedRunner::default().with("-c sdr elist all", CommandOutput::ok(SDR));
    let rows = adapter(runner).sensor_list().await.unwrap();

    assert_eq!(
        rows,
        vec![
            RawSensorRow::new("Fan1", "3360"),
            RawSensorRow::new("Fan Redundancy", "0"),
            RawSensorRow::new("Inlet Temp", "21"),
            RawSensorRow::new("Temp", "na"),
            RawSensorRow::new("Pwr Consumption", "84"),
        ]
    );
}

#[tokio::test]
async fn sensor_list_failure_is_an_error() {
    let runner = ScriptedRunner::default()
        .with("-c sdr elist all", CommandOutput::failed("Error: timeout\n"));
    assert!(matches!(
        adapter(runner).sensor_list().await,
        Err(AdapterError::Failed { .. })
    ));
}

#[tokio::test]
async fn device_info_reads_product_fields() {
    let runner = ScriptedRunner::default().with("-c fru print 0", CommandOutput::ok(FRU));
    let identity = adapter(runner).device_info().await.unwrap();

    assert_eq!(identity.manufacturer, "DELL");
    assert_eq!(identity.model, "PowerEdge R640");
    assert_eq!(identity.serial, "7XJ4PQ2");
    assert_eq!(identity.host, HOST);
}

#[tokio::test]
async fn device_info_without_serial_is_a_parse_error() {
    let fru = "Product Manufacturer  : DELL\nProduct Name          : PowerEdge R640\n";
    let runner = ScriptedRunner::default().with("-c fru print 0", CommandOutput::ok(fru));
    assert!(matches!(
        adapter(runner).device_info().await,
        Err(AdapterError::Parse { .. })
    ));
}

#[tokio::test]
async fn mutations_use_fixed_argument_templates() {
    let runner = ScriptedRunner::default()
        .with("chassis power on", CommandOutput::ok("Chassis Power Control: Up/On\n"))
        .with("chassis power off", CommandOutput::ok("Chassis Power Control: Down/Off\n"))
        .with("raw 0x30 0x30 0x01 0x01", CommandOutput::ok(""))
        .with("raw 0x30 0x30 0x01 0x00", CommandOutput::ok(""))
        .with("raw 0x30 0x30 0x02 0xff 0x2d", CommandOutput::ok(""));
    let adapter = adapter(runner);

    adapter.set_power(true).await.unwrap();
    adapter.set_power(false).await.unwrap();
    adapter.set_fan_mode(FanMode::Auto).await.unwrap();
    adapter.set_fan_mode(FanMode::Manual).await.unwrap();
    adapter.set_fan_speed(FanPercent::try_from(45i64).unwrap()).await.unwrap();

    assert_eq!(
        adapter_invocations(&adapter),
        vec![
            "chassis power on",
            "chassis power off",
            "raw 0x30 0x30 0x01 0x01",
            "raw 0x30 0x30 0x01 0x00",
            "raw 0x30 0x30 0x02 0xff 0x2d",
        ]
    );
}

#[tokio::test]
async fn failed_mutation_is_an_error() {
    let runner = ScriptedRunner::default().with(
        "chassis power on",
        CommandOutput::failed("Error: Unable to set Chassis Power Control\n"),
    );
    assert!(adapter(runner).set_power(true).await.is_err());
}

fn adapter_invocations(adapter: &IpmiAdapter<ScriptedRunner>) -> Vec<String> {
    adapter.runner().invocations()
}
