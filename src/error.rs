//! Error types: adapter, validation, transport and configuration failures.

use thiserror::Error;

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

/// `ipmitool` could not be run, failed, or printed something we cannot read.
#[derive(Error, Debug)]
pub enum AdapterError {
    /// The process could not be spawned at all (binary missing, permissions).
    #[error("Failed to execute {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit status. `output` holds stdout and stderr for diagnostics.
    #[error("{command} exited with {status}: {output}")]
    Failed {
        command: String,
        status: String,
        output: String,
    },

    /// The BMC did not answer within the configured timeout.
    #[error("{command} timed out after {secs}s")]
    Timeout { command: String, secs: u64 },

    /// Output did not contain what we expected.
    #[error("Could not parse {what} from ipmitool output: {output}")]
    Parse { what: String, output: String },
}

impl AdapterError {
    pub fn parse(what: impl Into<String>, output: impl Into<String>) -> Self {
        Self::Parse {
            what: what.into(),
            output: output.into(),
        }
    }
}

/// Malformed inbound command payload. The command is dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Fan speed payload '{0}' is not an integer")]
    NotAnInteger(String),

    #[error("Fan speed {0}% is outside 0-100")]
    PercentOutOfRange(i64),
}

/// Publish or subscribe failure on the MQTT side.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to publish to {topic}: {message}")]
    Publish { topic: String, message: String },

    #[error("Failed to subscribe to {topic}: {message}")]
    Subscribe { topic: String, message: String },
}

/// Invalid startup configuration. Fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("IPMI_SERVER must be provided (target BMC host address)")]
    MissingHost,

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

impl ConfigError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Umbrella error for poll cycles and command handling. Configuration errors
/// stay separate: they only occur at startup and end the process.
#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Adapter error: {0}")]
    Adapter(#[from] AdapterError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
