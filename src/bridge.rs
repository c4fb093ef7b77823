//! Bridge core: session state machine, command dispatcher, discovery builder and runner.

pub mod commands;
pub mod discovery;
pub mod runner;
pub mod session;
pub mod snapshot;

pub use commands::CommandOutcome;
pub use session::{BridgeSession, CycleOutcome};
