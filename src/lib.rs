//! NetFT Relay - bridge a Net F/T sensor's RDT stream to a TCP consumer
//!
//! Reads the force/torque stream once over UDP and fans it out to a
//! downstream process over TCP, so that process never has to speak the
//! device protocol itself.

pub mod config;
pub mod error;
pub mod protocol;
pub mod streaming;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
pub use protocol::{Sample, StartRequest};
