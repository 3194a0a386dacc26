//! Streaming pipeline: device intake, relay egress, session lifecycle

pub mod device;
pub mod relay;
pub mod session;

pub use device::DeviceStream;
pub use relay::RelayLink;
pub use session::{Session, SessionState};
