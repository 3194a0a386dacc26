//! Downstream TCP egress
//!
//! Owns the reliable stream connection to the consumer. Each sample is
//! independently re-encoded into its 36-byte relay frame and written in one
//! logical operation. A write failure (partial write, reset connection) is
//! fatal for the session; there is no local buffering or retry.

use crate::error::{Error, Result};
use crate::protocol::Sample;
use std::io::Write;
use std::net::{Shutdown, TcpStream};

/// TCP connection to the downstream consumer
pub struct RelayLink {
    stream: TcpStream,
}

impl RelayLink {
    /// Connect to the downstream consumer before streaming begins
    pub fn connect(addr: &str) -> Result<Self> {
        let stream = TcpStream::connect(addr)
            .map_err(|e| Error::Setup(format!("Failed to connect downstream {}: {}", addr, e)))?;

        log::info!("Relay connection established with {}", addr);
        Ok(Self { stream })
    }

    /// Re-encode a sample and write all 36 bytes downstream
    pub fn forward(&mut self, sample: &Sample) -> Result<()> {
        self.stream.write_all(&sample.encode())?;
        Ok(())
    }

    /// Shut down both directions of the connection (best-effort)
    pub fn shutdown(&self) {
        let _ = self.stream.shutdown(Shutdown::Both);
    }
}
