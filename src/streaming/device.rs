//! Device-facing UDP intake
//!
//! Owns the datagram association with the Net F/T device: sends the single
//! start request, then performs one blocking receive per loop iteration,
//! expecting exactly one 36-byte response frame per datagram.
//!
//! Failures are fatal by design: a short datagram or receive error ends the
//! stream. There is no retry, no re-send of the start request, and no
//! reconnection attempt. Sequence gaps and duplicates pass through
//! unvalidated.

use crate::error::{Error, Result};
use crate::protocol::{Sample, StartRequest, RESPONSE_LEN};
use std::net::{SocketAddr, UdpSocket};

/// UDP association with the Net F/T device
pub struct DeviceStream {
    socket: UdpSocket,
}

impl DeviceStream {
    /// Establish the datagram association with the device
    ///
    /// Binds an ephemeral local port and connects it to the device endpoint
    /// so plain `send`/`recv` can be used and stray datagrams from other
    /// peers are filtered by the kernel.
    pub fn connect(addr: &str) -> Result<Self> {
        let socket = UdpSocket::bind("0.0.0.0:0")
            .map_err(|e| Error::Setup(format!("Failed to create UDP socket: {}", e)))?;
        socket
            .connect(addr)
            .map_err(|e| Error::Setup(format!("Failed to associate with device {}: {}", addr, e)))?;

        log::info!("Device association established with {}", addr);
        Ok(Self { socket })
    }

    /// Send the encoded start request to begin streaming
    pub fn start_streaming(&self, request: &StartRequest) -> Result<()> {
        self.socket.send(&request.encode())?;
        log::debug!(
            "Start request sent: command=0x{:04X} sample_count={}",
            request.command(),
            request.sample_count()
        );
        Ok(())
    }

    /// Block until the next response frame arrives and decode it
    ///
    /// Expects exactly [`RESPONSE_LEN`] bytes; oversized datagrams are
    /// truncated to the frame length, undersized ones fail with
    /// [`Error::FrameTooShort`].
    pub fn recv_sample(&self) -> Result<Sample> {
        let mut frame = [0u8; RESPONSE_LEN];
        let received = self.socket.recv(&mut frame)?;
        if received < RESPONSE_LEN {
            return Err(Error::FrameTooShort {
                expected: RESPONSE_LEN,
                actual: received,
            });
        }
        Sample::decode(&frame)
    }

    /// Local address of the bound socket
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }
}
