//! Session lifecycle and the receive/forward loop
//!
//! State machine:
//!
//! ```text
//! Idle → DeviceConnected → [RelayConnected] → Streaming → Terminated
//! ```
//!
//! The relay connection is optional (the single-sample probe runs without
//! one). There is no transition back to an earlier state: once terminated,
//! a new session must be constructed from scratch.
//!
//! The loop is single-threaded and strictly sequential: one blocking
//! receive, optional logging, one blocking write per iteration. A stalled
//! consumer therefore stalls device intake (implicit backpressure). The
//! cancellation flag is polled once per iteration and cannot interrupt an
//! in-flight blocking call.

use crate::error::{Error, Result};
use crate::protocol::StartRequest;
use crate::streaming::device::DeviceStream;
use crate::streaming::relay::RelayLink;
use std::sync::atomic::{AtomicBool, Ordering};

/// Lifecycle states of a streaming session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connections established
    Idle,
    /// Device datagram association established
    DeviceConnected,
    /// Downstream stream connection established
    RelayConnected,
    /// Start request sent, receive/forward loop running
    Streaming,
    /// Session over; both connections closed
    Terminated,
}

/// One streaming session from the device to an optional downstream consumer
///
/// Both sockets are exclusively owned here; no other component touches them.
pub struct Session {
    device: Option<DeviceStream>,
    relay: Option<RelayLink>,
    state: SessionState,
}

impl Session {
    /// Create an idle session
    pub fn new() -> Self {
        Self {
            device: None,
            relay: None,
            state: SessionState::Idle,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Establish the device association (`Idle → DeviceConnected`)
    pub fn connect_device(&mut self, addr: &str) -> Result<()> {
        if self.state != SessionState::Idle {
            return Err(Error::InvalidState("device already connected"));
        }
        self.device = Some(DeviceStream::connect(addr)?);
        self.state = SessionState::DeviceConnected;
        Ok(())
    }

    /// Establish the downstream connection (`DeviceConnected → RelayConnected`)
    pub fn connect_relay(&mut self, addr: &str) -> Result<()> {
        if self.state != SessionState::DeviceConnected {
            return Err(Error::InvalidState("relay requires a connected device"));
        }
        self.relay = Some(RelayLink::connect(addr)?);
        self.state = SessionState::RelayConnected;
        Ok(())
    }

    /// Send the start request and run the receive/forward loop
    ///
    /// Returns the number of samples forwarded. Terminates on the first
    /// fatal error, when the cancellation flag clears between iterations,
    /// or after `request.sample_count()` samples when that count is
    /// non-zero (the device stops sending on its own at that point).
    /// The session ends `Terminated` on every path, with both connections
    /// closed.
    pub fn stream(&mut self, request: &StartRequest, running: &AtomicBool) -> Result<u64> {
        if !matches!(
            self.state,
            SessionState::DeviceConnected | SessionState::RelayConnected
        ) {
            return Err(Error::InvalidState("streaming requires a connected device"));
        }
        let device = match self.device.as_ref() {
            Some(device) => device,
            None => return Err(Error::InvalidState("device socket missing")),
        };

        self.state = SessionState::Streaming;
        let result = Self::run_loop(device, self.relay.as_mut(), request, running);
        self.terminate();
        result
    }

    fn run_loop(
        device: &DeviceStream,
        mut relay: Option<&mut RelayLink>,
        request: &StartRequest,
        running: &AtomicBool,
    ) -> Result<u64> {
        device.start_streaming(request)?;
        log::info!("Streaming started");

        let limit = request.sample_count() as u64;
        let mut forwarded = 0u64;

        loop {
            if !running.load(Ordering::Relaxed) {
                log::info!("Cancellation requested, stopping stream");
                return Ok(forwarded);
            }

            let sample = device.recv_sample()?;
            log::debug!(
                "Sample rdt={} ft={} status=0x{:08X} data={:?}",
                sample.rdt_sequence,
                sample.ft_sequence,
                sample.status,
                sample.ft_data
            );

            if let Some(link) = relay.as_deref_mut() {
                link.forward(&sample)?;
            }
            forwarded += 1;

            // Finite request: the device stops on its own after the last
            // sample, so exit instead of blocking on a silent peer.
            if limit != 0 && forwarded >= limit {
                log::info!("Requested {} samples received, stopping stream", limit);
                return Ok(forwarded);
            }
        }
    }

    /// Close both connections unconditionally (`→ Terminated`)
    ///
    /// Idempotent: safe to call on any state and more than once.
    pub fn terminate(&mut self) {
        if let Some(relay) = self.relay.take() {
            relay.shutdown();
            log::debug!("Relay connection closed");
        }
        if self.device.take().is_some() {
            log::debug!("Device socket closed");
        }
        if self.state != SessionState::Terminated {
            self.state = SessionState::Terminated;
            log::info!("Session terminated");
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.terminate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Sample, REQUEST_LEN, RESPONSE_LEN};
    use std::io::Read;
    use std::net::{TcpListener, UdpSocket};
    use std::thread;
    use std::time::Duration;

    fn test_sample(seq: u32) -> Sample {
        Sample {
            rdt_sequence: seq,
            ft_sequence: seq * 2,
            status: 0,
            ft_data: [seq as i32, -1, 2, -3, 4, -5],
        }
    }

    /// Fake device: waits for the start request, then sends `count` frames
    /// back to whoever asked.
    fn spawn_device(socket: UdpSocket, count: u32) -> thread::JoinHandle<()> {
        thread::spawn(move || {
            let mut request = [0u8; REQUEST_LEN];
            let (received, peer) = socket.recv_from(&mut request).unwrap();
            assert_eq!(received, REQUEST_LEN);
            assert_eq!(&request[0..2], &[0x12, 0x34]);

            for seq in 0..count {
                socket.send_to(&test_sample(seq).encode(), peer).unwrap();
            }
        })
    }

    #[test]
    fn test_forwards_all_frames_in_order() {
        let device_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let device_addr = device_socket.local_addr().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let relay_addr = listener.local_addr().unwrap();

        let consumer = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut frames = Vec::new();
            let mut buf = [0u8; RESPONSE_LEN];
            while stream.read_exact(&mut buf).is_ok() {
                frames.push(Sample::decode(&buf).unwrap());
            }
            frames
        });

        let device = spawn_device(device_socket, 5);

        let mut session = Session::new();
        session.connect_device(&device_addr.to_string()).unwrap();
        session.connect_relay(&relay_addr.to_string()).unwrap();
        assert_eq!(session.state(), SessionState::RelayConnected);

        let running = AtomicBool::new(true);
        let forwarded = session
            .stream(&StartRequest::start_streaming(5), &running)
            .unwrap();

        assert_eq!(forwarded, 5);
        assert_eq!(session.state(), SessionState::Terminated);
        device.join().unwrap();

        // Consumer sees exactly the same samples, same order, then EOF
        let frames = consumer.join().unwrap();
        assert_eq!(frames.len(), 5);
        for (seq, frame) in frames.iter().enumerate() {
            assert_eq!(*frame, test_sample(seq as u32));
        }
    }

    #[test]
    fn test_short_frame_is_fatal() {
        let device_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let device_addr = device_socket.local_addr().unwrap();

        let device = thread::spawn(move || {
            let mut request = [0u8; REQUEST_LEN];
            let (_, peer) = device_socket.recv_from(&mut request).unwrap();
            device_socket.send_to(&[0u8; 10], peer).unwrap();
        });

        let mut session = Session::new();
        session.connect_device(&device_addr.to_string()).unwrap();

        let running = AtomicBool::new(true);
        let result = session.stream(&StartRequest::start_streaming(0), &running);

        match result {
            Err(Error::FrameTooShort { expected, actual }) => {
                assert_eq!(expected, RESPONSE_LEN);
                assert_eq!(actual, 10);
            }
            other => panic!("expected FrameTooShort, got {:?}", other.map(|_| ())),
        }
        assert_eq!(session.state(), SessionState::Terminated);
        device.join().unwrap();
    }

    #[test]
    fn test_cancellation_stops_before_receive() {
        let device_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let device_addr = device_socket.local_addr().unwrap();

        let mut session = Session::new();
        session.connect_device(&device_addr.to_string()).unwrap();

        let running = AtomicBool::new(false);
        let forwarded = session
            .stream(&StartRequest::start_streaming(0), &running)
            .unwrap();

        assert_eq!(forwarded, 0);
        assert_eq!(session.state(), SessionState::Terminated);
    }

    #[test]
    fn test_downstream_close_terminates_session() {
        let device_socket = UdpSocket::bind("127.0.0.1:0").unwrap();
        let device_addr = device_socket.local_addr().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let relay_addr = listener.local_addr().unwrap();

        // Consumer accepts the connection and drops it immediately
        let consumer = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            drop(stream);
        });

        // Device paces its frames so the peer reset is observed well before
        // the request limit is reached
        let device = thread::spawn(move || {
            let mut request = [0u8; REQUEST_LEN];
            let (_, peer) = device_socket.recv_from(&mut request).unwrap();
            for seq in 0..50 {
                let _ = device_socket.send_to(&test_sample(seq).encode(), peer);
                thread::sleep(Duration::from_millis(5));
            }
        });

        let mut session = Session::new();
        session.connect_device(&device_addr.to_string()).unwrap();
        session.connect_relay(&relay_addr.to_string()).unwrap();

        let running = AtomicBool::new(true);
        let result = session.stream(&StartRequest::start_streaming(50), &running);

        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(session.state(), SessionState::Terminated);

        // Cleanup is idempotent: a second terminate must not double-close
        session.terminate();
        assert_eq!(session.state(), SessionState::Terminated);

        consumer.join().unwrap();
        device.join().unwrap();
    }

    #[test]
    fn test_state_transitions_enforced() {
        let mut session = Session::new();
        assert_eq!(session.state(), SessionState::Idle);

        // Relay before device is rejected
        assert!(matches!(
            session.connect_relay("127.0.0.1:1"),
            Err(Error::InvalidState(_))
        ));

        // Streaming from Idle is rejected
        let running = AtomicBool::new(true);
        assert!(matches!(
            session.stream(&StartRequest::start_streaming(0), &running),
            Err(Error::InvalidState(_))
        ));

        // Once terminated there is no way back
        session.terminate();
        assert!(matches!(
            session.connect_device("127.0.0.1:1"),
            Err(Error::InvalidState(_))
        ));
    }
}
