//! RDT protocol codec for the Net F/T sensor
//!
//! Request format (8 bytes, big-endian):
//!
//! ```text
//! ┌──────────────────┬──────────────────┬───────────────────────┐
//! │ Magic (2 bytes)  │ Command (2 bytes)│ Sample count (4 bytes)│
//! │ 0x1234           │ 2 = start stream │ 0 = stream forever    │
//! └──────────────────┴──────────────────┴───────────────────────┘
//! ```
//!
//! Response format (36 bytes, big-endian):
//!
//! ```text
//! ┌──────────────┬──────────────┬──────────────┬─────────────────────┐
//! │ rdt_sequence │ ft_sequence  │ status       │ ft_data[6]          │
//! │ u32 @ 0      │ u32 @ 4      │ u32 @ 8      │ i32 @ 12,16,...,32  │
//! └──────────────┴──────────────┴──────────────┴─────────────────────┘
//! ```
//!
//! The relay frame written downstream uses the identical layout, but is
//! always re-encoded from the typed [`Sample`] rather than passed through
//! as raw bytes, so the two wire formats stay independent.
//!
//! All multi-byte fields are network byte order on both links. The codec is
//! pure: no I/O, no state.

use crate::error::{Error, Result};

/// Magic header word opening every RDT request
pub const RDT_MAGIC: u16 = 0x1234;

/// Command code that begins real-time data streaming
pub const CMD_START_STREAMING: u16 = 0x0002;

/// Length of an encoded start request
pub const REQUEST_LEN: usize = 8;

/// Length of a device response frame (and of a relay frame)
pub const RESPONSE_LEN: usize = 36;

/// Number of force/torque axes in a sample
pub const NUM_AXES: usize = 6;

/// Raw counts per unit force/torque for this device's calibration.
///
/// Property of the device, not enforced by the codec; exported for display
/// purposes only.
pub const COUNTS_PER_UNIT: i32 = 1_000_000;

/// Axis names in wire order
pub const AXIS_NAMES: [&str; NUM_AXES] = ["Fx", "Fy", "Fz", "Tx", "Ty", "Tz"];

// ===== Response Frame Byte Offsets =====

/// RDT sequence counter offset
pub const OFFSET_RDT_SEQUENCE: usize = 0;
/// F/T sample index offset
pub const OFFSET_FT_SEQUENCE: usize = 4;
/// Status bitmask offset
pub const OFFSET_STATUS: usize = 8;
/// First force/torque axis offset (axes follow at 4-byte strides)
pub const OFFSET_FT_DATA: usize = 12;

/// Start-streaming request sent to the device
///
/// Built once per session and immutable after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartRequest {
    command: u16,
    sample_count: u32,
}

impl StartRequest {
    /// Create a request with an explicit command code
    pub fn new(command: u16, sample_count: u32) -> Self {
        Self {
            command,
            sample_count,
        }
    }

    /// Create a start-streaming request
    ///
    /// `sample_count = 0` streams indefinitely; `N > 0` makes the device
    /// send N samples and then stop on its own.
    pub fn start_streaming(sample_count: u32) -> Self {
        Self::new(CMD_START_STREAMING, sample_count)
    }

    /// Command code carried by this request
    pub fn command(&self) -> u16 {
        self.command
    }

    /// Requested sample count (0 = continuous)
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    /// Encode the request into its 8-byte wire form
    pub fn encode(&self) -> [u8; REQUEST_LEN] {
        let mut frame = [0u8; REQUEST_LEN];
        frame[0..2].copy_from_slice(&RDT_MAGIC.to_be_bytes());
        frame[2..4].copy_from_slice(&self.command.to_be_bytes());
        frame[4..8].copy_from_slice(&self.sample_count.to_be_bytes());
        frame
    }
}

/// One decoded force/torque reading
///
/// Ephemeral: one instance per received frame, not retained after
/// forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sample {
    /// Position of this RDT record within the device's output stream
    pub rdt_sequence: u32,
    /// Device-internal sample index of the F/T record
    pub ft_sequence: u32,
    /// System status bitmask at the time of the record
    pub status: u32,
    /// Force/torque counts in axis order Fx, Fy, Fz, Tx, Ty, Tz
    pub ft_data: [i32; NUM_AXES],
}

impl Sample {
    /// Decode a device response frame
    ///
    /// Requires at least [`RESPONSE_LEN`] bytes; anything shorter fails with
    /// [`Error::FrameTooShort`] and produces no partial sample. Trailing
    /// bytes beyond the frame are ignored.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < RESPONSE_LEN {
            return Err(Error::FrameTooShort {
                expected: RESPONSE_LEN,
                actual: data.len(),
            });
        }

        let mut ft_data = [0i32; NUM_AXES];
        for (axis, value) in ft_data.iter_mut().enumerate() {
            *value = read_i32(data, OFFSET_FT_DATA + axis * 4);
        }

        Ok(Self {
            rdt_sequence: read_u32(data, OFFSET_RDT_SEQUENCE),
            ft_sequence: read_u32(data, OFFSET_FT_SEQUENCE),
            status: read_u32(data, OFFSET_STATUS),
            ft_data,
        })
    }

    /// Encode this sample into its 36-byte relay frame
    ///
    /// Inverse of [`Sample::decode`], re-encoded from the typed fields so no
    /// host-endianness assumption can leak through.
    pub fn encode(&self) -> [u8; RESPONSE_LEN] {
        let mut frame = [0u8; RESPONSE_LEN];
        frame[OFFSET_RDT_SEQUENCE..OFFSET_RDT_SEQUENCE + 4]
            .copy_from_slice(&self.rdt_sequence.to_be_bytes());
        frame[OFFSET_FT_SEQUENCE..OFFSET_FT_SEQUENCE + 4]
            .copy_from_slice(&self.ft_sequence.to_be_bytes());
        frame[OFFSET_STATUS..OFFSET_STATUS + 4].copy_from_slice(&self.status.to_be_bytes());
        for (axis, value) in self.ft_data.iter().enumerate() {
            let offset = OFFSET_FT_DATA + axis * 4;
            frame[offset..offset + 4].copy_from_slice(&value.to_be_bytes());
        }
        frame
    }
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

fn read_i32(data: &[u8], offset: usize) -> i32 {
    i32::from_be_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
