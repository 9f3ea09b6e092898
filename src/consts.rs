//! Constants used across the link protocol implementation.
//!
//! This module defines the protocol-wide constants for buffer sizing, the
//! acknowledgment exchange, channel selection, and transceiver timing.
//!
//! ## Key Concepts
//!
//! - **ACK marker**: a single reserved byte value acknowledging a data frame.
//! - **Frame overhead**: every length prefix counts two bytes of
//!   radio-appended overhead on top of the payload.
//! - **Channel range**: the transceiver operates on IEEE 802.15.4 channels
//!   11–26 (2405 MHz to 2480 MHz); anything else falls back to channel 11.
//! - **Retry bounds**: how long one attempt waits for an acknowledgment and
//!   how many attempts are made before a send is declared failed.
//!
//! These values should be used wherever framing or buffer logic is
//! implemented to ensure consistent message boundaries.

/// Capacity (in bytes) of the circular receive buffer.
///
/// Also the size of the transceiver's on-die frame buffer, so one frame can
/// never exceed it.
pub const RF_BUFFER_SIZE: usize = 128;

/// Maximum number of retransmissions of a frame before a reliable send is
/// declared failed.
pub const MAX_RETRY: u8 = 10;

/// Number of busy-wait ticks one transmission attempt spends watching for the
/// acknowledgment byte before it is considered timed out.
pub const MAX_RF_WAIT: u32 = 300_000;

/// The reserved acknowledgment marker byte.
///
/// A receiver answers every CRC-valid data frame with a frame carrying this
/// single byte. The value is reserved by the protocol: a payload delivered
/// with this as its oldest unread byte cannot be told apart from an
/// acknowledgment.
pub const ACK_BYTE: u8 = 0x10;

/// Lowest valid IEEE 802.15.4 channel (2405 MHz).
pub const CHANNEL_MIN: u8 = 11;

/// Highest valid IEEE 802.15.4 channel (2480 MHz).
pub const CHANNEL_MAX: u8 = 26;

/// Fallback channel used when an out-of-range channel is requested.
pub const DEFAULT_CHANNEL: u8 = 11;

/// Number of overhead bytes counted by a frame's length prefix on top of the
/// payload (the radio-appended frame check sequence).
pub const FRAME_OVERHEAD: u8 = 2;

/// Maximum size (in bytes) of a user message payload.
///
/// Derived from the buffer capacity minus the per-frame overhead.
pub const MAX_MESSAGE_LEN: usize = RF_BUFFER_SIZE - FRAME_OVERHEAD as usize;

/// Bit of the raw signal-quality byte indicating the received frame passed
/// the transceiver's CRC check.
pub const CRC_VALID_MASK: u8 = 0x80;

/// Fixed backoff (in milliseconds) between retransmission attempts.
pub const RETRY_BACKOFF_MS: u32 = 100;

/// Settling delay (in milliseconds) after a transceiver reset before its
/// state register is trustworthy.
pub const RESET_SETTLE_MS: u32 = 1;
