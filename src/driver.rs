//! Reliable link driver for half-duplex packet radios.
//!
//! This module provides the [`LinkDriver`] struct, which implements a
//! stop-and-wait ARQ byte-stream link over a [`Transceiver`]. Outgoing
//! messages are framed with a one-byte length prefix and retransmitted until
//! the peer's one-byte acknowledgment is observed or the retry bound is
//! exhausted. Incoming frames are reassembled by the receive handlers into a
//! circular buffer consumable through [`read()`](LinkDriver::read).
//!
//! ## Execution contexts
//!
//! Three contexts touch the driver: the application call stack running
//! [`send_message()`](LinkDriver::send_message) or the read API, and the
//! platform's receive-start/receive-end and transmit-complete interrupts,
//! which enter through [`on_rx_start()`](LinkDriver::on_rx_start),
//! [`on_rx_end()`](LinkDriver::on_rx_end) and
//! [`on_tx_end()`](LinkDriver::on_tx_end). In interrupt-driven builds the
//! driver lives in a `critical_section` global (see [`crate::isr`]) so only
//! one context is ever inside it.
//!
//! The acknowledgment wait is a busy-poll on the calling context. Since the
//! calling context holds the driver for the whole wait, pending radio events
//! are drained from the transceiver's event flags on every iteration via
//! [`service()`](LinkDriver::service). This is the load-bearing property:
//! without it, no incoming acknowledgment could ever be observed mid-send.
//!
//! ## Design Notes
//!
//! The acknowledgment marker [`ACK_BYTE`] is a reserved value inside the
//! payload byte space. The send path's poll loop and the receive handler both
//! treat the oldest unread buffer byte equal to `0x10` as an acknowledgment,
//! so the caller must drain buffered payload before starting a reliable send
//! and must read the failure flag immediately after it returns.

use crate::buffer::RingBuffer;
use crate::consts::{
    ACK_BYTE, CHANNEL_MAX, CHANNEL_MIN, CRC_VALID_MASK, DEFAULT_CHANNEL, FRAME_OVERHEAD,
    MAX_MESSAGE_LEN, MAX_RETRY, MAX_RF_WAIT, RESET_SETTLE_MS, RETRY_BACKOFF_MS, RF_BUFFER_SIZE,
};
use crate::transceiver::{StatusSink, Transceiver, TrxState};
use embedded_hal::delay::DelayNs;
use nb::block;
use thiserror::Error;

#[cfg(not(feature = "std"))]
use heapless::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

/// Errors surfaced by the driver.
///
/// Everything else in the protocol terminates locally: a clamped channel, a
/// silently dropped frame, or the sticky failure flag after a reliable send.
#[derive(Debug, Error)]
pub enum LinkError<E> {
    /// The transceiver did not reach the off state after a reset during
    /// initialization or power-down.
    #[error("transceiver did not reach the off state")]
    TransceiverNotOff,
    /// The payload exceeds [`MAX_MESSAGE_LEN`].
    #[error("message exceeds the maximum payload length")]
    MessageTooLong,
    /// A transceiver register access failed.
    #[error("transceiver register access failed")]
    Transceiver(#[from] E),
}

/// Flags and counters shared between the send path and the interrupt
/// handlers.
///
/// Each field is written by exactly one responsible context: the send path
/// owns the retry machinery and outcome flags, the receive-start interrupt
/// writes `signal_quality`, the receive-end interrupt sets `data_received`,
/// and the transmit-complete interrupt clears `transmitting`.
#[derive(Debug, Default)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LinkState {
    /// Attempts made for the current reliable send, bounded by [`MAX_RETRY`].
    pub retry_count: u8,
    /// Busy-wait ticks since the last transmission attempt, compared against
    /// [`MAX_RF_WAIT`].
    pub send_timeout: u32,
    /// The current send observed its acknowledgment. Reset before the send
    /// returns; only `failed` is left for the caller.
    pub acknowledged: bool,
    /// The last reliable send exhausted its retries without an
    /// acknowledgment. Sticky: read it immediately after the send call,
    /// before the next one resets it.
    pub failed: bool,
    /// A transmission is physically in flight. Set by the single-byte send
    /// primitive, cleared by the transmit-complete interrupt.
    pub transmitting: bool,
    /// Raw signal-quality byte latched by the receive-start interrupt and
    /// consumed by the receive-end interrupt.
    pub signal_quality: u8,
    /// A CRC-valid data frame has been appended to the receive buffer.
    /// Cleared by [`LinkDriver::take_data_received`].
    pub data_received: bool,
}

/// A reliable stop-and-wait link over a half-duplex packet radio.
///
/// `LinkDriver` owns the transceiver, a delay provider for the post-reset
/// settling time and retry backoff, a [`StatusSink`] for one-way display
/// notifications, the circular receive buffer, and the shared link state.
///
/// ## Type Parameters
///
/// - `TRX`: the radio peripheral, implementing [`Transceiver`]
/// - `D`: a delay provider implementing [`embedded_hal::delay::DelayNs`]
/// - `S`: the status notification sink
///
/// ## Notes
///
/// - [`enable()`](LinkDriver::enable) must succeed before any send or
///   receive operation is meaningful.
/// - A second reliable send must not be issued from another context while
///   one is in progress; the driver assumes a single outstanding frame.
#[derive(Debug)]
pub struct LinkDriver<TRX, D, S>
where
    TRX: Transceiver,
    D: DelayNs,
    S: StatusSink,
{
    /// The radio peripheral.
    pub trx: TRX,
    /// The status notification sink.
    pub status: S,
    /// Shared flags and counters, see [`LinkState`].
    pub link: LinkState,
    delay: D,
    rx_buf: RingBuffer,
    channel: u8,
}

impl<TRX, D, S> LinkDriver<TRX, D, S>
where
    TRX: Transceiver,
    D: DelayNs,
    S: StatusSink,
{
    /// Creates a new driver around a transceiver, delay provider, and status
    /// sink. Does not touch the hardware; call
    /// [`enable()`](LinkDriver::enable) to initialize the radio.
    pub fn new(trx: TRX, delay: D, status: S) -> Self {
        Self {
            trx,
            delay,
            status,
            link: LinkState::default(),
            rx_buf: RingBuffer::new(),
            channel: DEFAULT_CHANNEL,
        }
    }

    /// Initializes the radio and enters the receive-listening state.
    ///
    /// Zeroes the receive buffer and all link state, resets the transceiver,
    /// waits out the settling delay, and verifies the off state before
    /// programming the channel and switching to [`TrxState::RxOn`].
    ///
    /// `channel` is clamped to the valid range 11–26; out-of-range requests
    /// silently fall back to channel 11 rather than failing.
    ///
    /// # Errors
    /// - [`LinkError::TransceiverNotOff`] if the radio did not reach its
    ///   idle state after the reset. Not retried.
    pub fn enable(&mut self, channel: u8) -> Result<(), LinkError<TRX::Error>> {
        self.rx_buf.clear();
        self.link = LinkState::default();

        self.trx.reset()?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        if self.trx.state()? != TrxState::Off {
            return Err(LinkError::TransceiverNotOff);
        }

        self.channel = clamp_channel(channel);
        self.trx.set_channel(self.channel)?;
        self.trx.set_state(TrxState::RxOn)?;

        self.status.radio_on();
        #[cfg(feature = "log")]
        log::info!("radio on, channel {}", self.channel);
        #[cfg(feature = "defmt-0-3")]
        defmt::info!("radio on, channel {}", self.channel);
        Ok(())
    }

    /// Powers the radio down.
    ///
    /// Resets the receive cursors (contents become invisible, not cleared)
    /// and returns the transceiver to the off state.
    ///
    /// # Errors
    /// - [`LinkError::TransceiverNotOff`] if the radio did not reach its
    ///   idle state.
    pub fn disable(&mut self) -> Result<(), LinkError<TRX::Error>> {
        self.rx_buf.reset();

        self.trx.reset()?;
        self.trx.set_state(TrxState::Off)?;
        self.delay.delay_ms(RESET_SETTLE_MS);
        if self.trx.state()? != TrxState::Off {
            return Err(LinkError::TransceiverNotOff);
        }

        self.status.radio_off();
        #[cfg(feature = "log")]
        log::info!("radio off");
        #[cfg(feature = "defmt-0-3")]
        defmt::info!("radio off");
        Ok(())
    }

    /// The effective (post-clamp) operating channel.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Number of received payload bytes ready to be read.
    pub fn available(&self) -> usize {
        self.rx_buf.available()
    }

    /// Reads the oldest unread payload byte, or `None` if the buffer is
    /// empty. Never blocks.
    pub fn read(&mut self) -> Option<u8> {
        self.rx_buf.read()
    }

    /// Whether a CRC-valid data frame has arrived since the flag was last
    /// taken.
    pub fn data_received(&self) -> bool {
        self.link.data_received
    }

    /// Returns and clears the data-received flag.
    pub fn take_data_received(&mut self) -> bool {
        core::mem::take(&mut self.link.data_received)
    }

    /// Whether the last reliable send exhausted its retries without an
    /// acknowledgment.
    ///
    /// Read this immediately after [`send_message()`](LinkDriver::send_message)
    /// returns; the next send resets it.
    pub fn send_failed(&self) -> bool {
        self.link.failed
    }

    /// Transmits a single byte, fire-and-forget.
    ///
    /// Builds a three-byte frame (length prefix, the byte, radio-appended
    /// overhead), waits for phase lock and for any in-flight transmission to
    /// complete, triggers the transmission, and immediately returns the
    /// radio to the receive-listening state. Does not wait for completion or
    /// acknowledgment; `transmitting` is cleared later by the
    /// transmit-complete interrupt.
    pub fn send_byte(&mut self, byte: u8) -> Result<(), LinkError<TRX::Error>> {
        self.trx.set_state(TrxState::PllOn)?;
        block!(self.pll_locked())?;

        // Wait out an in-flight transmission before reusing the frame buffer.
        while self.link.transmitting {
            if self.trx.tx_complete()? {
                self.on_tx_end();
            }
        }

        self.trx.load_frame(&[1 + FRAME_OVERHEAD, byte])?;
        self.trx.trigger_tx()?;
        self.link.transmitting = true;

        self.trx.set_state(TrxState::RxOn)?;
        Ok(())
    }

    /// Sends a payload reliably with stop-and-wait ARQ.
    ///
    /// The frame is transmitted and the receive buffer is busy-polled for
    /// the acknowledgment byte, up to [`MAX_RF_WAIT`] ticks per attempt and
    /// [`MAX_RETRY`] retransmissions, with a fixed backoff between attempts.
    /// Pending radio events are drained on every wait iteration, so an
    /// acknowledgment arriving mid-wait is observed and consumed.
    ///
    /// The outcome is reported through the sticky failure flag: call
    /// [`send_failed()`](LinkDriver::send_failed) immediately after this
    /// returns. `Ok(())` only means the protocol ran to completion.
    ///
    /// # Errors
    /// - [`LinkError::MessageTooLong`] if `bytes` exceeds
    ///   [`MAX_MESSAGE_LEN`].
    pub fn send_message(&mut self, bytes: &[u8]) -> Result<(), LinkError<TRX::Error>> {
        if bytes.len() > MAX_MESSAGE_LEN {
            return Err(LinkError::MessageTooLong);
        }

        self.link.acknowledged = false;
        self.link.failed = false;
        self.link.retry_count = 0;

        #[cfg(not(feature = "std"))]
        let mut frame: Vec<u8, RF_BUFFER_SIZE> = Vec::new();
        #[cfg(feature = "std")]
        let mut frame: Vec<u8> = Vec::new();
        let _ = frame.push(bytes.len() as u8 + FRAME_OVERHEAD);
        #[cfg(not(feature = "std"))]
        let _ = frame.extend_from_slice(bytes);
        #[cfg(feature = "std")]
        frame.extend_from_slice(bytes);

        while self.link.retry_count <= MAX_RETRY && !self.link.acknowledged {
            self.trx.set_state(TrxState::PllOn)?;
            block!(self.pll_locked())?;
            self.trx.load_frame(&frame)?;
            self.trx.trigger_tx()?;
            self.trx.set_state(TrxState::RxOn)?;

            self.link.send_timeout = 0;
            while self.rx_buf.peek() != Some(ACK_BYTE) && self.link.send_timeout < MAX_RF_WAIT {
                self.service()?;
                self.link.send_timeout += 1;
            }

            if self.link.send_timeout >= MAX_RF_WAIT {
                // Timed out without seeing the acknowledgment; back off and
                // retransmit without consuming anything from the buffer.
                self.link.retry_count += 1;
                self.delay.delay_ms(RETRY_BACKOFF_MS);
                continue;
            }

            // Acknowledgment observed: consume exactly that byte.
            let _ = self.rx_buf.read();
            self.link.acknowledged = true;
        }

        self.trx.set_state(TrxState::RxOn)?;

        if self.link.retry_count >= MAX_RETRY && !self.link.acknowledged {
            self.link.failed = true;
            #[cfg(feature = "log")]
            log::warn!("send failed after {} attempts", self.link.retry_count);
            #[cfg(feature = "defmt-0-3")]
            defmt::warn!("send failed after {} attempts", self.link.retry_count);
        }

        self.link.retry_count = 0;
        self.link.acknowledged = false;
        Ok(())
    }

    /// Drains the transceiver's pending events.
    ///
    /// Invoked on every acknowledgment-wait iteration, and usable as the
    /// main loop body of applications that run without interrupt vectors.
    pub fn service(&mut self) -> Result<(), LinkError<TRX::Error>> {
        if self.trx.tx_complete()? {
            self.on_tx_end();
        }
        if self.trx.frame_pending()? {
            self.on_rx_start()?;
            self.on_rx_end()?;
        }
        Ok(())
    }

    /// Receive-start interrupt entry point.
    ///
    /// Latches the raw signal-quality reading for the frame now arriving; no
    /// buffer interaction.
    pub fn on_rx_start(&mut self) -> Result<(), LinkError<TRX::Error>> {
        self.link.signal_quality = self.trx.signal_quality()?;
        Ok(())
    }

    /// Receive-end interrupt entry point; fires when a full frame has
    /// arrived.
    ///
    /// CRC-invalid frames are discarded silently, with no buffer write and
    /// no acknowledgment, so the sender times out and retries. For valid
    /// frames the payload (length minus overhead) is appended to the receive
    /// buffer, truncating silently if the buffer fills (drop-newest). If the
    /// oldest unread byte is then not the acknowledgment marker, the frame
    /// was genuine data: a single [`ACK_BYTE`] is transmitted back and the
    /// data-received flag is set. If it is the marker, the frame was the
    /// peer's acknowledgment and the send path's poll loop will consume it.
    pub fn on_rx_end(&mut self) -> Result<(), LinkError<TRX::Error>> {
        if self.link.signal_quality & CRC_VALID_MASK == 0 {
            #[cfg(feature = "log")]
            log::debug!("dropping frame, crc invalid");
            #[cfg(feature = "defmt-0-3")]
            defmt::debug!("dropping frame, crc invalid");
            return Ok(());
        }

        let mut scratch = [0u8; RF_BUFFER_SIZE];
        let length = self.trx.read_frame(&mut scratch)?;
        let payload_len = length.saturating_sub(FRAME_OVERHEAD as usize);

        for &byte in &scratch[..payload_len] {
            if self.rx_buf.is_full() {
                break;
            }
            self.rx_buf.write(byte);
        }

        match self.rx_buf.peek() {
            // The oldest unread byte is the peer's acknowledgment; the
            // polling loop in the send path handles it.
            Some(ACK_BYTE) => {}
            Some(_) => {
                self.send_byte(ACK_BYTE)?;
                self.link.data_received = true;
            }
            // Nothing buffered (empty payload): nothing to acknowledge.
            None => {}
        }
        Ok(())
    }

    /// Transmit-complete interrupt entry point.
    ///
    /// Sole effect: clears the `transmitting` flag, allowing the next frame
    /// to reuse the transmit buffer.
    pub fn on_tx_end(&mut self) {
        self.link.transmitting = false;
    }

    fn pll_locked(&mut self) -> nb::Result<(), TRX::Error> {
        match self.trx.state().map_err(nb::Error::Other)? {
            TrxState::PllOn => Ok(()),
            _ => Err(nb::Error::WouldBlock),
        }
    }
}

fn clamp_channel(channel: u8) -> u8 {
    if !(CHANNEL_MIN..=CHANNEL_MAX).contains(&channel) {
        DEFAULT_CHANNEL
    } else {
        channel
    }
}
