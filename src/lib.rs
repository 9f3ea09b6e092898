//! # trx24-link
//!
//! A portable, no_std Rust link-layer driver for single-channel, half-duplex
//! 2.4 GHz packet radios with an on-die frame buffer, such as the TRX24
//! transceiver found on the ATmega128RFA1.
//!
//! This driver implements a reliable byte-stream link using:
//! - a [`Transceiver`](transceiver::Transceiver) trait as the seam to the radio peripheral
//! - stop-and-wait ARQ with a one-byte acknowledgment and bounded retries
//! - a fixed-capacity ring buffer for interrupt-to-application data handoff
//! - interrupt-safe access to the globally shared driver with `critical-section`
//!
//! ## Crate features
//! | Feature                 | Description |
//! |-------------------------|-------------|
//! | `std`                   | Disables `#![no_std]` support for host-side testing |
//! | `isr-handlers` (default)| Global ISR entry points guarded by `critical_section::with` |
//! | `defmt-0-3`             | Uses `defmt` logging |
//! | `log`                   | Uses `log` logging |
//!
//! ## Protocol
//!
//! Every frame carries a one-byte length prefix covering the payload plus two
//! bytes of radio-appended overhead. A receiver that accepts a data frame
//! answers with a single reserved byte, `0x10`. The sender busy-polls its
//! receive buffer for that byte, retrying the whole frame up to
//! [`MAX_RETRY`](consts::MAX_RETRY) times before giving up and latching a
//! failure flag for the caller to read.
//!
//! Because the link is half-duplex and single-peer, the reserved byte doubles
//! as a payload value the protocol cannot carry safely: a payload whose oldest
//! unread byte is `0x10` is indistinguishable from an acknowledgment. This is
//! an inherited protocol limitation, not enforced by the types.
//!
//! ## Usage
//!
//! ```ignore
//! use trx24_link::driver::LinkDriver;
//! use trx24_link::transceiver::NullStatus;
//!
//! let mut link = LinkDriver::new(trx, delay, NullStatus);
//! link.enable(15)?;
//!
//! link.send_message(b"hello")?;
//! if link.send_failed() {
//!     // peer never acknowledged
//! }
//!
//! while let Some(byte) = link.read() {
//!     // consume reassembled payload bytes
//! }
//! ```
//!
//! ## Integration Notes
//!
//! - Wire the platform's receive-start, receive-end, and transmit-complete
//!   interrupt vectors to the helpers in [`isr`] (feature `isr-handlers`), or
//!   call [`LinkDriver::service`](driver::LinkDriver::service) from a polling
//!   loop when interrupts are unavailable.
//! - The ACK wait is a busy-poll on the calling context; incoming frames are
//!   drained from the transceiver on every wait iteration so an acknowledgment
//!   arriving mid-wait is always observed.
//! - Only one driver instance should be active at a time in interrupt-driven
//!   mode.
//!
//! --
//! Designed for `#![no_std]` use in resource-constrained embedded environments.

#![deny(
    bad_style,
    dead_code,
    improper_ctypes,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    unconditional_recursion,
    unused,
    while_true,
    missing_debug_implementations,
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_extern_crates,
    unused_import_braces,
    unused_qualifications,
    unused_results
)]
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "isr-handlers")]
pub use critical_section;

#[cfg(not(feature = "std"))]
pub use heapless;

pub mod buffer;
pub mod consts;
pub mod driver;
#[cfg(feature = "isr-handlers")]
pub mod isr;
pub mod transceiver;
