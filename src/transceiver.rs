//! Traits at the seam between the link driver and the radio hardware.
//!
//! The [`Transceiver`] trait models the register-level surface the driver
//! needs from a half-duplex packet radio with an on-die frame buffer: state
//! control, channel selection, frame load/trigger on the transmit side, and
//! frame/signal-quality readout plus event polling on the receive side.
//!
//! State transitions are treated as synchronous register writes; the driver
//! allows a settling delay after [`reset`](Transceiver::reset) and verifies
//! the [`Off`](TrxState::Off) state before configuring the radio.
//!
//! The [`StatusSink`] trait is a one-way notification channel for on-device
//! status output ("radio on" / "radio off"). It is never consumed for control
//! flow; [`NullStatus`] is provided for applications without a display.

/// Operating states of the radio transceiver visible to the driver.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TrxState {
    ///   The transceiver is idle with the analog front end powered down.
    ///   This is the state reached after a reset and the state required
    ///   before reconfiguration.
    #[default]
    Off,
    ///   The frequency synthesizer is (or is settling to) locked. From this
    ///   state a loaded frame can be triggered for transmission.
    PllOn,
    ///   The receiver is listening. Incoming frames raise the receive
    ///   events; this is the driver's resting state.
    RxOn,
}

/// Register-level interface to the radio peripheral.
///
/// Implementations wrap the actual transceiver registers (or a simulation of
/// them). All operations are synchronous; event readout via
/// [`frame_pending`](Transceiver::frame_pending) and
/// [`tx_complete`](Transceiver::tx_complete) must clear the reported event so
/// the driver observes each one exactly once, whether it polls or is driven
/// from interrupt vectors.
pub trait Transceiver {
    /// Error raised by register access.
    type Error: core::fmt::Debug;

    /// Resets the transceiver, returning it to the [`TrxState::Off`] state
    /// and clearing any pending events.
    fn reset(&mut self) -> Result<(), Self::Error>;

    /// Commands a transition to `state`.
    fn set_state(&mut self, state: TrxState) -> Result<(), Self::Error>;

    /// Reads the present operating state.
    fn state(&mut self) -> Result<TrxState, Self::Error>;

    /// Programs the operating channel.
    ///
    /// The driver clamps the channel into the valid range before calling
    /// this, so implementations may assume it is in range.
    fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error>;

    /// Loads an outgoing frame (length prefix first) into the transmit
    /// buffer.
    fn load_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Starts transmission of the loaded frame.
    fn trigger_tx(&mut self) -> Result<(), Self::Error>;

    /// Copies the received frame into `buf` and returns its length as
    /// reported by the radio (payload plus frame overhead).
    fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;

    /// Reads the raw signal-quality byte for the frame being received.
    ///
    /// Bit [`CRC_VALID_MASK`](crate::consts::CRC_VALID_MASK) reports whether
    /// the frame check sequence was valid.
    fn signal_quality(&mut self) -> Result<u8, Self::Error>;

    /// Whether a complete received frame is waiting to be read out.
    ///
    /// Clears the event when it reports `true`.
    fn frame_pending(&mut self) -> Result<bool, Self::Error>;

    /// Whether the in-flight transmission has physically completed.
    ///
    /// Clears the event when it reports `true`.
    fn tx_complete(&mut self) -> Result<bool, Self::Error>;
}

/// One-way status notifications for an on-device display.
///
/// Purely informational; the driver never reads anything back.
pub trait StatusSink {
    /// The radio has been initialized and is listening.
    fn radio_on(&mut self) {}

    /// The radio has been powered down.
    fn radio_off(&mut self) {}
}

/// A [`StatusSink`] that discards all notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullStatus;

impl StatusSink for NullStatus {}

#[cfg(test)]
pub(crate) mod mock {
    //! A scripted transceiver used by the driver tests.

    use super::{Transceiver, TrxState};
    use std::collections::VecDeque;
    use std::vec::Vec;

    /// A frame scheduled to "arrive" after a number of event polls.
    #[derive(Debug, Clone)]
    pub struct Incoming {
        pub after_polls: u32,
        pub quality: u8,
        pub frame: Vec<u8>,
    }

    /// Records every register interaction and plays back scripted arrivals.
    #[derive(Debug, Default)]
    pub struct MockTransceiver {
        pub state: TrxState,
        pub channel: u8,
        pub resets: usize,
        /// When set, the state register never reports `Off` after a reset.
        pub stuck_on: bool,
        /// Every frame loaded into the transmit buffer, length prefix included.
        pub loaded: Vec<Vec<u8>>,
        pub triggers: usize,
        tx_done: bool,
        incoming: VecDeque<Incoming>,
    }

    impl MockTransceiver {
        pub fn new() -> Self {
            Self::default()
        }

        /// Schedules a frame to become pending after `after_polls` calls to
        /// `frame_pending`. `frame` is the raw frame buffer content, whose
        /// length is what the radio reports (payload plus overhead).
        pub fn deliver(&mut self, after_polls: u32, quality: u8, frame: &[u8]) {
            self.incoming.push_back(Incoming {
                after_polls,
                quality,
                frame: frame.to_vec(),
            });
        }

        /// Payloads of every transmitted frame, without the length prefix.
        pub fn sent_payloads(&self) -> Vec<Vec<u8>> {
            self.loaded.iter().map(|f| f[1..].to_vec()).collect()
        }
    }

    impl Transceiver for MockTransceiver {
        type Error = core::convert::Infallible;

        fn reset(&mut self) -> Result<(), Self::Error> {
            self.resets += 1;
            self.tx_done = false;
            if !self.stuck_on {
                self.state = TrxState::Off;
            }
            Ok(())
        }

        fn set_state(&mut self, state: TrxState) -> Result<(), Self::Error> {
            self.state = state;
            Ok(())
        }

        fn state(&mut self) -> Result<TrxState, Self::Error> {
            Ok(self.state)
        }

        fn set_channel(&mut self, channel: u8) -> Result<(), Self::Error> {
            self.channel = channel;
            Ok(())
        }

        fn load_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
            self.loaded.push(frame.to_vec());
            Ok(())
        }

        fn trigger_tx(&mut self) -> Result<(), Self::Error> {
            self.triggers += 1;
            self.tx_done = true;
            Ok(())
        }

        fn read_frame(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let frame = self.incoming.pop_front().expect("no frame pending");
            buf[..frame.frame.len()].copy_from_slice(&frame.frame);
            Ok(frame.frame.len())
        }

        fn signal_quality(&mut self) -> Result<u8, Self::Error> {
            Ok(self.incoming.front().map(|f| f.quality).unwrap_or(0))
        }

        fn frame_pending(&mut self) -> Result<bool, Self::Error> {
            match self.incoming.front_mut() {
                Some(front) if front.after_polls == 0 => Ok(true),
                Some(front) => {
                    front.after_polls -= 1;
                    Ok(false)
                }
                None => Ok(false),
            }
        }

        fn tx_complete(&mut self) -> Result<bool, Self::Error> {
            Ok(core::mem::take(&mut self.tx_done))
        }
    }
}
