//! Global interrupt entry points guarded by `critical_section`.
//!
//! The three radio interrupts (receive start, receive end, transmit
//! complete) fire on a context that can preempt the application at any
//! instruction boundary. To share one [`LinkDriver`] between them, the
//! driver is stored in a `critical_section::Mutex` global; every entry
//! point (and every application call site) borrows it inside a critical
//! section, so only one context is ever inside the driver.
//!
//! Handler errors cannot propagate out of an interrupt and are dropped;
//! the protocol's retry machinery covers the resulting lost frames.

use crate::driver::LinkDriver;
use crate::transceiver::{StatusSink, Transceiver};
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::delay::DelayNs;

/// Used to initialize the global static `LinkDriver` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use trx24_link::driver::LinkDriver;
/// use trx24_link::isr::global_link_init;
///
/// static LINK: Mutex<RefCell<Option<LinkDriver<Trx, Delay, Status>>>> =
///     global_link_init::<Trx, Delay, Status>();
/// ```
pub const fn global_link_init<TRX: Transceiver, D: DelayNs, S: StatusSink>()
-> Mutex<RefCell<Option<LinkDriver<TRX, D, S>>>> {
    Mutex::new(RefCell::new(None))
}

/// Stores a constructed driver into the global static.
///
/// # Arguments
/// * The global static `LinkDriver`
/// * The driver, already constructed around the platform's transceiver,
///   delay provider, and status sink
///
/// # Example
/// ```rust,ignore
/// fn main() {
///     let mut link = LinkDriver::new(trx, delay, status);
///     link.enable(15).unwrap();
///     global_link_setup(&LINK, link);
/// }
/// ```
pub fn global_link_setup<TRX: Transceiver, D: DelayNs, S: StatusSink>(
    global_link: &'static Mutex<RefCell<Option<LinkDriver<TRX, D, S>>>>,
    driver: LinkDriver<TRX, D, S>,
) {
    critical_section::with(|cs| {
        let _ = global_link.borrow(cs).replace(Some(driver));
    });
}

/// Receive-start interrupt handler body.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TRX24_RX_START() {
///     global_link_rx_start(&LINK);
/// }
/// ```
pub fn global_link_rx_start<TRX: Transceiver, D: DelayNs, S: StatusSink>(
    global_link: &'static Mutex<RefCell<Option<LinkDriver<TRX, D, S>>>>,
) {
    critical_section::with(|cs| {
        if let Some(driver) = global_link.borrow(cs).borrow_mut().as_mut() {
            let _ = driver.on_rx_start();
        }
    });
}

/// Receive-end interrupt handler body.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TRX24_RX_END() {
///     global_link_rx_end(&LINK);
/// }
/// ```
pub fn global_link_rx_end<TRX: Transceiver, D: DelayNs, S: StatusSink>(
    global_link: &'static Mutex<RefCell<Option<LinkDriver<TRX, D, S>>>>,
) {
    critical_section::with(|cs| {
        if let Some(driver) = global_link.borrow(cs).borrow_mut().as_mut() {
            let _ = driver.on_rx_end();
        }
    });
}

/// Transmit-complete interrupt handler body.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TRX24_TX_END() {
///     global_link_tx_end(&LINK);
/// }
/// ```
pub fn global_link_tx_end<TRX: Transceiver, D: DelayNs, S: StatusSink>(
    global_link: &'static Mutex<RefCell<Option<LinkDriver<TRX, D, S>>>>,
) {
    critical_section::with(|cs| {
        if let Some(driver) = global_link.borrow(cs).borrow_mut().as_mut() {
            driver.on_tx_end();
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{ACK_BYTE, CRC_VALID_MASK};
    use crate::transceiver::mock::MockTransceiver;
    use crate::transceiver::NullStatus;
    use embedded_hal_mock::eh1::delay::NoopDelay;

    static LINK: Mutex<RefCell<Option<LinkDriver<MockTransceiver, NoopDelay, NullStatus>>>> =
        global_link_init::<MockTransceiver, NoopDelay, NullStatus>();

    #[test]
    fn test_global_handlers_drive_the_shared_driver() {
        let mut driver = LinkDriver::new(MockTransceiver::new(), NoopDelay, NullStatus);
        driver.enable(15).unwrap();
        // A two-byte payload plus the two overhead bytes.
        driver.trx.deliver(0, CRC_VALID_MASK, &[b'o', b'k', 0, 0]);
        global_link_setup(&LINK, driver);

        global_link_rx_start(&LINK);
        global_link_rx_end(&LINK);
        global_link_tx_end(&LINK);

        critical_section::with(|cs| {
            let mut slot = LINK.borrow(cs).borrow_mut();
            let driver = slot.as_mut().unwrap();
            assert_eq!(driver.available(), 2);
            assert_eq!(driver.read(), Some(b'o'));
            assert_eq!(driver.read(), Some(b'k'));
            assert!(driver.data_received());
            // The ACK went out through the single-byte primitive and the
            // transmit-complete handler cleared the busy flag.
            assert_eq!(driver.trx.sent_payloads(), vec![vec![ACK_BYTE]]);
            assert!(!driver.link.transmitting);
        });
    }
}
