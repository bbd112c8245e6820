//! Platform Services
//!
//! Time source and user feedback hooks supplied by the board support code.

/// Monotonic millisecond time source
///
/// Readings wrap at 2^32; compare them with [`crate::types::elapsed_ms`].
pub trait Clock {
    /// Milliseconds since an arbitrary origin
    fn now_ms(&self) -> u32;
}

/// Best-effort visual feedback
///
/// Hooks are fire-and-forget and never influence demo behavior.
pub trait Signaling {
    /// A packet was handed to the radio
    fn on_tx(&mut self) {}

    /// A packet was received
    fn on_rx(&mut self) {}

    /// A scan capture started
    fn on_capture_start(&mut self) {}

    /// A scan capture ended
    fn on_capture_stop(&mut self) {}

    /// A continuous carrier started
    fn on_continuous_tx_start(&mut self) {}

    /// A continuous carrier stopped
    fn on_continuous_tx_stop(&mut self) {}
}

/// Signaling sink that ignores every hook
#[derive(Clone, Copy, Debug, Default)]
pub struct NoSignaling;

impl Signaling for NoSignaling {}

/// Clock backed by the embassy time driver
#[cfg(feature = "embedded")]
#[derive(Clone, Copy, Debug, Default)]
pub struct EmbassyClock;

#[cfg(feature = "embedded")]
impl Clock for EmbassyClock {
    #[allow(clippy::cast_possible_truncation)]
    fn now_ms(&self) -> u32 {
        // Truncation gives the same 2^32 wrap the demos expect
        embassy_time::Instant::now().as_millis() as u32
    }
}
