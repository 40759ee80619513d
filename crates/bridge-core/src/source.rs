//! Seam between the acquisition loop and a concrete sample source

use crate::error::BridgeResult;
use async_trait::async_trait;

/// An exclusively-owned source of raw EMG readings.
///
/// `SerialLink` is the production implementation; tests drive the
/// acquisition loop with scripted in-memory sources instead of hardware.
#[async_trait]
pub trait EmgSource {
    /// Establish the connection. For serial sources this includes port
    /// discovery, so a fresh attempt re-resolves the device.
    async fn connect(&mut self) -> BridgeResult<()>;

    /// Read the next raw reading, suspending until one is available.
    ///
    /// Returns `LinkLost` when the underlying I/O reports disconnection;
    /// malformed frames are discarded internally and never surface here.
    async fn read_sample(&mut self) -> BridgeResult<f32>;

    /// Drop the connection, releasing the underlying device.
    fn close(&mut self);
}
