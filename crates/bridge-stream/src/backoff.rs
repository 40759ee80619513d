//! Bounded exponential backoff for serial reconnection

use std::time::Duration;

/// Reconnection delay schedule: doubles per consecutive failure from a
/// floor up to a cap, reset on success. Deterministic under repeated
/// hardware failure.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    floor: Duration,
    cap: Duration,
    next: Duration,
}

impl ReconnectBackoff {
    /// Create a schedule. The floor is clamped to at least 1ms and the
    /// cap to at least the floor.
    pub fn new(floor: Duration, cap: Duration) -> Self {
        let floor = floor.max(Duration::from_millis(1));
        let cap = cap.max(floor);
        ReconnectBackoff {
            floor,
            cap,
            next: floor,
        }
    }

    /// Convenience constructor from millisecond values
    pub fn from_millis(floor_ms: u64, cap_ms: u64) -> Self {
        Self::new(
            Duration::from_millis(floor_ms),
            Duration::from_millis(cap_ms),
        )
    }

    /// Delay to wait before the next attempt; advances the schedule
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        self.next = self.next.checked_mul(2).unwrap_or(self.cap).min(self.cap);
        delay
    }

    /// Reset to the floor after a successful connect
    pub fn reset(&mut self) {
        self.next = self.floor;
    }
}
