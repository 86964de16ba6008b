//! Time gate shared by every event that writes to the RTC.

/// Default debounce window in milliseconds.
pub const DEFAULT_WINDOW_MS: u64 = 200;

/// Source of monotonic time in milliseconds.
pub trait MonotonicClock {
    /// Milliseconds since an arbitrary fixed point, never going backwards.
    fn now_millis(&self) -> u64;
}

impl<F: Fn() -> u64> MonotonicClock for F {
    fn now_millis(&self) -> u64 {
        self()
    }
}

/// Rejects events that follow the previous event too closely.
///
/// There is one anchor for all event sources: a minute press right after an
/// hour press is rejected just like a second hour press would be. The anchor
/// moves on every call, accepted or not, so a bouncing switch keeps the gate
/// closed until it has been quiet for a whole window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Debouncer {
    window_ms: u64,
    last_event_ms: u64,
}

impl Debouncer {
    /// Creates a debouncer whose anchor starts at time 0.
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_event_ms: 0,
        }
    }

    /// Records an event at `now_ms` and returns whether it is accepted.
    pub fn gate(&mut self, now_ms: u64) -> bool {
        let accepted = now_ms.saturating_sub(self.last_event_ms) > self.window_ms;
        self.last_event_ms = now_ms;
        accepted
    }

    /// Time of the most recent event, accepted or not.
    pub fn last_event_ms(&self) -> u64 {
        self.last_event_ms
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MS)
    }
}
