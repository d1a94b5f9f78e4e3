//! Repaint pacing for the live preview.
//!
//! Every edit of the frame model asks for a preview repaint. Painting can
//! involve image decodes, so bursts of edits (typing, dragging a slider)
//! are coalesced: the first request fires immediately, requests inside the
//! quiet interval are remembered as a trailing repaint that fires once the
//! interval has elapsed.

use std::time::{Duration, Instant};

/// Leading-edge debouncer with a trailing flush.
#[derive(Debug)]
pub struct Debouncer {
    interval_ns: u64,
    last_fire_ns: Option<u64>,
    pending: bool,
    epoch: Instant,
}

impl Debouncer {
    /// Create a debouncer with the given quiet interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ns: interval.as_nanos() as u64,
            last_fire_ns: None,
            pending: false,
            epoch: Instant::now(),
        }
    }

    /// Create a debouncer from a millisecond interval.
    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Nanoseconds elapsed since this debouncer was created.
    pub fn now_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Request a repaint at `current_ns`.
    /// Returns true if the repaint should run now. Otherwise the request is
    /// remembered and picked up by [`Debouncer::take_pending`].
    pub fn should_fire(&mut self, current_ns: u64) -> bool {
        match self.last_fire_ns {
            Some(last) if current_ns < last + self.interval_ns => {
                self.pending = true;
                false
            }
            _ => {
                self.last_fire_ns = Some(current_ns);
                self.pending = false;
                true
            }
        }
    }

    /// Fire a remembered request once the quiet interval has passed.
    pub fn take_pending(&mut self, current_ns: u64) -> bool {
        if !self.pending {
            return false;
        }
        self.should_fire(current_ns)
    }

    /// Whether a trailing repaint is waiting.
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Quiet interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.interval_ns
    }
}
