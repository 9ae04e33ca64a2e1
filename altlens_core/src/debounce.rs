// Copyright 2026 the Altlens Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Trailing-edge debouncing.
//!
//! Every [`trigger`](Debouncer::trigger) pushes the deadline to
//! `now + delay`; the action fires once the deadline passes with no further
//! triggers. A burst of events therefore costs exactly one pass.

use crate::time::{Duration, HostTime};

/// A trailing-edge debounce deadline.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<HostTime>,
}

impl Debouncer {
    /// Creates an idle debouncer with the given quiet period.
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// The configured quiet period.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Records an event at `now` and returns the new deadline.
    pub fn trigger(&mut self, now: HostTime) -> HostTime {
        let deadline = now.saturating_add(self.delay);
        self.deadline = Some(deadline);
        deadline
    }

    /// The pending deadline, if armed.
    #[must_use]
    pub const fn deadline(&self) -> Option<HostTime> {
        self.deadline
    }

    /// Returns whether an action is pending.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Fires if the deadline has passed at `now`, disarming the debouncer.
    pub fn poll(&mut self, now: HostTime) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Fires unconditionally if anything is pending.
    ///
    /// Used by hosts whose timer already enforced the quiet period.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drops any pending action.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    #[test]
    fn burst_coalesces_to_one_fire() {
        let mut d = Debouncer::new(DELAY);
        let mut fired = 0;
        // One event every 50ms for a second: never quiet for 200ms.
        for ms in (0..1000).step_by(50) {
            let now = HostTime(ms * 1000);
            if d.poll(now) {
                fired += 1;
            }
            d.trigger(now);
        }
        assert_eq!(fired, 0, "continuous events keep postponing");

        assert!(!d.poll(HostTime(1_100_000)), "only 150ms after last event");
        assert!(d.poll(HostTime(1_150_000)));
        assert!(!d.poll(HostTime(2_000_000)), "fires once");
    }

    #[test]
    fn trigger_resets_deadline() {
        let mut d = Debouncer::new(DELAY);
        assert_eq!(d.trigger(HostTime(0)), HostTime(200_000));
        assert_eq!(d.trigger(HostTime(150_000)), HostTime(350_000));
        assert_eq!(d.deadline(), Some(HostTime(350_000)));
    }

    #[test]
    fn flush_and_cancel() {
        let mut d = Debouncer::new(DELAY);
        assert!(!d.flush(), "nothing pending");
        d.trigger(HostTime(0));
        assert!(d.flush());
        assert!(!d.is_pending());

        d.trigger(HostTime(0));
        d.cancel();
        assert!(!d.poll(HostTime(u64::MAX)));
    }
}
