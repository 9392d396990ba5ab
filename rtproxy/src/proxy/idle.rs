//! Quiescence timer for batch flushing.

use std::time::Duration;

use crate::publisher::PublishMode;

/// Decides how long the next receive may wait.
///
/// A single-shot timer that is re-armed by every datagram received in batch
/// mode and disarmed once it has fired.
#[derive(Debug, Clone, Copy)]
pub struct IdleTimer {
    window: Duration,
    armed: bool,
}

impl IdleTimer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed: false,
        }
    }

    /// Upper bound for the next receive, `None` to wait indefinitely.
    pub fn wait(&self) -> Option<Duration> {
        self.armed.then_some(self.window)
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// A datagram was received and processed.
    pub fn datagram_received(&mut self, mode: PublishMode) {
        if mode == PublishMode::Batch {
            self.armed = true;
        }
    }

    /// The window passed without input.
    pub fn expired(&mut self) {
        self.armed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_unbounded() {
        let timer = IdleTimer::new(Duration::from_millis(500));
        assert_eq!(timer.wait(), None);
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_batch_datagram_bounds_wait() {
        let mut timer = IdleTimer::new(Duration::from_millis(500));
        timer.datagram_received(PublishMode::Batch);
        assert_eq!(timer.wait(), Some(Duration::from_millis(500)));

        // Re-arming keeps the same window
        timer.datagram_received(PublishMode::Batch);
        assert_eq!(timer.wait(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_expiry_reverts_to_unbounded() {
        let mut timer = IdleTimer::new(Duration::from_millis(500));
        timer.datagram_received(PublishMode::Batch);
        timer.expired();
        assert_eq!(timer.wait(), None);
    }

    #[test]
    fn test_single_mode_never_bounds_wait() {
        let mut timer = IdleTimer::new(Duration::from_millis(500));
        timer.datagram_received(PublishMode::Single);
        assert_eq!(timer.wait(), None);
    }
}
