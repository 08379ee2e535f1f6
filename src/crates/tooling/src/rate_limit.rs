//! Sliding window rate limiting
//!
//! Tracks operation timestamps in a moving window. Unlike a token bucket,
//! the window never "banks" unused quota, which matches per-user
//! requests-per-minute policies.
//!
//! The window is a plain value with `&mut` methods; callers that share one
//! across tasks wrap it in their own lock, which lets them separate the
//! allow decision from recording the hit.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Sliding window over operation timestamps.
///
/// # Example
///
/// ```rust
/// use tooling::rate_limit::SlidingWindow;
/// use std::time::Duration;
///
/// let mut window = SlidingWindow::new(2, Duration::from_secs(60));
/// assert!(window.allows());
/// window.record();
/// window.record();
/// assert!(!window.allows());
/// ```
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    max_operations: usize,
    window: Duration,
    hits: VecDeque<Instant>,
}

impl SlidingWindow {
    /// Create a window allowing `max_operations` per `window`.
    pub fn new(max_operations: usize, window: Duration) -> Self {
        Self { max_operations, window, hits: VecDeque::new() }
    }

    /// Whether one more operation fits in the current window.
    ///
    /// Does not consume quota; pair with [`record`](Self::record) once the
    /// operation is actually admitted.
    pub fn allows(&mut self) -> bool {
        self.evict(Instant::now());
        self.hits.len() < self.max_operations
    }

    /// Record an admitted operation.
    pub fn record(&mut self) {
        let now = Instant::now();
        self.evict(now);
        self.hits.push_back(now);
    }

    /// Number of operations in the current window.
    pub fn count(&mut self) -> usize {
        self.evict(Instant::now());
        self.hits.len()
    }

    /// The configured per-window allowance.
    pub fn limit(&self) -> usize {
        self.max_operations
    }

    /// Drop all recorded operations.
    pub fn reset(&mut self) {
        self.hits.clear();
    }

    fn evict(&mut self, now: Instant) {
        let window = self.window;
        while let Some(&front) = self.hits.front() {
            if now.duration_since(front) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allows_up_to_the_limit() {
        let mut window = SlidingWindow::new(3, Duration::from_secs(60));

        for _ in 0..3 {
            assert!(window.allows());
            window.record();
        }
        assert!(!window.allows());
        assert_eq!(window.count(), 3);
    }

    #[test]
    fn allows_does_not_consume_quota() {
        let mut window = SlidingWindow::new(1, Duration::from_secs(60));

        assert!(window.allows());
        assert!(window.allows());
        assert_eq!(window.count(), 0);

        window.record();
        assert!(!window.allows());
    }

    #[test]
    fn boundary_nth_allowed_nplus1th_denied() {
        let n = 5;
        let mut window = SlidingWindow::new(n, Duration::from_secs(60));

        for i in 0..n {
            assert!(window.allows(), "operation {} should be allowed", i + 1);
            window.record();
        }
        assert!(!window.allows(), "operation {} should be denied", n + 1);
    }

    #[test]
    fn old_hits_expire() {
        let mut window = SlidingWindow::new(2, Duration::from_millis(40));
        window.record();
        window.record();
        assert!(!window.allows());

        std::thread::sleep(Duration::from_millis(50));
        assert!(window.allows());
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn reset_clears_the_window() {
        let mut window = SlidingWindow::new(2, Duration::from_secs(60));
        window.record();
        window.record();
        window.reset();
        assert!(window.allows());
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn limit_is_exposed() {
        let mut window = SlidingWindow::new(30, Duration::from_secs(60));
        assert_eq!(window.limit(), 30);
        window.record();
        assert_eq!(window.limit(), 30);
    }
}
