//! Monotonic deadline tracking for multi-step async operations.
//!
//! A [`Deadline`] is created once per logical operation and consulted before
//! each step; individual awaits can be bounded by the remaining time.

use std::future::Future;
use std::time::Duration;

/// Error produced when a deadline-bounded operation does not finish in time.
#[derive(Debug)]
pub enum DeadlineError<E> {
    /// The inner operation completed with an error.
    Inner(E),
    /// The deadline elapsed before the operation completed.
    Elapsed(Duration),
}

impl<E: std::fmt::Display> std::fmt::Display for DeadlineError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeadlineError::Inner(e) => write!(f, "operation failed: {}", e),
            DeadlineError::Elapsed(d) => write!(f, "deadline of {:?} elapsed", d),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for DeadlineError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DeadlineError::Inner(e) => Some(e),
            DeadlineError::Elapsed(_) => None,
        }
    }
}

/// A fixed point in monotonic time that multiple awaits can be bounded by.
///
/// # Example
///
/// ```rust,ignore
/// let deadline = Deadline::after(Duration::from_secs(30));
/// while !deadline.expired() {
///     let step = deadline.bound(next_step()).await?;
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: tokio::time::Instant,
    budget: Duration,
}

impl Deadline {
    /// Create a deadline `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self { at: tokio::time::Instant::now() + budget, budget }
    }

    /// Whether the deadline has passed.
    pub fn expired(&self) -> bool {
        tokio::time::Instant::now() >= self.at
    }

    /// Time left before the deadline, or `None` once it has passed.
    pub fn remaining(&self) -> Option<Duration> {
        let now = tokio::time::Instant::now();
        (now < self.at).then(|| self.at.duration_since(now))
    }

    /// The budget this deadline was created with.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// Run a fallible future, failing if it outlives the remaining time.
    pub async fn bound<F, T, E>(&self, fut: F) -> std::result::Result<T, DeadlineError<E>>
    where
        F: Future<Output = std::result::Result<T, E>>,
    {
        let Some(remaining) = self.remaining() else {
            return Err(DeadlineError::Elapsed(self.budget));
        };
        match tokio::time::timeout(remaining, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(DeadlineError::Inner(e)),
            Err(_) => Err(DeadlineError::Elapsed(self.budget)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_deadline_is_not_expired() {
        let deadline = Deadline::after(Duration::from_secs(5));
        assert!(!deadline.expired());
        assert!(deadline.remaining().unwrap() > Duration::from_secs(4));
        assert_eq!(deadline.budget(), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn deadline_expires_after_budget() {
        let deadline = Deadline::after(Duration::from_millis(5));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(deadline.expired());
        assert!(deadline.remaining().is_none());
    }

    #[tokio::test]
    async fn bound_passes_through_fast_results() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let value = deadline.bound(async { Ok::<_, String>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn bound_cuts_off_slow_operations() {
        let deadline = Deadline::after(Duration::from_millis(10));
        let result = deadline
            .bound(async {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok::<_, String>(0)
            })
            .await;
        assert!(matches!(result, Err(DeadlineError::Elapsed(_))));
    }

    #[tokio::test]
    async fn bound_preserves_inner_errors() {
        let deadline = Deadline::after(Duration::from_secs(1));
        let result = deadline.bound(async { Err::<i32, _>("boom".to_string()) }).await;
        match result {
            Err(DeadlineError::Inner(e)) => assert_eq!(e, "boom"),
            other => panic!("expected inner error, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn bound_after_expiry_fails_immediately() {
        let deadline = Deadline::after(Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        let result = deadline.bound(async { Ok::<_, String>(0) }).await;
        assert!(matches!(result, Err(DeadlineError::Elapsed(_))));
    }

    #[tokio::test]
    async fn successive_bounds_share_the_budget() {
        let deadline = Deadline::after(Duration::from_millis(500));
        for _ in 0..3 {
            deadline
                .bound(async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok::<_, String>(())
                })
                .await
                .unwrap();
        }
        let remaining = deadline.remaining().unwrap();
        assert!(remaining < Duration::from_millis(460));
    }
}
