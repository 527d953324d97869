//! Bounded readiness polling
//!
//! Third-party scripts signal readiness on their own schedule; we detect
//! it with a fixed-interval, fixed-attempt-count poll. Exhausting the
//! attempt cap is a terminal outcome for the cycle; there are no
//! unbounded retry loops anywhere in this crate.

use std::time::Duration;
use thiserror::Error;

/// Attempt cap reached without the predicate turning true
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Polling exhausted after {attempts} attempts")]
pub struct PollExhausted {
    pub attempts: u32,
}

/// Poll `ready` every `interval` up to `max_attempts` times.
///
/// The predicate is checked immediately on each attempt, with the sleep
/// between attempts. Returns the attempt number that succeeded.
pub async fn poll_until<F>(
    interval: Duration,
    max_attempts: u32,
    mut ready: F,
) -> Result<u32, PollExhausted>
where
    F: FnMut() -> bool,
{
    for attempt in 1..=max_attempts {
        if ready() {
            return Ok(attempt);
        }
        if attempt < max_attempts {
            tokio::time::sleep(interval).await;
        }
    }
    Err(PollExhausted {
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let result = poll_until(Duration::from_millis(500), 5, || true).await;
        assert_eq!(result, Ok(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_later_attempt() {
        let calls = AtomicU32::new(0);
        let result = poll_until(Duration::from_millis(500), 5, || {
            calls.fetch_add(1, Ordering::SeqCst) + 1 >= 3
        })
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_is_terminal() {
        let calls = AtomicU32::new(0);
        let result = poll_until(Duration::from_millis(500), 4, || {
            calls.fetch_add(1, Ordering::SeqCst);
            false
        })
        .await;
        assert_eq!(result, Err(PollExhausted { attempts: 4 }));
        // Exactly the attempt cap, never more
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts() {
        let result = poll_until(Duration::from_millis(500), 0, || true).await;
        assert_eq!(result, Err(PollExhausted { attempts: 0 }));
    }
}
