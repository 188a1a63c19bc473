//! Shared pacing gate for requests that leave the process.

use crate::error::ConfigError;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Enforces a minimum spacing between the *start* of consecutive requests.
///
/// The gate is shared (`Arc<PacingGate>`) by everything in a run that talks to
/// external hosts. Callers queue on the lock in arrival order, so concurrent
/// requests are spaced just like sequential ones.
#[derive(Debug)]
pub struct PacingGate {
    delay: Duration,
    last_start: Mutex<Option<Instant>>,
}

impl PacingGate {
    /// Create a gate; a negative delay is a configuration error.
    pub fn new(delay_millis: i64) -> Result<Self, ConfigError> {
        let millis = u64::try_from(delay_millis).map_err(|_| ConfigError::NegativeDelay(delay_millis))?;
        Ok(Self::from_duration(Duration::from_millis(millis)))
    }

    pub fn from_duration(delay: Duration) -> Self {
        Self {
            delay,
            last_start: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Wait until the next request may start and claim that slot.
    ///
    /// Returns the instant the caller's request is allowed to begin.
    pub async fn wait_turn(&self) -> Instant {
        let mut last_start = self.last_start.lock().await;

        if let Some(previous) = *last_start {
            let next = previous + self.delay;
            if next > Instant::now() {
                debug!("Pacing external request for {:?}", next - Instant::now());
                tokio::time::sleep_until(next).await;
            }
        }

        let now = Instant::now();
        *last_start = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_negative_delay_rejected() {
        assert_eq!(PacingGate::new(-1).unwrap_err(), ConfigError::NegativeDelay(-1));
        assert_eq!(PacingGate::new(0).unwrap().delay(), Duration::ZERO);
        assert_eq!(PacingGate::new(1500).unwrap().delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_first_turn_is_immediate() {
        let gate = tokio_test::assert_ok!(PacingGate::new(10_000));
        let before = Instant::now();
        let start = tokio_test::block_on(gate.wait_turn());
        assert!(start - before < Duration::from_millis(1000));
    }

    #[tokio::test]
    async fn test_sequential_turns_are_spaced() {
        let gate = PacingGate::new(50).unwrap();
        let mut starts = Vec::new();
        for _ in 0..4 {
            starts.push(gate.wait_turn().await);
        }
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(50));
        }
    }

    #[tokio::test]
    async fn test_concurrent_turns_are_spaced() {
        let gate = Arc::new(PacingGate::new(40).unwrap());
        let handles: Vec<_> = (0..5)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.wait_turn().await })
            })
            .collect();

        let mut starts = Vec::new();
        for handle in handles {
            starts.push(handle.await.unwrap());
        }
        starts.sort();
        for pair in starts.windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_millis(40));
        }
    }
}
