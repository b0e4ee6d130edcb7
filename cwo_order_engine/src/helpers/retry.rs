//! A reusable retry-with-backoff helper.
//!
//! The id allocator, the order-save loop and the CLI's order fetch all retry with slightly
//! different budgets and delays; they share this one implementation rather than each
//! hand-rolling a loop. The jitter exists purely to desynchronize competing requests, not
//! for correctness.

use std::{future::Future, time::Duration};

use log::trace;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    /// Multiplier applied per attempt. 1 gives a constant delay, 2 the classic doubling.
    factor: u32,
    /// Upper bound of the random extra delay added to every wait.
    jitter: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration) -> Self {
        Self { max_attempts, base_delay, factor: 1, jitter: Duration::ZERO }
    }

    pub fn with_factor(mut self, factor: u32) -> Self {
        self.factor = factor.max(1);
        self
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// The delay to sleep after a failed attempt (0-based).
    pub fn delay_for(&self, attempt: usize) -> Duration {
        let scaled = self.base_delay * self.factor.saturating_pow(attempt as u32);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            scaled
        } else {
            scaled + Duration::from_millis(rand::thread_rng().gen_range(0..jitter_ms))
        }
    }

    /// Runs `op` up to `max_attempts` times, sleeping between attempts. `retryable` decides
    /// whether an error is worth another attempt; a non-retryable error is returned
    /// immediately. The final error is returned once the budget is exhausted.
    pub async fn retry<T, E, F, Fut, P>(&self, mut op: F, retryable: P) -> Result<T, E>
    where
        F: FnMut(usize) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        P: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(e) if attempt + 1 < self.max_attempts && retryable(&e) => {
                    let delay = self.delay_for(attempt);
                    trace!("Attempt {} failed ({e}). Retrying in {delay:?}", attempt + 1);
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                },
                Err(e) => return Err(e),
            }
        }
    }
}
