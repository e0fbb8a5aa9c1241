// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::CoreError;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with exponential backoff for retryable errors.
///
/// Only errors for which [`CoreError::is_retryable`] holds are retried;
/// every other error is returned on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub initial_backoff: Duration,
    /// Factor applied to the delay after each failed attempt.
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(50),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// The delay after the given failed attempt (1-based).
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor: u32 = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(factor)
    }

    /// Runs `operation` until it succeeds, fails permanently, or the
    /// attempts are exhausted.
    ///
    /// # Arguments
    ///
    /// * `operation_name` - Name used in log lines
    /// * `operation` - The operation; each call must be a complete attempt
    ///
    /// # Errors
    ///
    /// Returns the last error produced by the operation.
    pub fn run<T, F>(&self, operation_name: &str, mut operation: F) -> Result<T, CoreError>
    where
        F: FnMut() -> Result<T, CoreError>,
    {
        let mut attempt: u32 = 1;
        loop {
            match operation() {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay: Duration = self.backoff_for(attempt);
                    warn!(
                        operation = operation_name,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %err,
                        "Retrying after retryable error"
                    );
                    std::thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
