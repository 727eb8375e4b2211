// Copyright (c) Walrus Foundation
// SPDX-License-Identifier: Apache-2.0

//! Linear backoff strategy for retrying gateway calls.

use std::{num::NonZeroU32, time::Duration};

use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};

/// A strategy for determining the delay before the next retry.
pub trait BackoffStrategy {
    /// Returns the delay to wait before the next attempt, or `None` if the attempts are exhausted.
    fn next_delay(&mut self) -> Option<Duration>;
}

/// Configuration of the linear backoff applied to uploads and downloads alike.
///
/// An operation performs at most `max_attempts` calls; the wait before re-attempt `n + 1` is
/// `n * backoff_factor`.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinearBackoffConfig {
    /// The delay multiplier, in milliseconds, applied per completed attempt.
    #[serde_as(as = "DurationMilliSeconds")]
    #[serde(rename = "backoff_factor_millis", default = "default_backoff_factor")]
    pub backoff_factor: Duration,
    /// The total number of attempts, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: NonZeroU32,
}

fn default_backoff_factor() -> Duration {
    Duration::from_millis(3000)
}

fn default_max_attempts() -> NonZeroU32 {
    NonZeroU32::new(3).expect("3 is non-zero")
}

impl Default for LinearBackoffConfig {
    fn default() -> Self {
        Self {
            backoff_factor: default_backoff_factor(),
            max_attempts: default_max_attempts(),
        }
    }
}

impl LinearBackoffConfig {
    /// Returns a fresh strategy for a single logical operation.
    pub fn get_strategy(&self) -> LinearBackoff {
        LinearBackoff {
            backoff_factor: self.backoff_factor,
            completed_attempts: 0,
            max_attempts: self.max_attempts.get(),
        }
    }
}

/// A linear backoff strategy; created through [`LinearBackoffConfig::get_strategy`].
///
/// Yields one delay fewer than `max_attempts`: the delay after the last permitted attempt does
/// not exist, because there is no further attempt to wait for.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    backoff_factor: Duration,
    completed_attempts: u32,
    max_attempts: u32,
}

impl BackoffStrategy for LinearBackoff {
    fn next_delay(&mut self) -> Option<Duration> {
        self.completed_attempts += 1;
        if self.completed_attempts >= self.max_attempts {
            return None;
        }
        Some(self.backoff_factor * self.completed_attempts)
    }
}

impl Iterator for LinearBackoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        self.next_delay()
    }
}
