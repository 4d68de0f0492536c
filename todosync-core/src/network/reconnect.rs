// SPDX-FileCopyrightText: 2026 Mattia Egloff <mattia.egloff@pm.me>
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Reconnect Policy
//!
//! Bounded retry with a fixed delay for establishing a ready session.
//! The outer sync schedule already limits how often a cycle runs, so this
//! only needs to ride out short blips within one cycle.

use std::time::Duration;

use tracing::{error, warn};

use super::error::NetworkError;

/// Waits between connection attempts.
pub trait Sleep: Send {
    /// Blocks the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// Sleeps on the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Sleep for ThreadSleep {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Default number of connection attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay between connection attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Fixed-delay, bounded retry policy.
pub struct ReconnectPolicy {
    max_attempts: u32,
    delay: Duration,
    sleeper: Box<dyn Sleep>,
}

impl std::fmt::Debug for ReconnectPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReconnectPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish()
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

impl ReconnectPolicy {
    /// Creates a policy sleeping on the current thread.
    ///
    /// `max_attempts` below 1 is treated as 1.
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        ReconnectPolicy {
            max_attempts: max_attempts.max(1),
            delay,
            sleeper: Box::new(ThreadSleep),
        }
    }

    /// Replaces the sleeper.
    pub fn with_sleeper(mut self, sleeper: impl Sleep + 'static) -> Self {
        self.sleeper = Box::new(sleeper);
        self
    }

    /// Returns the attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the delay between attempts.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `attempt` until it succeeds or the attempt budget is spent.
    ///
    /// `attempt` receives the 1-based attempt number. Sleeps between
    /// attempts, never after the last one, and returns the last error on
    /// exhaustion.
    pub fn run<T, F>(&self, mut attempt: F) -> Result<T, NetworkError>
    where
        F: FnMut(u32) -> Result<T, NetworkError>,
    {
        let mut number = 1;
        loop {
            match attempt(number) {
                Ok(value) => return Ok(value),
                Err(e) if number >= self.max_attempts => {
                    error!(
                        attempt = number,
                        max = self.max_attempts,
                        error = %e,
                        "giving up on connection"
                    );
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        attempt = number,
                        max = self.max_attempts,
                        error = %e,
                        "connection attempt failed, retrying in {:?}",
                        self.delay
                    );
                    self.sleeper.sleep(self.delay);
                    number += 1;
                }
            }
        }
    }
}
