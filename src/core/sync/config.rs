/*!
 * Synchronization Configuration
 *
 * Runtime configuration for spin-wait backoff
 */

use serde::{Deserialize, Serialize};

/// What a spinning caller does once it has spun `spin_limit` times
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Keep spinning with a CPU hint (lowest latency, burns a core)
    Spin,
    /// Yield the time slice to the scheduler between attempts
    Yield,
}

/// Spin-wait configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinConfig {
    /// Pure spin iterations before the backoff strategy kicks in
    pub spin_limit: u32,
    /// Behavior after `spin_limit` iterations
    pub backoff: BackoffStrategy,
}

impl Default for SpinConfig {
    fn default() -> Self {
        Self::cooperative()
    }
}

impl SpinConfig {
    /// Never yield. Only for critical sections of a handful of instructions
    /// on machines with more cores than contending threads.
    pub const fn low_latency() -> Self {
        Self {
            spin_limit: u32::MAX,
            backoff: BackoffStrategy::Spin,
        }
    }

    /// Spin briefly, then yield to the scheduler
    pub const fn cooperative() -> Self {
        Self {
            spin_limit: 100,
            backoff: BackoffStrategy::Yield,
        }
    }
}

/// Per-waiter spin state driven by a [`SpinConfig`]
#[derive(Debug)]
pub(crate) struct Backoff {
    config: SpinConfig,
    spins: u32,
}

impl Backoff {
    #[inline]
    pub(crate) const fn new(config: SpinConfig) -> Self {
        Self { config, spins: 0 }
    }

    /// Wait one step
    #[inline]
    pub(crate) fn snooze(&mut self) {
        if self.spins < self.config.spin_limit {
            self.spins += 1;
            std::hint::spin_loop();
            return;
        }

        match self.config.backoff {
            BackoffStrategy::Spin => std::hint::spin_loop(),
            BackoffStrategy::Yield => std::thread::yield_now(),
        }
    }
}
