//! Aspect ratio discovery by polling a decoding image handle.
//!
//! A load-complete signal does not guarantee that pixel geometry is populated
//! in every environment, so the natural size is sampled on a fixed interval
//! until it appears or a deadline passes. The estimator itself never touches a
//! clock: the coordinator asks the host for a repeating tick and a one-shot
//! deadline, and feeds both back in.

use serde::{Deserialize, Serialize};

use crate::cache::ImageHandle;
use crate::Size;

/// Height / width ratio used until real dimensions are known (16:9).
pub const DEFAULT_ASPECT_RATIO: f64 = 0.5625;
pub const DEFAULT_POLL_INTERVAL_MS: u32 = 10;
pub const DEFAULT_POLL_TIMEOUT_MS: u32 = 2500;

/// Poll cadence and deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollConfig {
    pub interval_ms: u32,
    pub timeout_ms: u32,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_POLL_INTERVAL_MS,
            timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PollStatus {
    #[default]
    Idle,
    Polling,
    Resolved(Size),
    /// The deadline passed before dimensions appeared.
    Killed,
}

/// Tracks a single dimension poll for one image handle.
#[derive(Debug, Clone, Default)]
pub struct AspectRatioEstimator {
    config: PollConfig,
    status: PollStatus,
    retry_used: bool,
}

impl AspectRatioEstimator {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            status: PollStatus::Idle,
            retry_used: false,
        }
    }

    pub fn config(&self) -> PollConfig {
        self.config
    }

    pub fn status(&self) -> PollStatus {
        self.status
    }

    pub fn is_polling(&self) -> bool {
        self.status == PollStatus::Polling
    }

    /// Start polling. Returns false if a poll is already active.
    pub fn begin(&mut self) -> bool {
        if self.is_polling() {
            return false;
        }
        self.status = PollStatus::Polling;
        true
    }

    /// Handle one poll tick.
    pub fn sample<H>(&mut self, handle: &H) -> PollStatus
    where
        H: ImageHandle + ?Sized,
    {
        self.record(handle.natural_size())
    }

    /// Handle one poll tick with dimensions already read from the handle.
    pub fn record(&mut self, natural_size: Option<Size>) -> PollStatus {
        if self.is_polling() {
            if let Some(size) = natural_size {
                self.status = PollStatus::Resolved(size);
            }
        }
        self.status
    }

    /// Handle the deadline. Dimensions that arrived since the last tick still count.
    pub fn expire<H>(&mut self, handle: &H) -> PollStatus
    where
        H: ImageHandle + ?Sized,
    {
        self.expire_with(handle.natural_size())
    }

    /// Handle the deadline with dimensions already read from the handle.
    pub fn expire_with(&mut self, natural_size: Option<Size>) -> PollStatus {
        if self.is_polling() {
            self.status = match natural_size {
                Some(size) => PollStatus::Resolved(size),
                None => PollStatus::Killed,
            };
        }
        self.status
    }

    /// Stop an active poll without a result.
    pub fn cancel(&mut self) {
        if self.is_polling() {
            self.status = PollStatus::Idle;
        }
    }

    /// Claim the single retry granted after a killed poll.
    pub fn take_retry(&mut self) -> bool {
        if self.status == PollStatus::Killed && !self.retry_used {
            self.retry_used = true;
            true
        } else {
            false
        }
    }
}
