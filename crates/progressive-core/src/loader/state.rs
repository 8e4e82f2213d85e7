//! Per-image load state.

use serde::{Deserialize, Serialize};

use crate::aspect::{AspectRatioEstimator, PollConfig, DEFAULT_ASPECT_RATIO};

/// Pipeline phase, in the order a load moves through them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Idle,
    FetchingBytes,
    ParsingOrientation,
    CheckingCache,
    AwaitingDimensions,
    Drawing,
    FadingIn,
    Rendered,
    Errored,
}

impl Phase {
    /// Phases only move forward. Rendered is terminal; the only way back is
    /// Errored -> FetchingBytes when a fallback restarts the pipeline.
    pub fn can_advance_to(self, next: Phase) -> bool {
        match self {
            Phase::Rendered => false,
            Phase::Errored => next == Phase::FetchingBytes,
            _ => next > self,
        }
    }
}

/// Mutable state of one load, owned by the coordinator.
///
/// Replaced wholesale whenever the source changes.
#[derive(Debug, Clone)]
pub struct LoadState {
    phase: Phase,
    cached: bool,
    rendered: bool,
    errored: bool,
    resolved_width: u32,
    resolved_aspect_ratio: f64,
    placeholder_url: Option<String>,
    image_url: Option<String>,
    pub(crate) poll: AspectRatioEstimator,
}

impl LoadState {
    pub fn new(poll: PollConfig) -> Self {
        Self {
            phase: Phase::Idle,
            cached: false,
            rendered: false,
            errored: false,
            resolved_width: 0,
            resolved_aspect_ratio: DEFAULT_ASPECT_RATIO,
            placeholder_url: None,
            image_url: None,
            poll: AspectRatioEstimator::new(poll),
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The image came from the cache fast path.
    pub fn is_cached(&self) -> bool {
        self.cached
    }

    pub fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    /// Natural width of the main image, 0 until known.
    pub fn resolved_width(&self) -> u32 {
        self.resolved_width
    }

    pub fn resolved_aspect_ratio(&self) -> f64 {
        self.resolved_aspect_ratio
    }

    /// Placeholder currently on display.
    pub fn placeholder_url(&self) -> Option<&str> {
        self.placeholder_url.as_deref()
    }

    /// Main image source once committed.
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn poll(&self) -> &AspectRatioEstimator {
        &self.poll
    }

    /// Move to `next` if the phase order allows it.
    pub(crate) fn advance(&mut self, next: Phase) -> bool {
        if !self.phase.can_advance_to(next) {
            log::debug!("refusing phase change {:?} -> {:?}", self.phase, next);
            return false;
        }
        log::trace!("phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
        true
    }

    pub(crate) fn set_cached(&mut self, cached: bool) {
        self.cached = cached;
    }

    pub(crate) fn set_rendered(&mut self, rendered: bool) {
        self.rendered = rendered;
    }

    pub(crate) fn set_errored(&mut self, errored: bool) {
        self.errored = errored;
    }

    pub(crate) fn set_dimensions(&mut self, width: u32, aspect_ratio: f64) {
        self.resolved_width = width;
        self.resolved_aspect_ratio = aspect_ratio;
    }

    pub(crate) fn set_placeholder_url(&mut self, url: Option<String>) {
        self.placeholder_url = url;
    }

    pub(crate) fn set_image_url(&mut self, url: Option<String>) {
        self.image_url = url;
    }
}
