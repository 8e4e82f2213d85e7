//! Progressive Core - progressive image loading pipeline
//!
//! This crate provides the host-agnostic core of a progressive image loader:
//! a blurred placeholder is shown while the full image is fetched, its EXIF
//! orientation is read, it is redrawn upright on an off-screen surface and
//! finally cross-faded in.
//!
//! # Module Structure
//!
//! - `orientation` - EXIF orientation scan, data URI encoding, canvas transforms
//! - `cache` - Cache presence check over host image handles
//! - `aspect` - Aspect ratio discovery poll
//! - `loader` - The per-image state machine and its host seam
//!
//! The crate performs no I/O itself. Fetches, decodes, timers and frame
//! deferrals are requested through [`loader::LoaderHost`] and reported back
//! through the coordinator's completion methods.

pub mod aspect;
pub mod cache;
pub mod loader;
pub mod orientation;

pub use aspect::{AspectRatioEstimator, PollConfig, PollStatus, DEFAULT_ASPECT_RATIO};
pub use cache::{is_cached, HandleSource, ImageHandle};
pub use loader::{
    DrawError, ImageLoader, ImageProps, ImageRequest, ImageSlot, LoadError, LoadObserver,
    LoadState, LoadView, LoaderHost, LoaderOptions, Phase, Ticket, Timer,
};
pub use orientation::{read_orientation, AffineTransform, DrawPlan, Orientation, OrientedSource};

/// Pixel dimensions of a bitmap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Height divided by width, as used for padding-based sizing.
    ///
    /// Returns 0.0 for a zero-width size.
    pub fn aspect_ratio(&self) -> f64 {
        if self.width == 0 {
            return 0.0;
        }
        f64::from(self.height) / f64::from(self.width)
    }
}
