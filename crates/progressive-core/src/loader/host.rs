//! The seam between the pipeline and whatever environment runs it.
//!
//! The coordinator never blocks. Each request it makes of the host carries a
//! [`Ticket`]; the host hands that ticket back with the completion so late
//! results from superseded loads can be recognised and dropped.

use crate::cache::HandleSource;
use crate::orientation::DrawPlan;

use super::{DrawError, LoadError};

/// Identity of one load attempt.
///
/// `generation` changes whenever the source changes; `attempt` changes when a
/// fallback substitution restarts the pipeline for the same source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    generation: u64,
    attempt: u8,
}

impl Ticket {
    pub(crate) fn new(generation: u64, attempt: u8) -> Self {
        Self {
            generation,
            attempt,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn attempt(&self) -> u8 {
        self.attempt
    }
}

/// Which image element a decode targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Main,
    Placeholder,
}

/// Timers the coordinator may ask for. At most one of each is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Aspect ratio sample, repeating every poll interval.
    PollTick,
    /// One-shot aspect ratio deadline.
    PollDeadline,
    /// One-shot wait between the render flush and the fade-in.
    FadeDelay,
}

impl Timer {
    /// Repeating timers fire until cancelled; the others fire once.
    pub fn is_repeating(self) -> bool {
        matches!(self, Timer::PollTick)
    }
}

/// Advisory lifecycle notifications. They never influence the state machine.
pub trait LoadObserver {
    /// A new source started loading (initial load or source change).
    fn on_load_start(&mut self, _url: &str) {}

    fn on_load(&mut self, _url: &str) {}

    fn on_error(&mut self, _error: &LoadError) {}

    fn on_load_placeholder(&mut self, _url: &str) {}

    fn on_placeholder_error(&mut self, _error: &LoadError) {}
}

/// Environment services the coordinator drives.
///
/// Completions are reported back on the owning [`ImageLoader`](super::ImageLoader):
/// `fetch_bytes` → `bytes_fetched` / `fetch_failed`; `load_image` →
/// `image_loaded` / `image_failed` or `placeholder_loaded` /
/// `placeholder_failed`; `start_timer` → `timer_fired`; `after_render` →
/// `render_flushed`. None of them may be invoked synchronously from inside
/// the request.
pub trait LoaderHost: HandleSource + LoadObserver {
    /// Retrieve the raw bytes behind `url`.
    fn fetch_bytes(&mut self, ticket: Ticket, url: &str);

    /// Assign `src` to the slot's image element, replacing any previous source.
    fn load_image(&mut self, ticket: Ticket, slot: ImageSlot, src: &str);

    /// The main decoding handle, once a source has been assigned to it.
    fn main_image(&self) -> Option<&Self::Handle>;

    /// Redraw the main image onto the off-screen surface.
    fn draw(&mut self, plan: &DrawPlan) -> Result<(), DrawError>;

    /// Start `timer`, replacing an active timer of the same kind.
    fn start_timer(&mut self, ticket: Ticket, timer: Timer, delay_ms: u32);

    fn cancel_timer(&mut self, timer: Timer);

    /// Report back once the current rendering pass has flushed.
    fn after_render(&mut self, ticket: Ticket);
}
