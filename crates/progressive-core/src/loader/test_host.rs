//! Recording host double for coordinator tests.

use std::collections::{HashMap, HashSet};

use crate::cache::{HandleSource, ImageHandle};
use crate::orientation::DrawPlan;
use crate::Size;

use super::{DrawError, ImageSlot, LoadError, LoadObserver, LoaderHost, Ticket, Timer};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct StubImage {
    pub complete: bool,
    pub size: Option<Size>,
}

impl ImageHandle for StubImage {
    fn is_complete(&self) -> bool {
        self.complete
    }

    fn natural_size(&self) -> Option<Size> {
        self.size
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notice {
    Load(String),
    Error(LoadError),
    PlaceholderLoad(String),
    PlaceholderError(LoadError),
}

#[derive(Debug, Default)]
pub(crate) struct RecordingHost {
    pub fetches: Vec<(Ticket, String)>,
    pub loads: Vec<(ImageSlot, String)>,
    pub draws: Vec<DrawPlan>,
    pub renders: Vec<Ticket>,
    pub active_timers: HashMap<Timer, (Ticket, u32)>,
    pub started_timers: Vec<(Timer, u32)>,
    pub notices: Vec<Notice>,
    /// Sources reported through `on_load_start`.
    pub starts: Vec<String>,
    /// URLs reported as already cached.
    pub cached_urls: HashSet<String>,
    pub cache_everything: bool,
    /// Dimensions the main handle reports once a source is assigned.
    pub main_size: Option<Size>,
    pub main: Option<StubImage>,
    pub fail_draws: bool,
}

impl RecordingHost {
    pub fn errors(&self) -> usize {
        self.notices
            .iter()
            .filter(|n| matches!(n, Notice::Error(_)))
            .count()
    }

    pub fn loads_reported(&self) -> Vec<&str> {
        self.notices
            .iter()
            .filter_map(|n| match n {
                Notice::Load(url) => Some(url.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn main_loads(&self) -> Vec<&str> {
        self.loads
            .iter()
            .filter(|(slot, _)| *slot == ImageSlot::Main)
            .map(|(_, src)| src.as_str())
            .collect()
    }

    pub fn timer_active(&self, timer: Timer) -> bool {
        self.active_timers.contains_key(&timer)
    }

    pub fn set_main_size(&mut self, size: Option<Size>) {
        self.main_size = size;
        if let Some(main) = self.main.as_mut() {
            main.size = size;
        }
    }
}

impl HandleSource for RecordingHost {
    type Handle = StubImage;

    fn create_handle(&mut self, src: &str) -> StubImage {
        let complete = self.cache_everything || self.cached_urls.contains(src);
        StubImage {
            complete,
            size: complete.then(|| Size::new(4, 3)),
        }
    }
}

impl LoadObserver for RecordingHost {
    fn on_load_start(&mut self, url: &str) {
        self.starts.push(url.to_string());
    }

    fn on_load(&mut self, url: &str) {
        self.notices.push(Notice::Load(url.to_string()));
    }

    fn on_error(&mut self, error: &LoadError) {
        self.notices.push(Notice::Error(error.clone()));
    }

    fn on_load_placeholder(&mut self, url: &str) {
        self.notices.push(Notice::PlaceholderLoad(url.to_string()));
    }

    fn on_placeholder_error(&mut self, error: &LoadError) {
        self.notices.push(Notice::PlaceholderError(error.clone()));
    }
}

impl LoaderHost for RecordingHost {
    fn fetch_bytes(&mut self, ticket: Ticket, url: &str) {
        self.fetches.push((ticket, url.to_string()));
    }

    fn load_image(&mut self, _ticket: Ticket, slot: ImageSlot, src: &str) {
        if slot == ImageSlot::Main {
            self.main = Some(StubImage {
                complete: false,
                size: self.main_size,
            });
        }
        self.loads.push((slot, src.to_string()));
    }

    fn main_image(&self) -> Option<&StubImage> {
        self.main.as_ref()
    }

    fn draw(&mut self, plan: &DrawPlan) -> Result<(), DrawError> {
        if self.fail_draws {
            return Err(DrawError::SurfaceUnavailable);
        }
        self.draws.push(*plan);
        Ok(())
    }

    fn start_timer(&mut self, ticket: Ticket, timer: Timer, delay_ms: u32) {
        self.active_timers.insert(timer, (ticket, delay_ms));
        self.started_timers.push((timer, delay_ms));
    }

    fn cancel_timer(&mut self, timer: Timer) {
        self.active_timers.remove(&timer);
    }

    fn after_render(&mut self, ticket: Ticket) {
        self.renders.push(ticket);
    }
}
