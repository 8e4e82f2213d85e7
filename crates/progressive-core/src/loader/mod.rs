//! The per-image load coordinator.
//!
//! [`ImageLoader`] owns one [`LoadState`] and walks it through
//!
//! ```text
//! Idle → FetchingBytes → ParsingOrientation → CheckingCache
//!      ├─ cached ──────────────────────────────────────────→ Rendered
//!      └─ AwaitingDimensions → Drawing → FadingIn ─────────→ Rendered
//! any failure → Errored ─(fallback, once)→ FetchingBytes
//! ```
//!
//! Every suspension point is a call into the [`LoaderHost`] followed, later,
//! by a completion call on the loader carrying the [`Ticket`] it was issued.
//! Completions whose ticket no longer matches are dropped, so a superseded
//! load can never touch the current state.
//!
//! The placeholder is requested alongside the main fetch and settles on its
//! own; it only ever decides whether there is something blurred to show.

mod error;
mod host;
mod placeholder;
mod request;
mod state;
mod view;

#[cfg(test)]
pub(crate) mod test_host;

pub use error::{DrawError, LoadError};
pub use host::{ImageSlot, LoadObserver, LoaderHost, Ticket, Timer};
pub use placeholder::{PlaceholderLoader, PlaceholderStatus};
pub use request::{ImageProps, ImageRequest, LoaderOptions, DEFAULT_BLUR};
pub use state::{LoadState, Phase};
pub use view::LoadView;

use crate::aspect::{PollConfig, PollStatus};
use crate::cache::{is_cached, ImageHandle};
use crate::orientation::{read_orientation, DrawPlan, Orientation};

/// Drives one image from fetch to fade-in.
pub struct ImageLoader<H: LoaderHost> {
    host: H,
    options: LoaderOptions,
    props: Option<ImageProps>,
    request: Option<ImageRequest>,
    state: LoadState,
    placeholder: PlaceholderLoader,
    generation: u64,
    attempt: u8,
    orientation: Orientation,
    /// Source handed to the main image: the data URI, or the raw fallback URL.
    image_source: Option<String>,
}

impl<H: LoaderHost> ImageLoader<H> {
    pub fn new(host: H, options: LoaderOptions) -> Self {
        Self {
            host,
            options,
            props: None,
            request: None,
            state: LoadState::new(PollConfig::default()),
            placeholder: PlaceholderLoader::default(),
            generation: 0,
            attempt: 0,
            orientation: Orientation::Normal,
            image_source: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Replace the global options. Takes effect on the next load.
    pub fn set_options(&mut self, options: LoaderOptions) {
        self.options = options;
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn request(&self) -> Option<&ImageRequest> {
        self.request.as_ref()
    }

    pub fn placeholder(&self) -> &PlaceholderLoader {
        &self.placeholder
    }

    /// Orientation read from the most recent fetch.
    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Ticket for the attempt currently in flight.
    pub fn ticket(&self) -> Ticket {
        Ticket::new(self.generation, self.attempt)
    }

    pub fn view(&self) -> LoadView {
        LoadView::derive(&self.state, self.request.as_ref())
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    /// Start loading `props`, discarding any load in flight.
    pub fn load(&mut self, props: ImageProps) {
        let request = ImageRequest::resolve(&props, &self.options);
        self.props = Some(props);
        self.start(request);
    }

    /// The component's source changed: tear down and restart with `src`.
    pub fn source_changed(&mut self, src: impl Into<String>) {
        let mut props = self.props.clone().unwrap_or_default();
        props.src = src.into();
        self.load(props);
    }

    /// Stop everything in flight. Later completions are ignored.
    pub fn teardown(&mut self) {
        self.cancel_timers();
        self.generation = self.generation.wrapping_add(1);
        self.attempt = 0;
    }

    fn start(&mut self, request: ImageRequest) {
        self.cancel_timers();
        self.generation = self.generation.wrapping_add(1);
        self.attempt = 0;
        self.state = LoadState::new(request.poll_config());
        self.orientation = Orientation::Normal;
        self.image_source = None;

        log::debug!(
            "loading {} (generation {})",
            request.source_url,
            self.generation
        );

        self.host.on_load_start(&request.source_url);

        let ticket = self.ticket();
        self.placeholder
            .start(&mut self.host, ticket, request.placeholder_url.as_deref());

        let url = request.source_url.clone();
        self.request = Some(request);
        self.fetch(ticket, &url);
    }

    fn fetch(&mut self, ticket: Ticket, url: &str) {
        self.state.advance(Phase::FetchingBytes);
        self.host.fetch_bytes(ticket, url);
    }

    // ------------------------------------------------------------------
    // Main pipeline completions
    // ------------------------------------------------------------------

    /// The bytes requested by `fetch_bytes` arrived.
    pub fn bytes_fetched(&mut self, ticket: Ticket, bytes: &[u8], content_type: Option<&str>) {
        if !self.accepts(ticket, Phase::FetchingBytes, "fetched bytes") {
            return;
        }
        let Some(request) = self.request.as_ref() else {
            return;
        };
        let retry_source = (self.attempt > 0).then(|| request.source_url.clone());

        self.state.advance(Phase::ParsingOrientation);
        let source = read_orientation(bytes, content_type);
        log::debug!(
            "read {} bytes, orientation {:?}",
            bytes.len(),
            source.orientation
        );
        self.orientation = source.orientation;

        let image_source = retry_source.unwrap_or(source.data_uri);
        self.check_cache(ticket, image_source);
    }

    /// The fetch requested by `fetch_bytes` failed.
    pub fn fetch_failed(&mut self, ticket: Ticket, reason: &str) {
        let url = self
            .request
            .as_ref()
            .map(|r| r.source_url.clone())
            .unwrap_or_default();
        self.fail(ticket, LoadError::fetch(url, reason));
    }

    fn check_cache(&mut self, ticket: Ticket, src: String) {
        self.state.advance(Phase::CheckingCache);

        let cache_enabled = self.request.as_ref().is_some_and(|r| r.cache_enabled);
        let cached = cache_enabled && is_cached(&mut self.host, &src);
        self.image_source = Some(src.clone());

        if cached {
            log::debug!("cache hit, skipping redraw and fade");
            self.state.set_image_url(Some(src.clone()));
            self.state.set_placeholder_url(None);
            self.state.set_cached(true);
            self.state.set_rendered(true);
            self.state.set_errored(false);
            self.state.advance(Phase::Rendered);
            self.host.on_load(&src);

            // Dimensions are still unknown; let the handle report them.
            if self.needs_dimensions() {
                self.host.load_image(ticket, ImageSlot::Main, &src);
                self.start_poll(ticket);
            }
            return;
        }

        self.state.set_image_url(None);
        self.state.set_cached(false);
        self.state.set_rendered(false);
        self.state.advance(Phase::AwaitingDimensions);

        self.host.load_image(ticket, ImageSlot::Main, &src);
        if self.needs_dimensions() {
            self.start_poll(ticket);
        }
    }

    /// The main image element finished decoding.
    pub fn image_loaded(&mut self, ticket: Ticket) {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale image load for {:?}", ticket);
            return;
        }
        // A result is already committed (cache fast path or a repeated signal).
        if self.state.image_url().is_some() {
            return;
        }
        if self.state.phase() != Phase::AwaitingDimensions {
            return;
        }
        let Some(src) = self.image_source.clone() else {
            return;
        };

        if self.needs_dimensions() && self.state.poll.take_retry() {
            log::debug!("dimension poll timed out earlier, retrying once");
            self.start_poll(ticket);
        }

        self.state.set_image_url(Some(src.clone()));
        self.state.set_errored(false);
        self.state.advance(Phase::Drawing);
        self.redraw();

        self.host.on_load(&src);

        self.state.advance(Phase::FadingIn);
        self.host.after_render(ticket);
    }

    /// The main image element rejected its source.
    pub fn image_failed(&mut self, ticket: Ticket, reason: &str) {
        let url = self.image_source.clone().unwrap_or_default();
        self.fail(ticket, LoadError::decode(url, reason));
    }

    /// The rendering pass requested by `after_render` has flushed.
    pub fn render_flushed(&mut self, ticket: Ticket) {
        if !self.accepts(ticket, Phase::FadingIn, "render flush") {
            return;
        }
        let delay = self.request.as_ref().map_or(0, |r| r.delay_ms);
        self.host.start_timer(ticket, Timer::FadeDelay, delay);
    }

    /// A timer started with `start_timer` fired.
    pub fn timer_fired(&mut self, ticket: Ticket, timer: Timer) {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale {:?} for {:?}", timer, ticket);
            return;
        }
        match timer {
            Timer::PollTick => self.poll_tick(),
            Timer::PollDeadline => self.poll_deadline(),
            Timer::FadeDelay => self.fade_in(),
        }
    }

    fn redraw(&mut self) {
        let Some(size) = self.host.main_image().and_then(|h| h.natural_size()) else {
            log::debug!("main image has no dimensions yet, skipping redraw");
            return;
        };

        let plan = DrawPlan::new(self.orientation, size);
        if let Err(err) = self.host.draw(&plan) {
            log::debug!("redraw skipped: {}", err);
        }
    }

    fn fade_in(&mut self) {
        if self.state.phase() != Phase::FadingIn {
            return;
        }
        self.state.set_rendered(true);
        self.state.set_placeholder_url(None);
        self.state.advance(Phase::Rendered);

        if let Some(request) = &self.request {
            log::info!("rendered {}", request.source_url);
        }
    }

    fn fail(&mut self, ticket: Ticket, error: LoadError) {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale failure for {:?}: {}", ticket, error);
            return;
        }
        if !self.state.advance(Phase::Errored) {
            log::debug!("ignoring failure in phase {:?}: {}", self.state.phase(), error);
            return;
        }

        self.cancel_poll();
        self.state.set_errored(true);
        self.host.on_error(&error);

        let Some(request) = self.request.as_ref() else {
            return;
        };
        let fallback = if self.attempt == 0 {
            request.fallback_url.clone()
        } else {
            None
        };

        match fallback {
            Some(url) => {
                log::debug!("{}; retrying with fallback {}", error, url);
                let retry = request.with_source(url.as_str());
                self.attempt += 1;
                self.request = Some(retry);
                self.image_source = None;
                self.state.set_image_url(None);
                self.state.set_cached(false);
                self.state.set_rendered(false);

                let ticket = self.ticket();
                self.fetch(ticket, &url);
            }
            None if self.attempt == 0 => {
                log::warn!("{} (no fallback configured)", error);
            }
            None => {
                log::warn!("{} (fallback exhausted)", error);
            }
        }
    }

    // ------------------------------------------------------------------
    // Placeholder completions
    // ------------------------------------------------------------------

    pub fn placeholder_loaded(&mut self, ticket: Ticket) {
        if ticket.generation() != self.generation {
            log::debug!("ignoring stale placeholder load for {:?}", ticket);
            return;
        }
        let Some(url) = self.placeholder.finish().map(str::to_owned) else {
            return;
        };

        // The main image won the race; showing the blur now would flash it back.
        if !self.state.is_rendered() {
            self.state.set_placeholder_url(Some(url.clone()));
        }
        self.host.on_load_placeholder(&url);
    }

    pub fn placeholder_failed(&mut self, ticket: Ticket, reason: &str) {
        if ticket.generation() != self.generation {
            log::debug!("ignoring stale placeholder failure for {:?}", ticket);
            return;
        }
        let Some(url) = self.placeholder.fail().map(str::to_owned) else {
            return;
        };

        let error = LoadError::decode(url, reason);
        log::warn!("placeholder: {}", error);
        self.host.on_placeholder_error(&error);
    }

    // ------------------------------------------------------------------
    // Aspect ratio poll
    // ------------------------------------------------------------------

    fn needs_dimensions(&self) -> bool {
        self.request
            .as_ref()
            .is_some_and(|r| r.explicit_aspect_ratio.is_none())
    }

    fn start_poll(&mut self, ticket: Ticket) {
        if !self.state.poll.begin() {
            return;
        }
        let config = self.state.poll.config();
        self.host
            .start_timer(ticket, Timer::PollTick, config.interval_ms);
        self.host
            .start_timer(ticket, Timer::PollDeadline, config.timeout_ms);
    }

    fn poll_tick(&mut self) {
        if !self.state.poll.is_polling() {
            return;
        }
        let size = self.host.main_image().and_then(|h| h.natural_size());
        let status = self.state.poll.record(size);
        self.settle_poll(status);
    }

    fn poll_deadline(&mut self) {
        if !self.state.poll.is_polling() {
            return;
        }
        let size = self.host.main_image().and_then(|h| h.natural_size());
        let status = self.state.poll.expire_with(size);
        self.settle_poll(status);
    }

    fn settle_poll(&mut self, status: PollStatus) {
        match status {
            PollStatus::Resolved(size) => {
                self.stop_poll_timers();
                self.state.set_dimensions(size.width, size.aspect_ratio());
                log::debug!("dimensions {}x{}", size.width, size.height);
            }
            PollStatus::Killed => {
                self.stop_poll_timers();
                log::debug!("dimension poll timed out");
            }
            PollStatus::Idle | PollStatus::Polling => {}
        }
    }

    fn cancel_poll(&mut self) {
        self.state.poll.cancel();
        self.stop_poll_timers();
    }

    fn stop_poll_timers(&mut self) {
        self.host.cancel_timer(Timer::PollTick);
        self.host.cancel_timer(Timer::PollDeadline);
    }

    fn cancel_timers(&mut self) {
        self.cancel_poll();
        self.host.cancel_timer(Timer::FadeDelay);
    }

    // ------------------------------------------------------------------
    // Guards
    // ------------------------------------------------------------------

    fn is_current(&self, ticket: Ticket) -> bool {
        ticket == self.ticket()
    }

    fn accepts(&self, ticket: Ticket, expected: Phase, what: &str) -> bool {
        if !self.is_current(ticket) {
            log::debug!("ignoring stale {} for {:?}", what, ticket);
            return false;
        }
        if self.state.phase() != expected {
            log::debug!("ignoring {} in phase {:?}", what, self.state.phase());
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests;
