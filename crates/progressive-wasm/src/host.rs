//! Browser implementation of the loader host.
//!
//! Every asynchronous completion (XHR events, image events, gloo timers and
//! animation frames) holds only a weak reference to the shared loader and a
//! [`Ticket`]; the loader decides whether the completion is still current.
//! Replacing or dropping a listener, timer or frame handle detaches it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::EventListener;
use gloo::render::{request_animation_frame, AnimationFrame};
use gloo::timers::callback::{Interval, Timeout};
use js_sys::{ArrayBuffer, Uint8Array};
use progressive_core::{
    DrawError, DrawPlan, HandleSource, ImageHandle, ImageLoader, ImageSlot, LoadError,
    LoadObserver, LoadView, LoaderHost, Size, Ticket, Timer,
};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, XmlHttpRequest,
    XmlHttpRequestResponseType,
};

use crate::notify::{describe, CallbackKind, Callbacks, Delivery, Notification};

pub(crate) type SharedLoader = Rc<RefCell<ImageLoader<WebHost>>>;
type WeakLoader = Weak<RefCell<ImageLoader<WebHost>>>;

/// Run `f` against the loader, then deliver whatever it raised.
pub(crate) fn update<F>(shared: &SharedLoader, f: F)
where
    F: FnOnce(&mut ImageLoader<WebHost>),
{
    let delivery = {
        let Ok(mut loader) = shared.try_borrow_mut() else {
            log::warn!("loader is busy, dropping update");
            return;
        };
        f(&mut loader);
        let view = loader.view();
        loader.host_mut().take_delivery(view)
    };
    delivery.deliver();
}

fn update_weak<F>(loader: &WeakLoader, f: F)
where
    F: FnOnce(&mut ImageLoader<WebHost>),
{
    if let Some(shared) = loader.upgrade() {
        update(&shared, f);
    }
}

/// A decoding `<img>` handle. `None` when the element could not be created.
pub struct WebImage(Option<HtmlImageElement>);

impl WebImage {
    fn element(&self) -> Option<&HtmlImageElement> {
        self.0.as_ref()
    }
}

impl ImageHandle for WebImage {
    fn is_complete(&self) -> bool {
        self.0.as_ref().is_some_and(HtmlImageElement::complete)
    }

    fn natural_size(&self) -> Option<Size> {
        let image = self.0.as_ref()?;
        natural_size(image.natural_width(), image.natural_height())
    }
}

/// Browser side of one progressive image.
pub struct WebHost {
    loader: WeakLoader,
    canvas: Option<HtmlCanvasElement>,
    request: Option<XmlHttpRequest>,
    request_listeners: Vec<EventListener>,
    main: Option<WebImage>,
    main_listeners: Vec<EventListener>,
    placeholder: Option<HtmlImageElement>,
    placeholder_listeners: Vec<EventListener>,
    poll_tick: Option<Interval>,
    poll_deadline: Option<Timeout>,
    fade_delay: Option<Timeout>,
    frame: Option<AnimationFrame>,
    callbacks: Callbacks,
    pending: Vec<Notification>,
}

impl WebHost {
    pub(crate) fn new(loader: WeakLoader, canvas: Option<HtmlCanvasElement>) -> Self {
        Self {
            loader,
            canvas,
            request: None,
            request_listeners: Vec::new(),
            main: None,
            main_listeners: Vec::new(),
            placeholder: None,
            placeholder_listeners: Vec::new(),
            poll_tick: None,
            poll_deadline: None,
            fade_delay: None,
            frame: None,
            callbacks: Callbacks::default(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn set_canvas(&mut self, canvas: Option<HtmlCanvasElement>) {
        self.canvas = canvas;
    }

    pub(crate) fn set_callback(&mut self, kind: CallbackKind, callback: Option<js_sys::Function>) {
        self.callbacks.set(kind, callback);
    }

    /// Detach every listener and cancel every timer.
    pub(crate) fn release(&mut self) {
        self.abort_fetch();
        self.main_listeners.clear();
        self.placeholder_listeners.clear();
        self.main = None;
        self.placeholder = None;
        self.poll_tick = None;
        self.poll_deadline = None;
        self.fade_delay = None;
        self.frame = None;
    }

    fn take_delivery(&mut self, view: LoadView) -> Delivery {
        Delivery {
            notifications: std::mem::take(&mut self.pending),
            callbacks: self.callbacks.clone(),
            view,
        }
    }

    fn abort_fetch(&mut self) {
        // Listeners go first: abort() dispatches its events synchronously.
        self.request_listeners.clear();
        if let Some(request) = self.request.take() {
            let _ = request.abort();
        }
    }

    fn send_request(&mut self, ticket: Ticket, url: &str) -> Result<(), JsValue> {
        let request = XmlHttpRequest::new()?;
        request.open("GET", url)?;
        request.set_response_type(XmlHttpRequestResponseType::Arraybuffer);

        let loader = self.loader.clone();
        let target = request.clone();
        let on_load = EventListener::new(&request, "load", move |_| {
            let response = read_response(&target);
            update_weak(&loader, |l| match &response {
                Ok((bytes, content_type)) => l.bytes_fetched(ticket, bytes, content_type.as_deref()),
                Err(reason) => l.fetch_failed(ticket, reason),
            });
        });
        let loader = self.loader.clone();
        let on_error = EventListener::new(&request, "error", move |_| {
            update_weak(&loader, |l| l.fetch_failed(ticket, "network error"));
        });

        request.send()?;
        self.request = Some(request);
        self.request_listeners = vec![on_load, on_error];
        Ok(())
    }

    fn watch_image(
        &self,
        image: &HtmlImageElement,
        ticket: Ticket,
        loaded: fn(&mut ImageLoader<WebHost>, Ticket),
        failed: fn(&mut ImageLoader<WebHost>, Ticket, &str),
    ) -> Vec<EventListener> {
        let loader = self.loader.clone();
        let on_load = EventListener::new(image, "load", move |_| {
            update_weak(&loader, |l| loaded(l, ticket));
        });
        let loader = self.loader.clone();
        let on_error = EventListener::new(image, "error", move |_| {
            update_weak(&loader, |l| failed(l, ticket, "image could not be decoded"));
        });
        vec![on_load, on_error]
    }

    /// Report a synchronous failure on the next task instead of re-entering
    /// the loader while it is borrowed.
    fn defer<F>(&self, f: F)
    where
        F: FnOnce(&mut ImageLoader<WebHost>) + 'static,
    {
        let loader = self.loader.clone();
        let _ = Timeout::new(0, move || update_weak(&loader, f)).forget();
    }
}

impl HandleSource for WebHost {
    type Handle = WebImage;

    fn create_handle(&mut self, src: &str) -> WebImage {
        match HtmlImageElement::new() {
            Ok(image) => {
                image.set_src(src);
                WebImage(Some(image))
            }
            Err(err) => {
                log::debug!("cache check unavailable: {}", describe(&err));
                WebImage(None)
            }
        }
    }
}

impl LoadObserver for WebHost {
    fn on_load_start(&mut self, url: &str) {
        self.pending.push(Notification::LoadStart(url.to_string()));
    }

    fn on_load(&mut self, url: &str) {
        self.pending.push(Notification::Load(url.to_string()));
    }

    fn on_error(&mut self, error: &LoadError) {
        self.pending.push(Notification::Error(error.clone()));
    }

    fn on_load_placeholder(&mut self, url: &str) {
        self.pending.push(Notification::PlaceholderLoad(url.to_string()));
    }

    fn on_placeholder_error(&mut self, error: &LoadError) {
        self.pending.push(Notification::PlaceholderError(error.clone()));
    }
}

impl LoaderHost for WebHost {
    fn fetch_bytes(&mut self, ticket: Ticket, url: &str) {
        self.abort_fetch();
        if let Err(err) = self.send_request(ticket, url) {
            self.request_listeners.clear();
            self.request = None;
            let reason = describe(&err);
            self.defer(move |l| l.fetch_failed(ticket, &reason));
        }
    }

    fn load_image(&mut self, ticket: Ticket, slot: ImageSlot, src: &str) {
        let image = match HtmlImageElement::new() {
            Ok(image) => image,
            Err(err) => {
                let reason = describe(&err);
                match slot {
                    ImageSlot::Main => self.defer(move |l| l.image_failed(ticket, &reason)),
                    ImageSlot::Placeholder => {
                        self.defer(move |l| l.placeholder_failed(ticket, &reason))
                    }
                }
                return;
            }
        };

        match slot {
            ImageSlot::Main => {
                self.main_listeners = self.watch_image(
                    &image,
                    ticket,
                    ImageLoader::image_loaded,
                    ImageLoader::image_failed,
                );
                image.set_src(src);
                self.main = Some(WebImage(Some(image)));
            }
            ImageSlot::Placeholder => {
                self.placeholder_listeners = self.watch_image(
                    &image,
                    ticket,
                    ImageLoader::placeholder_loaded,
                    ImageLoader::placeholder_failed,
                );
                image.set_src(src);
                self.placeholder = Some(image);
            }
        }
    }

    fn main_image(&self) -> Option<&WebImage> {
        self.main.as_ref()
    }

    fn draw(&mut self, plan: &DrawPlan) -> Result<(), DrawError> {
        let canvas = self.canvas.as_ref().ok_or(DrawError::SurfaceUnavailable)?;
        let image = self
            .main
            .as_ref()
            .and_then(WebImage::element)
            .ok_or(DrawError::SurfaceUnavailable)?;
        let context = canvas
            .get_context("2d")
            .map_err(canvas_error)?
            .ok_or(DrawError::SurfaceUnavailable)?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| DrawError::SurfaceUnavailable)?;

        canvas.set_width(plan.canvas.width);
        canvas.set_height(plan.canvas.height);
        context
            .set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
            .map_err(canvas_error)?;
        if let Some(t) = plan.transform {
            context
                .transform(t.a, t.b, t.c, t.d, t.e, t.f)
                .map_err(canvas_error)?;
        }
        context
            .draw_image_with_html_image_element(image, 0.0, 0.0)
            .map_err(canvas_error)
    }

    fn start_timer(&mut self, ticket: Ticket, timer: Timer, delay_ms: u32) {
        let loader = self.loader.clone();
        let fire = move || update_weak(&loader, |l| l.timer_fired(ticket, timer));

        if timer.is_repeating() {
            self.poll_tick = Some(Interval::new(delay_ms, fire));
            return;
        }
        let timeout = Some(Timeout::new(delay_ms, fire));
        match timer {
            Timer::FadeDelay => self.fade_delay = timeout,
            Timer::PollDeadline | Timer::PollTick => self.poll_deadline = timeout,
        }
    }

    fn cancel_timer(&mut self, timer: Timer) {
        match timer {
            Timer::PollTick => self.poll_tick = None,
            Timer::PollDeadline => self.poll_deadline = None,
            Timer::FadeDelay => {
                self.fade_delay = None;
                self.frame = None;
            }
        }
    }

    fn after_render(&mut self, ticket: Ticket) {
        let loader = self.loader.clone();
        self.frame = Some(request_animation_frame(move |_| {
            update_weak(&loader, |l| l.render_flushed(ticket));
        }));
    }
}

fn canvas_error(err: JsValue) -> DrawError {
    DrawError::Canvas(describe(&err))
}

fn read_response(request: &XmlHttpRequest) -> Result<(Vec<u8>, Option<String>), String> {
    let status = request.status().map_err(|e| describe(&e))?;
    if !is_success(status) {
        return Err(status_reason(status, &request.status_text().unwrap_or_default()));
    }
    let body = request.response().map_err(|e| describe(&e))?;
    let buffer = body
        .dyn_into::<ArrayBuffer>()
        .map_err(|_| "response is not an ArrayBuffer".to_string())?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    let content_type = request.get_response_header("Content-Type").ok().flatten();
    Ok((bytes, content_type))
}

/// `0` is what `file:` and `data:` URLs report.
fn is_success(status: u16) -> bool {
    status == 0 || (200..300).contains(&status)
}

fn status_reason(status: u16, text: &str) -> String {
    match text.trim() {
        "" => format!("HTTP {}", status),
        text => format!("HTTP {} {}", status, text),
    }
}

fn natural_size(width: u32, height: u32) -> Option<Size> {
    (width > 0 && height > 0).then(|| Size::new(width, height))
}
