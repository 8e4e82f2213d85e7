//! `<img>` presentation variant.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::component::Component;
use crate::notify::CallbackKind;

/// A progressively loaded image rendered through an `<img>` element.
///
/// The host page renders the placeholder and the image from the view values
/// and passes in the canvas used to redraw the image upright.
///
/// # Example (TypeScript)
/// ```typescript
/// const image = new ProgressiveImage(canvas, { delay: 150 });
/// image.on_change((view) => render(view));
/// image.on_error((err) => console.error(err));
/// image.load({ src: '/photo.jpg', placeholder: '/photo-thumb.jpg' });
///
/// // When the element is removed from the page
/// image.teardown();
/// image.free();
/// ```
#[wasm_bindgen]
pub struct ProgressiveImage {
    inner: Component,
}

#[wasm_bindgen]
impl ProgressiveImage {
    /// Create an image bound to an optional off-screen canvas.
    ///
    /// # Arguments
    /// * `canvas` - Surface used for the orientation redraw; without it the
    ///   redraw is skipped
    /// * `options` - Global options object, or `undefined` for defaults
    ///
    /// # Errors
    /// Returns error if the options cannot be deserialized
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: Option<HtmlCanvasElement>,
        options: JsValue,
    ) -> Result<ProgressiveImage, JsValue> {
        Ok(ProgressiveImage {
            inner: Component::new(canvas, options)?,
        })
    }

    /// Start loading. Any load in flight is discarded.
    pub fn load(&self, props: JsValue) -> Result<(), JsValue> {
        self.inner.load(props)
    }

    /// The `src` prop changed.
    pub fn set_source(&self, src: String) {
        self.inner.set_source(src);
    }

    pub fn set_options(&self, options: JsValue) -> Result<(), JsValue> {
        self.inner.set_options(options)
    }

    pub fn set_canvas(&self, canvas: Option<HtmlCanvasElement>) {
        self.inner.set_canvas(canvas);
    }

    /// Cancel everything in flight.
    pub fn teardown(&self) {
        self.inner.teardown();
    }

    /// Current presentation values as a plain object.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        self.inner.view_js()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.inner.phase()
    }

    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> u16 {
        self.inner.orientation()
    }

    #[wasm_bindgen(getter)]
    pub fn should_show_placeholder(&self) -> bool {
        self.inner.view().should_show_placeholder
    }

    #[wasm_bindgen(getter)]
    pub fn should_show_image(&self) -> bool {
        self.inner.view().should_show_image
    }

    #[wasm_bindgen(getter)]
    pub fn is_cached(&self) -> bool {
        self.inner.view().is_cached
    }

    #[wasm_bindgen(getter)]
    pub fn image_url(&self) -> Option<String> {
        self.inner.view().image_url
    }

    #[wasm_bindgen(getter)]
    pub fn placeholder_url(&self) -> Option<String> {
        self.inner.view().placeholder_url
    }

    /// Padding that reserves the image's height, e.g. `"56.25%"`.
    #[wasm_bindgen(getter)]
    pub fn padding_bottom(&self) -> Option<String> {
        self.inner.view().padding_bottom
    }

    #[wasm_bindgen(getter)]
    pub fn max_width(&self) -> String {
        self.inner.view().max_width
    }

    #[wasm_bindgen(getter)]
    pub fn blur_filter(&self) -> Option<String> {
        self.inner.view().blur_filter
    }

    /// Called with the source URL whenever a new load starts.
    pub fn on_load_start(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::LoadStart, callback);
    }

    /// Called with the resolved URL once the image is shown.
    pub fn on_load(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Load, callback);
    }

    /// Called with an `Error` for every failed attempt.
    pub fn on_error(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Error, callback);
    }

    pub fn on_load_placeholder(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::PlaceholderLoad, callback);
    }

    pub fn on_placeholder_error(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::PlaceholderError, callback);
    }

    /// Called with the new view after every update.
    pub fn on_change(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Change, callback);
    }
}
