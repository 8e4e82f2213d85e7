//! Background-image presentation variant.

use js_sys::Function;
use wasm_bindgen::prelude::*;
use web_sys::HtmlCanvasElement;

use crate::component::Component;
use crate::notify::CallbackKind;

/// A progressively loaded image rendered as a CSS `background-image`.
///
/// Same pipeline as `ProgressiveImage`; the view is exposed as ready-made
/// `url("...")` values for the image and placeholder layers.
#[wasm_bindgen]
pub struct ProgressiveBackground {
    inner: Component,
}

#[wasm_bindgen]
impl ProgressiveBackground {
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: Option<HtmlCanvasElement>,
        options: JsValue,
    ) -> Result<ProgressiveBackground, JsValue> {
        Ok(ProgressiveBackground {
            inner: Component::new(canvas, options)?,
        })
    }

    pub fn load(&self, props: JsValue) -> Result<(), JsValue> {
        self.inner.load(props)
    }

    pub fn set_source(&self, src: String) {
        self.inner.set_source(src);
    }

    pub fn set_options(&self, options: JsValue) -> Result<(), JsValue> {
        self.inner.set_options(options)
    }

    pub fn teardown(&self) {
        self.inner.teardown();
    }

    pub fn view(&self) -> Result<JsValue, JsValue> {
        self.inner.view_js()
    }

    #[wasm_bindgen(getter)]
    pub fn phase(&self) -> String {
        self.inner.phase()
    }

    #[wasm_bindgen(getter)]
    pub fn should_show_image(&self) -> bool {
        self.inner.view().should_show_image
    }

    /// `background-image` for the image layer, once there is one.
    #[wasm_bindgen(getter)]
    pub fn background_image(&self) -> Option<String> {
        self.inner.view().background_image()
    }

    /// `background-image` for the blurred layer.
    #[wasm_bindgen(getter)]
    pub fn placeholder_background(&self) -> Option<String> {
        self.inner.view().placeholder_background()
    }

    #[wasm_bindgen(getter)]
    pub fn padding_bottom(&self) -> Option<String> {
        self.inner.view().padding_bottom
    }

    #[wasm_bindgen(getter)]
    pub fn blur_filter(&self) -> Option<String> {
        self.inner.view().blur_filter
    }

    pub fn on_load_start(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::LoadStart, callback);
    }

    pub fn on_load(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Load, callback);
    }

    pub fn on_error(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Error, callback);
    }

    pub fn on_load_placeholder(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::PlaceholderLoad, callback);
    }

    pub fn on_placeholder_error(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::PlaceholderError, callback);
    }

    pub fn on_change(&self, callback: Option<Function>) {
        self.inner.set_callback(CallbackKind::Change, callback);
    }
}
