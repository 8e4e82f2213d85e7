//! Shared capability held by both presentation variants.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Function;
use progressive_core::{ImageLoader, ImageProps, LoadView, LoaderOptions};
use wasm_bindgen::JsValue;
use web_sys::HtmlCanvasElement;

use crate::host::{self, SharedLoader, WebHost};
use crate::notify::CallbackKind;

/// One progressive image: the loader plus its browser host.
pub(crate) struct Component {
    loader: SharedLoader,
}

impl Component {
    pub(crate) fn new(
        canvas: Option<HtmlCanvasElement>,
        options: JsValue,
    ) -> Result<Component, JsValue> {
        let options = parse_options(options)?;
        let loader = Rc::new_cyclic(|weak| {
            RefCell::new(ImageLoader::new(WebHost::new(weak.clone(), canvas), options))
        });
        Ok(Component { loader })
    }

    pub(crate) fn load(&self, props: JsValue) -> Result<(), JsValue> {
        let props: ImageProps = serde_wasm_bindgen::from_value(props)
            .map_err(|e| JsValue::from_str(&format!("Invalid image props: {}", e)))?;
        host::update(&self.loader, |loader| loader.load(props));
        Ok(())
    }

    pub(crate) fn set_source(&self, src: String) {
        host::update(&self.loader, |loader| loader.source_changed(src));
    }

    pub(crate) fn set_options(&self, options: JsValue) -> Result<(), JsValue> {
        let options = parse_options(options)?;
        host::update(&self.loader, |loader| loader.set_options(options));
        Ok(())
    }

    pub(crate) fn set_canvas(&self, canvas: Option<HtmlCanvasElement>) {
        host::update(&self.loader, |loader| loader.host_mut().set_canvas(canvas));
    }

    pub(crate) fn teardown(&self) {
        host::update(&self.loader, |loader| {
            loader.teardown();
            loader.host_mut().release();
        });
    }

    pub(crate) fn set_callback(&self, kind: CallbackKind, callback: Option<Function>) {
        if let Ok(mut loader) = self.loader.try_borrow_mut() {
            loader.host_mut().set_callback(kind, callback);
        }
    }

    pub(crate) fn view(&self) -> LoadView {
        self.loader.borrow().view()
    }

    pub(crate) fn view_js(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.view())
            .map_err(|e| JsValue::from_str(&format!("Failed to serialize view: {}", e)))
    }

    pub(crate) fn phase(&self) -> String {
        format!("{:?}", self.loader.borrow().state().phase())
    }

    pub(crate) fn orientation(&self) -> u16 {
        self.loader.borrow().orientation().code()
    }
}

impl Drop for Component {
    fn drop(&mut self) {
        if let Ok(mut loader) = self.loader.try_borrow_mut() {
            loader.teardown();
            loader.host_mut().release();
        }
    }
}

/// `undefined` and `null` mean "all defaults".
fn parse_options(options: JsValue) -> Result<LoaderOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(LoaderOptions::default());
    }
    serde_wasm_bindgen::from_value(options)
        .map_err(|e| JsValue::from_str(&format!("Invalid loader options: {}", e)))
}
