//! Progressive WASM - WebAssembly bindings for the progressive image loader
//!
//! This crate drives progressive-core from the browser: fetches go through
//! `XMLHttpRequest`, decodes through `<img>` elements, the orientation redraw
//! through a 2D canvas, and timers and frame deferrals through gloo.
//!
//! # Module Structure
//!
//! - `image` - `ProgressiveImage`, the `<img>` variant
//! - `background` - `ProgressiveBackground`, the CSS background variant
//! - `component` - The loader and host shared by both variants
//! - `host` - Browser implementation of the loader host
//! - `notify` - Lifecycle callbacks
//! - `logger` - Console backend for the `log` facade
//!
//! # Usage
//!
//! ```typescript
//! import init, { ProgressiveImage, set_log_level } from '@progressive/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//! set_log_level('info');
//!
//! const image = new ProgressiveImage(canvas, { cache: true, blur: 30 });
//! image.on_change((view) => {
//!   img.src = view.imageUrl ?? '';
//!   wrapper.style.paddingBottom = view.paddingBottom ?? '';
//! });
//! image.load({ src: '/photo.jpg', placeholder: '/photo-thumb.jpg' });
//! ```

use wasm_bindgen::prelude::*;

mod background;
mod component;
mod host;
mod image;
mod logger;
mod notify;

pub use background::ProgressiveBackground;
pub use image::ProgressiveImage;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init(logger::default_level());
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Change how much the loader logs to the console.
///
/// # Errors
/// Returns error if `level` is not one of off, error, warn, info, debug, trace
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = logger::parse_level(level)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown log level: {}", level)))?;
    logger::init(filter);
    Ok(())
}
