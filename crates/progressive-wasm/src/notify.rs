//! JavaScript callbacks for lifecycle notifications.
//!
//! Notifications raised while the loader is borrowed are queued on the host
//! and handed to JavaScript only after the borrow is released, so a callback
//! may call back into the component.

use js_sys::Function;
use progressive_core::{LoadError, LoadView};
use wasm_bindgen::JsValue;

/// One queued lifecycle notification.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Notification {
    LoadStart(String),
    Load(String),
    Error(LoadError),
    PlaceholderLoad(String),
    PlaceholderError(LoadError),
}

/// Which callback slot to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallbackKind {
    LoadStart,
    Load,
    Error,
    PlaceholderLoad,
    PlaceholderError,
    Change,
}

/// Registered JavaScript callbacks.
#[derive(Debug, Clone, Default)]
pub(crate) struct Callbacks {
    on_load_start: Option<Function>,
    on_load: Option<Function>,
    on_error: Option<Function>,
    on_load_placeholder: Option<Function>,
    on_placeholder_error: Option<Function>,
    on_change: Option<Function>,
}

impl Callbacks {
    pub(crate) fn set(&mut self, kind: CallbackKind, callback: Option<Function>) {
        let slot = match kind {
            CallbackKind::LoadStart => &mut self.on_load_start,
            CallbackKind::Load => &mut self.on_load,
            CallbackKind::Error => &mut self.on_error,
            CallbackKind::PlaceholderLoad => &mut self.on_load_placeholder,
            CallbackKind::PlaceholderError => &mut self.on_placeholder_error,
            CallbackKind::Change => &mut self.on_change,
        };
        *slot = callback;
    }

    fn for_notification(&self, notification: &Notification) -> Option<&Function> {
        match notification {
            Notification::LoadStart(_) => self.on_load_start.as_ref(),
            Notification::Load(_) => self.on_load.as_ref(),
            Notification::Error(_) => self.on_error.as_ref(),
            Notification::PlaceholderLoad(_) => self.on_load_placeholder.as_ref(),
            Notification::PlaceholderError(_) => self.on_placeholder_error.as_ref(),
        }
    }
}

/// Everything collected during one update, ready to hand to JavaScript.
pub(crate) struct Delivery {
    pub(crate) notifications: Vec<Notification>,
    pub(crate) callbacks: Callbacks,
    pub(crate) view: LoadView,
}

impl Delivery {
    pub(crate) fn deliver(self) {
        for notification in &self.notifications {
            if let Some(callback) = self.callbacks.for_notification(notification) {
                invoke(callback, &argument(notification));
            }
        }

        let Some(on_change) = &self.callbacks.on_change else {
            return;
        };
        match serde_wasm_bindgen::to_value(&self.view) {
            Ok(view) => invoke(on_change, &view),
            Err(err) => log::warn!("failed to serialize view: {}", err),
        }
    }
}

fn argument(notification: &Notification) -> JsValue {
    match notification {
        Notification::LoadStart(url)
        | Notification::Load(url)
        | Notification::PlaceholderLoad(url) => JsValue::from_str(url),
        Notification::Error(error) | Notification::PlaceholderError(error) => {
            js_sys::Error::new(&error.to_string()).into()
        }
    }
}

fn invoke(callback: &Function, argument: &JsValue) {
    if let Err(err) = callback.call1(&JsValue::NULL, argument) {
        log::warn!("callback threw: {}", describe(&err));
    }
}

/// Best-effort text for a thrown JavaScript value.
pub(crate) fn describe(value: &JsValue) -> String {
    use wasm_bindgen::JsCast;

    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{:?}", value))
}
