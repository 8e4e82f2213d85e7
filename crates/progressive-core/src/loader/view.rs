//! Presentation values derived from the load state.
//!
//! Recomputed on demand after every transition instead of being kept in sync
//! by hand.

use serde::Serialize;

use super::{ImageRequest, LoadState};

/// Everything a renderer needs to draw one progressive image.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadView {
    pub should_show_placeholder: bool,
    pub should_show_image: bool,
    pub is_cached: bool,
    pub placeholder_url: Option<String>,
    pub image_url: Option<String>,
    /// Height-as-percentage-of-width for the ratio box, e.g. `"56.25%"`.
    pub padding_bottom: Option<String>,
    /// `"100%"` until the natural width is known, then `"<width>px"`.
    pub max_width: String,
    /// CSS filter for the placeholder, e.g. `"blur(20px)"`.
    pub blur_filter: Option<String>,
}

impl LoadView {
    pub fn derive(state: &LoadState, request: Option<&ImageRequest>) -> Self {
        let ratio = request
            .and_then(|r| r.explicit_aspect_ratio)
            .unwrap_or_else(|| state.resolved_aspect_ratio());
        let no_ratio = request.is_some_and(|r| r.no_ratio);
        let cache_enabled = request.is_some_and(|r| r.cache_enabled);
        let blur = request.map(|r| r.blur_amount).unwrap_or(super::request::DEFAULT_BLUR);

        Self {
            should_show_placeholder: state.placeholder_url().is_some(),
            should_show_image: state.is_rendered(),
            is_cached: cache_enabled && state.is_cached(),
            placeholder_url: state.placeholder_url().map(str::to_owned),
            image_url: state.image_url().map(str::to_owned),
            padding_bottom: (!no_ratio).then(|| format!("{}%", ratio * 100.0)),
            max_width: match state.resolved_width() {
                0 => "100%".to_string(),
                width => format!("{}px", width),
            },
            blur_filter: (blur != 0.0).then(|| format!("blur({}px)", blur)),
        }
    }

    /// `background-image` value for the main image.
    pub fn background_image(&self) -> Option<String> {
        self.image_url.as_deref().map(css_url)
    }

    /// `background-image` value for the placeholder.
    pub fn placeholder_background(&self) -> Option<String> {
        self.placeholder_url.as_deref().map(css_url)
    }
}

fn css_url(url: &str) -> String {
    format!("url(\"{}\")", url.replace('"', "\\\""))
}
