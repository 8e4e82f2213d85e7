//! Load requests and their configuration sources.
//!
//! `LoaderOptions` are installed once for every image a host renders;
//! `ImageProps` come from a single component. Props win over options, and
//! both fall back to the built-in defaults.

use serde::{Deserialize, Serialize};

use crate::aspect::{PollConfig, DEFAULT_POLL_INTERVAL_MS, DEFAULT_POLL_TIMEOUT_MS};

/// Blur radius in pixels applied to the placeholder when none is configured.
pub const DEFAULT_BLUR: f64 = 20.0;

/// Global defaults shared by every image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoaderOptions {
    /// Enable the cache fast path.
    pub cache: bool,
    pub blur: Option<f64>,
    /// Extra wait before the fade-in, in milliseconds.
    pub delay: u32,
    /// Aspect ratio poll timeout, in milliseconds.
    pub timeout: u32,
    /// Aspect ratio poll interval, in milliseconds.
    pub poll_interval: u32,
    pub fallback: Option<String>,
    pub placeholder: Option<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            cache: true,
            blur: None,
            delay: 0,
            timeout: DEFAULT_POLL_TIMEOUT_MS,
            poll_interval: DEFAULT_POLL_INTERVAL_MS,
            fallback: None,
            placeholder: None,
        }
    }
}

/// Inputs of a single image component.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageProps {
    pub src: String,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub blur: Option<f64>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    /// Skip the padding-based ratio box entirely.
    #[serde(default)]
    pub no_ratio: bool,
    #[serde(default)]
    pub fallback: Option<String>,
}

impl ImageProps {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Default::default()
        }
    }
}

/// One load attempt. Immutable; a fallback substitution derives a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRequest {
    pub source_url: String,
    pub fallback_url: Option<String>,
    pub placeholder_url: Option<String>,
    pub explicit_aspect_ratio: Option<f64>,
    pub blur_amount: f64,
    pub cache_enabled: bool,
    pub no_ratio: bool,
    pub delay_ms: u32,
    pub poll_interval_ms: u32,
    pub poll_timeout_ms: u32,
}

impl ImageRequest {
    /// Merge component props over global options.
    pub fn resolve(props: &ImageProps, options: &LoaderOptions) -> Self {
        Self {
            source_url: props.src.clone(),
            fallback_url: non_empty(props.fallback.as_ref().or(options.fallback.as_ref())),
            placeholder_url: non_empty(
                props.placeholder.as_ref().or(options.placeholder.as_ref()),
            ),
            explicit_aspect_ratio: props
                .aspect_ratio
                .filter(|ratio| ratio.is_finite() && *ratio > 0.0),
            blur_amount: props
                .blur
                .or(options.blur)
                .filter(|blur| blur.is_finite() && *blur >= 0.0)
                .unwrap_or(DEFAULT_BLUR),
            cache_enabled: options.cache,
            no_ratio: props.no_ratio,
            delay_ms: options.delay,
            poll_interval_ms: nonzero_or(options.poll_interval, DEFAULT_POLL_INTERVAL_MS),
            poll_timeout_ms: nonzero_or(options.timeout, DEFAULT_POLL_TIMEOUT_MS),
        }
    }

    /// The same request pointed at another source.
    pub fn with_source(&self, url: impl Into<String>) -> Self {
        Self {
            source_url: url.into(),
            ..self.clone()
        }
    }

    pub fn poll_config(&self) -> PollConfig {
        PollConfig {
            interval_ms: self.poll_interval_ms,
            timeout_ms: self.poll_timeout_ms,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value.filter(|url| !url.is_empty()).cloned()
}

fn nonzero_or(value: u32, default: u32) -> u32 {
    if value == 0 {
        default
    } else {
        value
    }
}
