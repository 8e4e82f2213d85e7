//! Error types for the load pipeline.

use thiserror::Error;

/// A failure reported to observers. Never returned across the public API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    /// The bytes could not be retrieved.
    #[error("Failed to fetch {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// The bytes arrived but the image handle refused them.
    #[error("Failed to decode {url}: {reason}")]
    Decode { url: String, reason: String },
}

impl LoadError {
    pub fn fetch(url: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Fetch {
            url: url.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(url: impl Into<String>, reason: impl Into<String>) -> Self {
        LoadError::Decode {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// The URL the failure relates to.
    pub fn url(&self) -> &str {
        match self {
            LoadError::Fetch { url, .. } | LoadError::Decode { url, .. } => url,
        }
    }
}

/// Off-screen redraw failures. Logged and swallowed by the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawError {
    /// No canvas is attached, or it has no 2D context.
    #[error("Drawing surface unavailable")]
    SurfaceUnavailable,

    /// The context rejected the transform or the draw call.
    #[error("Canvas error: {0}")]
    Canvas(String),
}
