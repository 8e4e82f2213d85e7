//! Low-resolution placeholder tracking.
//!
//! The placeholder loads in parallel with the main pipeline and never gates
//! it; either may finish first.

use super::{ImageSlot, LoaderHost, Ticket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaceholderStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderLoader {
    url: Option<String>,
    status: PlaceholderStatus,
}

impl PlaceholderLoader {
    pub fn status(&self) -> PlaceholderStatus {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Ask the host for the placeholder, if one is configured.
    pub fn start<H>(&mut self, host: &mut H, ticket: Ticket, url: Option<&str>) -> bool
    where
        H: LoaderHost + ?Sized,
    {
        *self = Self::default();
        let Some(url) = url else {
            return false;
        };

        self.url = Some(url.to_string());
        self.status = PlaceholderStatus::Loading;
        host.load_image(ticket, ImageSlot::Placeholder, url);
        true
    }

    /// Record a successful load. Returns the URL unless no load was pending.
    pub fn finish(&mut self) -> Option<&str> {
        self.settle(PlaceholderStatus::Loaded)
    }

    /// Record a failed load. Returns the URL unless no load was pending.
    pub fn fail(&mut self) -> Option<&str> {
        self.settle(PlaceholderStatus::Failed)
    }

    fn settle(&mut self, status: PlaceholderStatus) -> Option<&str> {
        if self.status != PlaceholderStatus::Loading {
            return None;
        }
        self.status = status;
        self.url.as_deref()
    }
}
