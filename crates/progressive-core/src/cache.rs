//! Cache presence probing.
//!
//! Browsers mark an image handle as complete the moment its source is assigned
//! when the resource is already in the memory cache, before any event fires.
//! Reading that flag is a heuristic: it may miss cached resources but must
//! never report an uncached one.

use crate::Size;

/// A decoding image handle owned by the host.
pub trait ImageHandle {
    /// Whether the handle has finished loading its current source.
    fn is_complete(&self) -> bool;

    /// Natural pixel dimensions, or `None` while either is still zero.
    fn natural_size(&self) -> Option<Size>;
}

/// Creates image handles with a source already assigned.
pub trait HandleSource {
    type Handle: ImageHandle;

    fn create_handle(&mut self, src: &str) -> Self::Handle;
}

/// Check whether `url` resolves from the local image cache without a new wait.
///
/// A handle that is complete but has no dimensions (a broken resource the
/// browser gave up on) does not count as cached.
pub fn is_cached<S>(source: &mut S, url: &str) -> bool
where
    S: HandleSource + ?Sized,
{
    if url.is_empty() {
        return false;
    }

    let handle = source.create_handle(url);
    handle.is_complete() && handle.natural_size().is_some()
}
