//! EXIF orientation handling for progressively loaded images.
//!
//! This module provides functionality for:
//! - Scanning a fetched byte stream for the EXIF orientation tag
//! - Encoding the same bytes as a data URI so they can be decoded without a
//!   second network round trip
//! - Selecting the canvas transform that redraws the bitmap upright
//!
//! # Architecture
//!
//! Everything here is pure and synchronous. The scanner is a best-effort single
//! pass over big-endian 16-bit words, not a full EXIF parser: malformed or
//! truncated input simply yields [`Orientation::Normal`].
//!
//! # Examples
//!
//! ```ignore
//! use progressive_core::orientation::{read_orientation, DrawPlan};
//!
//! let source = read_orientation(&bytes, Some("image/jpeg"));
//! let plan = DrawPlan::new(source.orientation, Size::new(4000, 3000));
//! ```

mod reader;
mod transform;
mod types;

pub use reader::{read_orientation, scan_orientation};
pub use transform::{transform_for, transform_for_code, AffineTransform, DrawPlan};
pub use types::{OrientedSource, Orientation};

#[cfg(test)]
pub(crate) use reader::fixtures;
