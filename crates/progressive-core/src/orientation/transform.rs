//! Canvas transforms that redraw a bitmap in its upright orientation.
//!
//! # Coordinate System
//!
//! Transforms use the 2D canvas convention `transform(a, b, c, d, e, f)`:
//!
//! ```text
//! x' = a*x + c*y + e
//! y' = b*x + d*y + f
//! ```
//!
//! `W` and `H` are the width and height of the source bitmap. Origin is the
//! top-left corner.

use serde::{Deserialize, Serialize};

use super::Orientation;
use crate::Size;

/// A 6-parameter 2D affine matrix, in canvas argument order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl AffineTransform {
    pub const fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// Map a source point into canvas space.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.e,
            self.b * x + self.d * y + self.f,
        )
    }

    /// Arguments in the order `CanvasRenderingContext2D.transform` expects.
    pub fn to_array(&self) -> [f64; 6] {
        [self.a, self.b, self.c, self.d, self.e, self.f]
    }
}

/// Select the transform that renders a bitmap of `size` upright.
///
/// Returns `None` for [`Orientation::Normal`]: no transform call is made.
pub fn transform_for(orientation: Orientation, size: Size) -> Option<AffineTransform> {
    let w = f64::from(size.width);
    let h = f64::from(size.height);

    let transform = match orientation {
        Orientation::Normal => return None,
        Orientation::FlipHorizontal => AffineTransform::new(-1.0, 0.0, 0.0, 1.0, w, 0.0),
        Orientation::Rotate180 => AffineTransform::new(-1.0, 0.0, 0.0, -1.0, w, h),
        Orientation::FlipVertical => AffineTransform::new(1.0, 0.0, 0.0, -1.0, 0.0, h),
        Orientation::Transpose => AffineTransform::new(0.0, 1.0, 1.0, 0.0, 0.0, 0.0),
        Orientation::Rotate90CW => AffineTransform::new(0.0, 1.0, -1.0, 0.0, h, 0.0),
        Orientation::Transverse => AffineTransform::new(0.0, -1.0, -1.0, 0.0, h, w),
        Orientation::Rotate270CW => AffineTransform::new(0.0, -1.0, 1.0, 0.0, 0.0, w),
    };
    Some(transform)
}

/// Like [`transform_for`], from a raw EXIF code. Codes outside 1-8 are identity.
pub fn transform_for_code(code: u16, size: Size) -> Option<AffineTransform> {
    transform_for(Orientation::from(code), size)
}

/// Everything the drawing surface needs for one redraw.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawPlan {
    /// Canvas size that fits the upright bitmap.
    pub canvas: Size,
    /// Transform to apply before drawing at (0, 0); `None` for identity.
    pub transform: Option<AffineTransform>,
}

impl DrawPlan {
    pub fn new(orientation: Orientation, source: Size) -> Self {
        let canvas = if orientation.swaps_dimensions() {
            Size::new(source.height, source.width)
        } else {
            source
        };

        Self {
            canvas,
            transform: transform_for(orientation, source),
        }
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
