//! Core types for orientation handling.

use serde::{Deserialize, Serialize};

/// Value of EXIF tag 0x0112: how the stored pixels must be turned to appear
/// upright. Codes outside 1-8 read as `Normal`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Orientation {
    /// Already upright.
    #[default]
    Normal = 1,
    /// Mirrored left to right.
    FlipHorizontal = 2,
    /// Upside down.
    Rotate180 = 3,
    /// Mirrored top to bottom.
    FlipVertical = 4,
    /// Mirrored across the main diagonal.
    Transpose = 5,
    /// Needs a quarter turn clockwise.
    Rotate90CW = 6,
    /// Mirrored across the anti-diagonal.
    Transverse = 7,
    /// Needs a quarter turn counter-clockwise.
    Rotate270CW = 8,
}

impl Orientation {
    /// Tag value, 1-8.
    #[inline]
    pub fn code(self) -> u16 {
        self as u16
    }

    /// Codes 5-8: the upright bitmap is as wide as the stored one is tall.
    #[inline]
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90CW
                | Orientation::Transverse
                | Orientation::Rotate270CW
        )
    }
}

impl From<u16> for Orientation {
    fn from(value: u16) -> Self {
        match value {
            1 => Orientation::Normal,
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Fetched image bytes re-expressed as a data URI, with their orientation.
///
/// Produced once per fetched buffer; the orientation is never recomputed for
/// the same bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrientedSource {
    /// `data:<mime>;base64,<payload>` for the full input buffer.
    pub data_uri: String,
    /// MIME type used as the data URI prefix.
    pub mime_type: String,
    /// Orientation found in the EXIF segment, or `Normal`.
    pub orientation: Orientation,
}
