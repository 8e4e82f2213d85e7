//! Single-pass EXIF orientation scanner and data URI encoding.

use base64::{engine::general_purpose, Engine as _};

use super::{Orientation, OrientedSource};

/// JPEG start-of-image marker.
const SOI_MARKER: u16 = 0xFFD8;
/// APP1 marker, which carries the EXIF segment.
const APP1_MARKER: u16 = 0xFFE1;
/// EXIF orientation tag.
const ORIENTATION_TAG: u16 = 0x0112;
/// Distance from the end of the tag word to the inline SHORT value
/// (type: 2 bytes, count: 4 bytes).
const ORIENTATION_VALUE_OFFSET: usize = 6;

const FALLBACK_MIME: &str = "application/octet-stream";

/// Read the orientation of a fetched image and re-encode it as a data URI.
///
/// # Arguments
///
/// * `bytes` - The full response body
/// * `content_type` - The response's content type, if the host knows it
///
/// # Returns
///
/// An [`OrientedSource`]. The data URI always covers the full buffer, whatever
/// the scan found. This function never fails: unreadable input is `Normal`.
pub fn read_orientation(bytes: &[u8], content_type: Option<&str>) -> OrientedSource {
    let mime_type = resolve_mime(bytes, content_type);
    let data_uri = format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    );

    OrientedSource {
        data_uri,
        mime_type,
        orientation: scan_orientation(bytes),
    }
}

/// Scan a byte buffer for the EXIF orientation tag.
///
/// Returns immediately with `Normal` unless the buffer opens with the JPEG SOI
/// marker. Otherwise walks big-endian 16-bit words from offset 2: an APP1
/// marker narrows the window to the end of that segment, and the first
/// orientation tag inside the window ends the scan.
///
/// Only big-endian ("MM") EXIF blocks are understood. Reads past the end of
/// the buffer are treated as "tag not found".
pub fn scan_orientation(bytes: &[u8]) -> Orientation {
    if read_u16(bytes, 0) != Some(SOI_MARKER) {
        return Orientation::Normal;
    }

    let mut idx = 2;
    let mut end = bytes.len();

    while idx + 2 <= end {
        let Some(word) = read_u16(bytes, idx) else {
            break;
        };
        idx += 2;

        match word {
            APP1_MARKER => {
                let Some(segment_len) = read_u16(bytes, idx) else {
                    break;
                };
                // The declared length counts the length field itself.
                end = end.min(idx + usize::from(segment_len));
                idx += 2;
            }
            ORIENTATION_TAG => {
                return read_u16(bytes, idx + ORIENTATION_VALUE_OFFSET)
                    .map(Orientation::from)
                    .unwrap_or_default();
            }
            _ => {}
        }
    }

    Orientation::Normal
}

fn read_u16(bytes: &[u8], at: usize) -> Option<u16> {
    let pair = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_be_bytes([pair[0], pair[1]]))
}

fn resolve_mime(bytes: &[u8], content_type: Option<&str>) -> String {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .map(str::to_owned)
        .or_else(|| {
            image::guess_format(bytes)
                .ok()
                .map(|format| format.to_mime_type().to_owned())
        })
        .unwrap_or_else(|| FALLBACK_MIME.to_owned())
}



// ============================================================================
// Cross-check against a real EXIF encoder
// ============================================================================


// ============================================================================
// Property-Based Tests
// ============================================================================
