//! Raster decode delegate.
//!
//! Image decoding proper is not this crate's business; the buffer is
//! handed to the `image` crate and the result converted to tightly packed
//! RGBA8. A failure to sniff or decode maps to `MalformedHeader`.

use log::debug;

use crate::envelope::RasterImage;
use crate::error::DecodeError;

/// Decode a raster buffer into RGBA8 pixels.
pub fn decode(bytes: &[u8]) -> Result<RasterImage, DecodeError> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| DecodeError::malformed(format!("image decode error: {e}")))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    debug!("raster decode: {width}x{height}");
    Ok(RasterImage {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}
