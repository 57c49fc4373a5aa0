use crate::assets::decode::unpremultiply_rgba8_in_place;
use crate::foundation::error::{LayrError, LayrResult};
use crate::render::frame::FrameRGBA;

/// Encode a frame as a lossless RGBA PNG.
///
/// Premultiplied frames are converted to straight alpha first; fully transparent pixels
/// stay transparent black.
pub fn encode_png(frame: &FrameRGBA) -> LayrResult<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 {
        return Err(LayrError::encode("frame width/height must be non-zero"));
    }
    let expected = (frame.width as usize)
        .saturating_mul(frame.height as usize)
        .saturating_mul(4);
    if frame.data.len() != expected {
        return Err(LayrError::encode(format!(
            "frame data is {} bytes, expected {expected} for {}x{}",
            frame.data.len(),
            frame.width,
            frame.height
        )));
    }

    let mut straight = frame.data.clone();
    if frame.premultiplied {
        unpremultiply_rgba8_in_place(&mut straight);
    }
    let img = image::RgbaImage::from_raw(frame.width, frame.height, straight)
        .ok_or_else(|| LayrError::encode("frame buffer does not match its dimensions"))?;

    let mut out = std::io::Cursor::new(Vec::with_capacity(expected / 2));
    img.write_to(&mut out, image::ImageFormat::Png)
        .map_err(|e| LayrError::encode(format!("png encode failed: {e}")))?;
    Ok(out.into_inner())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
