use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, Rgb, RgbImage};
use studybuddy_core::types::ImagePayload;

use crate::error::CaptureError;

pub const DEFAULT_CAPTURE_QUALITY: u8 = 80;

/// Loads a photographed question from disk as a JPEG payload.
///
/// Any format the decoder understands is accepted. Transparent pixels are composited onto
/// white so that screenshots with alpha still read as paper.
pub fn load_still(path: &Path, quality: u8) -> Result<ImagePayload, CaptureError> {
    let bytes = std::fs::read(path).map_err(|e| CaptureError::from_io(path, e))?;
    if bytes.is_empty() {
        return Err(CaptureError::Unsupported(format!(
            "{} is empty",
            path.display()
        )));
    }

    let img = image::load_from_memory(&bytes).map_err(CaptureError::from_decode)?;
    log::debug!(
        "loaded still {} ({}x{})",
        path.display(),
        img.width(),
        img.height()
    );

    encode_jpeg(&flatten_on_white(&img), quality)
}

pub(crate) fn decode_payload(payload: &ImagePayload) -> Result<DynamicImage, CaptureError> {
    image::load_from_memory(payload.bytes()).map_err(CaptureError::from_decode)
}

pub(crate) fn flatten_on_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let alpha = u16::from(a);
        let blend = |c: u8| -> u8 {
            // Integer alpha blend against 255; stays within u8.
            ((u16::from(c) * alpha + 255 * (255 - alpha) + 127) / 255) as u8
        };
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

pub(crate) fn encode_jpeg(img: &RgbImage, quality: u8) -> Result<ImagePayload, CaptureError> {
    let mut buf = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100));
    encoder.encode_image(img).map_err(CaptureError::Encode)?;
    Ok(ImagePayload::jpeg(buf))
}
