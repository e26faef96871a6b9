use image::{Rgb, RgbImage};
use studybuddy_core::types::ImagePayload;

use crate::error::CaptureError;
use crate::still::{decode_payload, encode_jpeg, flatten_on_white};

pub const DEFAULT_EDIT_QUALITY: u8 = 85;

const MIN_PERCENT: u16 = 50;
const MAX_PERCENT: u16 = 200;

/// User-chosen tweaks applied on the editing screen before a photo is sent.
///
/// Brightness and contrast are percentages where 100 leaves the image unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageAdjustments {
    brightness: u16,
    contrast: u16,
    pub grayscale: bool,
}

impl Default for ImageAdjustments {
    fn default() -> Self {
        Self {
            brightness: 100,
            contrast: 100,
            grayscale: false,
        }
    }
}

impl ImageAdjustments {
    pub fn new(brightness: u16, contrast: u16, grayscale: bool) -> Self {
        let mut adj = Self::default();
        adj.set_brightness(brightness);
        adj.set_contrast(contrast);
        adj.grayscale = grayscale;
        adj
    }

    pub fn brightness(&self) -> u16 {
        self.brightness
    }

    pub fn contrast(&self) -> u16 {
        self.contrast
    }

    pub fn set_brightness(&mut self, percent: u16) {
        self.brightness = percent.clamp(MIN_PERCENT, MAX_PERCENT);
    }

    pub fn set_contrast(&mut self, percent: u16) {
        self.contrast = percent.clamp(MIN_PERCENT, MAX_PERCENT);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::default()
    }

    /// Renders the adjusted image and re-encodes it as JPEG.
    ///
    /// Filters run in the order brightness, contrast, grayscale, each clamped to the valid
    /// channel range before the next one.
    pub fn apply(&self, image: &ImagePayload, quality: u8) -> Result<ImagePayload, CaptureError> {
        let decoded = decode_payload(image)?;
        let mut rgb = flatten_on_white(&decoded);
        self.apply_in_place(&mut rgb);
        encode_jpeg(&rgb, quality)
    }

    fn apply_in_place(&self, rgb: &mut RgbImage) {
        let b = f32::from(self.brightness) / 100.0;
        let k = f32::from(self.contrast) / 100.0;

        for px in rgb.pixels_mut() {
            let mut c = px.0.map(|v| f32::from(v) / 255.0);
            for v in &mut c {
                *v = (*v * b).clamp(0.0, 1.0);
                *v = ((*v - 0.5) * k + 0.5).clamp(0.0, 1.0);
            }
            if self.grayscale {
                let luma = 0.2126 * c[0] + 0.7152 * c[1] + 0.0722 * c[2];
                c = [luma; 3];
            }
            *px = Rgb(c.map(|v| (v * 255.0).round() as u8));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pixel(r: u8, g: u8, b: u8) -> RgbImage {
        RgbImage::from_pixel(1, 1, Rgb([r, g, b]))
    }

    #[test]
    fn values_are_clamped() {
        let adj = ImageAdjustments::new(10, 500, false);
        assert_eq!(adj.brightness(), 50);
        assert_eq!(adj.contrast(), 200);
    }

    #[test]
    fn reset_restores_identity() {
        let mut adj = ImageAdjustments::new(150, 80, true);
        assert!(!adj.is_identity());
        adj.reset();
        assert!(adj.is_identity());
        assert_eq!(adj, ImageAdjustments::default());
    }

    #[test]
    fn identity_leaves_pixels_alone() {
        let mut img = one_pixel(12, 130, 250);
        ImageAdjustments::default().apply_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0), &Rgb([12, 130, 250]));
    }

    #[test]
    fn brightness_scales_then_saturates() {
        let mut img = one_pixel(100, 200, 0);
        ImageAdjustments::new(150, 100, false).apply_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0), &Rgb([150, 255, 0]));
    }

    #[test]
    fn contrast_pivots_on_mid_grey() {
        let mut img = one_pixel(60, 128, 200);
        ImageAdjustments::new(100, 200, false).apply_in_place(&mut img);
        let px = img.get_pixel(0, 0);
        assert_eq!(px[0], 0);
        assert!((127..=129).contains(&px[1]));
        assert_eq!(px[2], 255);
    }

    #[test]
    fn grayscale_uses_luminance_weights() {
        let mut img = one_pixel(255, 0, 0);
        ImageAdjustments::new(100, 100, true).apply_in_place(&mut img);
        assert_eq!(img.get_pixel(0, 0), &Rgb([54, 54, 54]));
    }

    #[test]
    fn apply_round_trips_through_jpeg() {
        let src = encode_jpeg(&RgbImage::from_pixel(4, 4, Rgb([90, 90, 90])), 90).unwrap();
        let out = ImageAdjustments::new(120, 110, true)
            .apply(&src, DEFAULT_EDIT_QUALITY)
            .unwrap();
        assert_eq!(&out.bytes()[..2], &[0xFF, 0xD8]);
        assert!(decode_payload(&out).is_ok());
    }

    #[test]
    fn apply_rejects_non_image_payload() {
        let junk = ImagePayload::jpeg(b"nope".to_vec());
        assert!(ImageAdjustments::default().apply(&junk, 85).is_err());
    }
}
