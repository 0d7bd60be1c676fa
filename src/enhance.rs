use crate::constants::{BRIGHTNESS_FACTOR, COLOR_FACTOR, CONTRAST_FACTOR, SHARPNESS_FACTOR};
use image::{DynamicImage, Rgb, RgbImage};

/// Factors for the four enhancement stages.
///
/// Each stage blends the previous stage's output with a degenerate image:
/// `out = degenerate + factor * (input - degenerate)`. A factor of `1.0`
/// leaves the stage a no-op.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enhancement {
    pub brightness: f32,
    pub color: f32,
    pub contrast: f32,
    pub sharpness: f32,
}

impl Default for Enhancement {
    fn default() -> Self {
        Self {
            brightness: BRIGHTNESS_FACTOR,
            color: COLOR_FACTOR,
            contrast: CONTRAST_FACTOR,
            sharpness: SHARPNESS_FACTOR,
        }
    }
}

impl Enhancement {
    /// Applies brightness, color, contrast and sharpness in that order.
    ///
    /// The result is always RGB8; alpha is discarded since the output
    /// encoding cannot carry it.
    pub fn apply(&self, img: &DynamicImage) -> DynamicImage {
        let rgb = img.to_rgb8();
        let rgb = adjust_brightness(&rgb, self.brightness);
        let rgb = adjust_color(&rgb, self.color);
        let rgb = adjust_contrast(&rgb, self.contrast);
        let rgb = adjust_sharpness(&rgb, self.sharpness);
        DynamicImage::ImageRgb8(rgb)
    }
}

/// Enhances an image with the standard factors.
pub fn enhance_image(img: &DynamicImage) -> DynamicImage {
    Enhancement::default().apply(img)
}

fn blend(degenerate: u8, value: u8, factor: f32) -> u8 {
    let out = degenerate as f32 + factor * (value as f32 - degenerate as f32);
    // clamp, then truncate toward zero
    out.clamp(0.0, 255.0) as u8
}

fn luma(pixel: &Rgb<u8>) -> u8 {
    let [r, g, b] = pixel.0;
    ((299 * r as u32 + 587 * g as u32 + 114 * b as u32 + 500) / 1000) as u8
}

pub fn adjust_brightness(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = blend(0, *channel, factor);
        }
    }
    out
}

pub fn adjust_color(img: &RgbImage, factor: f32) -> RgbImage {
    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        let grey = luma(pixel);
        for channel in pixel.0.iter_mut() {
            *channel = blend(grey, *channel, factor);
        }
    }
    out
}

pub fn adjust_contrast(img: &RgbImage, factor: f32) -> RgbImage {
    let pixel_count = img.width() as u64 * img.height() as u64;
    if pixel_count == 0 {
        return img.clone();
    }

    let total: u64 = img.pixels().map(|p| luma(p) as u64).sum();
    let mean = (total as f64 / pixel_count as f64 + 0.5) as u8;

    let mut out = img.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut() {
            *channel = blend(mean, *channel, factor);
        }
    }
    out
}

pub fn adjust_sharpness(img: &RgbImage, factor: f32) -> RgbImage {
    let (width, height) = img.dimensions();
    if width < 3 || height < 3 {
        return img.clone();
    }

    let mut out = img.clone();
    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let smoothed = smooth_at(img, x, y);
            let source = img.get_pixel(x, y);
            let target = out.get_pixel_mut(x, y);
            for c in 0..3 {
                target.0[c] = blend(smoothed[c], source.0[c], factor);
            }
        }
    }
    out
}

// 3x3 kernel [1 1 1; 1 5 1; 1 1 1] / 13
fn smooth_at(img: &RgbImage, x: u32, y: u32) -> [u8; 3] {
    let mut sums = [0u32; 3];
    for dy in 0..3 {
        for dx in 0..3 {
            let weight = if dx == 1 && dy == 1 { 5 } else { 1 };
            let pixel = img.get_pixel(x + dx - 1, y + dy - 1);
            for c in 0..3 {
                sums[c] += weight * pixel.0[c] as u32;
            }
        }
    }
    sums.map(|s| ((s + 6) / 13) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn two_tone(width: u32, height: u32, dark: u8, light: u8) -> RgbImage {
        RgbImage::from_fn(width, height, |x, _| {
            if x < width / 2 {
                Rgb([dark, dark, dark])
            } else {
                Rgb([light, light, light])
            }
        })
    }

    #[test]
    fn test_brightness_scales_and_clamps() {
        let img = RgbImage::from_pixel(2, 2, Rgb([100, 0, 250]));
        let out = adjust_brightness(&img, 1.2);
        assert_eq!(out.get_pixel(0, 0).0, [120, 0, 255]);
    }

    #[test]
    fn test_blend_truncates_fractions() {
        // 103 * 1.2 = 123.6
        let img = RgbImage::from_pixel(1, 1, Rgb([103, 1, 254]));
        let out = adjust_brightness(&img, 1.2);
        assert_eq!(out.get_pixel(0, 0).0, [123, 1, 255]);

        let darker = adjust_brightness(&img, 0.5);
        assert_eq!(darker.get_pixel(0, 0).0, [51, 0, 127]);
    }

    #[test]
    fn test_color_leaves_grey_untouched() {
        let img = RgbImage::from_pixel(3, 3, Rgb([90, 90, 90]));
        let out = adjust_color(&img, 1.3);
        assert_eq!(out, img);
    }

    #[test]
    fn test_color_pushes_away_from_grey() {
        let img = RgbImage::from_pixel(1, 1, Rgb([200, 100, 100]));
        let out = adjust_color(&img, 1.3);
        let [r, g, b] = out.get_pixel(0, 0).0;
        assert!(r > 200);
        assert!(g < 100);
        assert!(b < 100);
    }

    #[test]
    fn test_contrast_uniform_image_unchanged() {
        let img = RgbImage::from_pixel(4, 4, Rgb([77, 77, 77]));
        assert_eq!(adjust_contrast(&img, 1.2), img);
    }

    #[test]
    fn test_contrast_spreads_two_tones() {
        let img = two_tone(8, 8, 100, 150);
        let out = adjust_contrast(&img, 1.2);
        // mean is 125: 125 -+ 1.2 * 25, the dark side lands just under 95
        assert_eq!(out.get_pixel(0, 0).0, [94, 94, 94]);
        assert_eq!(out.get_pixel(7, 0).0, [155, 155, 155]);
    }

    #[test]
    fn test_sharpness_keeps_borders_and_flat_regions() {
        let img = two_tone(16, 16, 40, 220);
        let out = adjust_sharpness(&img, 1.1);
        for x in 0..16 {
            assert_eq!(out.get_pixel(x, 0), img.get_pixel(x, 0));
            assert_eq!(out.get_pixel(x, 15), img.get_pixel(x, 15));
        }
        assert_eq!(out.get_pixel(3, 5), img.get_pixel(3, 5));
        assert!(out.get_pixel(7, 5).0[0] < 40);
        assert!(out.get_pixel(8, 5).0[0] > 220);
    }

    #[test]
    fn test_sharpness_tiny_image_is_noop() {
        let img = two_tone(2, 2, 10, 200);
        assert_eq!(adjust_sharpness(&img, 2.0), img);
    }

    #[test]
    fn test_enhance_preserves_dimensions() {
        let img = DynamicImage::new_rgba8(37, 11);
        let out = enhance_image(&img);
        assert_eq!(out.dimensions(), (37, 11));
        assert!(out.as_rgb8().is_some());
    }

    #[test]
    fn test_enhance_is_not_idempotent() {
        let img = DynamicImage::ImageRgb8(two_tone(32, 32, 40, 220));
        let once = enhance_image(&img);
        let twice = enhance_image(&once);
        assert_ne!(once, twice);
    }

    #[test]
    fn test_enhance_twice_differs_from_combined_factors() {
        let img = DynamicImage::ImageRgb8(two_tone(32, 32, 40, 220));
        let base = Enhancement::default();
        let combined = Enhancement {
            brightness: base.brightness * base.brightness,
            color: base.color * base.color,
            contrast: base.contrast * base.contrast,
            sharpness: base.sharpness * base.sharpness,
        };

        let sequential = base.apply(&base.apply(&img)).to_rgb8();
        let single = combined.apply(&img).to_rgb8();

        // intermediate clamping shifts the contrast mean between passes
        assert_ne!(sequential.get_pixel(0, 0), single.get_pixel(0, 0));
    }

    #[test]
    fn test_identity_factors_are_noop() {
        let img = DynamicImage::ImageRgb8(two_tone(10, 10, 30, 180));
        let identity = Enhancement {
            brightness: 1.0,
            color: 1.0,
            contrast: 1.0,
            sharpness: 1.0,
        };
        assert_eq!(identity.apply(&img), img);
    }
}
