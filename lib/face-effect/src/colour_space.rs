//! Colour-space conversions shared by the effect operators.
//!
//! Saturation/value/hue math is done on a float-promoted HSV plane so that
//! repeated adjustments do not accumulate integer rounding error. Hue is
//! circular (wrapped, never clamped); saturation and value are clamped into
//! their legal range before converting back to RGB.

use crate::{ImageEffectError, ImageEffectResult};
use image::{GrayImage, ImageBuffer, Rgb, RgbImage};

/// Float HSV plane: H in [0, 360) degrees, S in [0, 1], V in [0, 255].
pub type HsvImage = ImageBuffer<Rgb<f32>, Vec<f32>>;

/// Luminance grayscale: 0.299*R + 0.587*G + 0.114*B.
pub fn to_gray(image: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(image.width(), image.height());

    for (dst, pixel) in gray.pixels_mut().zip(image.pixels()) {
        let value =
            0.299 * pixel[0] as f32 + 0.587 * pixel[1] as f32 + 0.114 * pixel[2] as f32;
        dst[0] = value.round().clamp(0.0, 255.0) as u8;
    }

    gray
}

pub fn to_hsv(image: &RgbImage) -> ImageEffectResult<HsvImage> {
    if image.width() == 0 || image.height() == 0 {
        return Err(ImageEffectError::InvalidInput(
            "cannot convert a zero-area image to HSV".to_string(),
        ));
    }

    let mut hsv = HsvImage::new(image.width(), image.height());
    for (dst, pixel) in hsv.pixels_mut().zip(image.pixels()) {
        let (h, s, v) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        *dst = Rgb([h, s, v]);
    }

    Ok(hsv)
}

pub fn from_hsv(hsv: &HsvImage) -> RgbImage {
    let mut image = RgbImage::new(hsv.width(), hsv.height());
    for (dst, pixel) in image.pixels_mut().zip(hsv.pixels()) {
        let (r, g, b) = hsv_to_rgb(pixel[0], pixel[1], pixel[2]);
        *dst = Rgb([r, g, b]);
    }

    image
}

/// H in [0, 360) degrees, S in [0, 1], V in [0, 255].
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let (r, g, b) = (r as f32, g as f32, b as f32);
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let mut h = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * ((g - b) / delta)
    } else if max == g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };

    if h < 0.0 {
        h += 360.0;
    }

    let s = if max == 0.0 { 0.0 } else { delta / max };

    (h, s, max)
}

/// Inverse of [`rgb_to_hsv`]. Hue is wrapped modulo 360, S and V are clamped.
pub fn hsv_to_rgb(h: f32, s: f32, v: f32) -> (u8, u8, u8) {
    let h = h.rem_euclid(360.0);
    let s = s.clamp(0.0, 1.0);
    let v = v.clamp(0.0, 255.0);

    let c = v * s;
    let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
    let m = v - c;

    let (r, g, b) = if h < 60.0 {
        (c, x, 0.0)
    } else if h < 120.0 {
        (x, c, 0.0)
    } else if h < 180.0 {
        (0.0, c, x)
    } else if h < 240.0 {
        (0.0, x, c)
    } else if h < 300.0 {
        (x, 0.0, c)
    } else {
        (c, 0.0, x)
    };

    (
        (r + m).round().clamp(0.0, 255.0) as u8,
        (g + m).round().clamp(0.0, 255.0) as u8,
        (b + m).round().clamp(0.0, 255.0) as u8,
    )
}

/// Normalized 1-D Gaussian kernel. `sigma <= 0` derives the deviation from
/// the kernel size: 0.3 * ((size - 1) * 0.5 - 1) + 0.8.
pub fn gaussian_kernel(size: usize, sigma: f32) -> Vec<f32> {
    let size = size.max(1);
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8
    };

    let center = (size as f32 - 1.0) / 2.0;
    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();

    let sum: f32 = kernel.iter().sum();
    for v in kernel.iter_mut() {
        *v /= sum;
    }

    kernel
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hsv_round_trip() {
        let samples = [
            (0u8, 0u8, 0u8),
            (255, 255, 255),
            (255, 0, 0),
            (0, 255, 0),
            (0, 0, 255),
            (128, 128, 128),
            (12, 200, 99),
            (240, 13, 77),
        ];

        for (r, g, b) in samples {
            let (h, s, v) = rgb_to_hsv(r, g, b);
            let (r2, g2, b2) = hsv_to_rgb(h, s, v);
            assert!(
                (r as i32 - r2 as i32).abs() <= 1
                    && (g as i32 - g2 as i32).abs() <= 1
                    && (b as i32 - b2 as i32).abs() <= 1,
                "round trip drifted: ({r},{g},{b}) -> ({r2},{g2},{b2})"
            );
        }
    }

    #[test]
    fn test_hue_is_wrapped_not_clamped() {
        let (h, s, v) = rgb_to_hsv(200, 40, 40);
        let (r1, g1, b1) = hsv_to_rgb(h + 360.0, s, v);
        let (r2, g2, b2) = hsv_to_rgb(h, s, v);
        assert_eq!((r1, g1, b1), (r2, g2, b2));

        let (r3, g3, b3) = hsv_to_rgb(h - 360.0, s, v);
        assert_eq!((r3, g3, b3), (r2, g2, b2));
    }

    #[test]
    fn test_to_gray_luminance() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, Rgb([255, 0, 0]));
        image.put_pixel(1, 0, Rgb([100, 100, 100]));

        let gray = to_gray(&image);
        assert_eq!(gray.get_pixel(0, 0)[0], 76); // 0.299 * 255
        assert_eq!(gray.get_pixel(1, 0)[0], 100);
    }

    #[test]
    fn test_to_hsv_rejects_zero_area() {
        let image = RgbImage::new(0, 0);
        assert!(to_hsv(&image).is_err());
    }

    #[test]
    fn test_gaussian_kernel_normalized_and_symmetric() {
        let kernel = gaussian_kernel(9, 2.0);
        let sum: f32 = kernel.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);

        for i in 0..kernel.len() / 2 {
            assert!((kernel[i] - kernel[kernel.len() - 1 - i]).abs() < 1e-6);
        }

        // Auto sigma path
        let kernel = gaussian_kernel(5, 0.0);
        assert!((kernel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(kernel[2] > kernel[0]);
    }
}
