use crate::colour_space::gaussian_kernel;
use crate::{Effect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;

/// Overlay configuration: linear blend of a solid color plane over the image.
/// alpha=0 is the identity, alpha=1 replaces the image with the color.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct OverlayConfig {
    #[derivative(Default(value = "0.0"))]
    alpha: f32, // [0, 1]

    #[derivative(Default(value = "[0, 0, 0]"))]
    color: [u8; 3],
}

impl OverlayConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for OverlayConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.alpha <= 0.0 {
            return Ok(());
        }

        for pixel in image.pixels_mut() {
            for i in 0..3 {
                let val = pixel[i] as f32 * (1.0 - self.alpha)
                    + self.color[i] as f32 * self.alpha;
                pixel[i] = val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(())
    }
}

/// Vignette configuration: darkens towards the borders using the outer
/// product of two 1-D Gaussian falloff kernels, normalized so the center
/// weight is 1. strength <= 0 is the identity.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct VignetteConfig {
    #[derivative(Default(value = "0.0"))]
    strength: f32, // [0, 1]
}

impl VignetteConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for VignetteConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.strength <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let kernel_x = gaussian_kernel(width as usize, width as f32 / (self.strength * 2.0));
        let kernel_y = gaussian_kernel(height as usize, height as f32 / (self.strength * 2.0));

        let max = kernel_x.iter().fold(0.0f32, |a, &b| a.max(b))
            * kernel_y.iter().fold(0.0f32, |a, &b| a.max(b));

        for (y, row) in image.rows_mut().enumerate() {
            for (x, pixel) in row.enumerate() {
                let weight = kernel_y[y] * kernel_x[x] / max;
                for i in 0..3 {
                    pixel[i] = (pixel[i] as f32 * weight).clamp(0.0, 255.0) as u8;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_overlay_zero_alpha_is_identity() {
        let original = RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]));
        let mut image = original.clone();
        OverlayConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_overlay_full_alpha_paints_the_color() {
        let mut image = RgbImage::from_pixel(4, 4, Rgb([10, 200, 30]));
        OverlayConfig::new()
            .with_alpha(1.0)
            .with_color([255, 0, 128])
            .apply(&mut image)
            .unwrap();

        for pixel in image.pixels() {
            assert_eq!(*pixel, Rgb([255, 0, 128]));
        }
    }

    #[test]
    fn test_overlay_half_alpha_darkens_with_black() {
        let mut image = RgbImage::from_pixel(2, 2, Rgb([100, 100, 100]));
        OverlayConfig::new().with_alpha(0.5).apply(&mut image).unwrap();
        assert_eq!(*image.get_pixel(0, 0), Rgb([50, 50, 50]));
    }

    #[test]
    fn test_vignette_zero_strength_is_identity() {
        let original = RgbImage::from_pixel(8, 8, Rgb([200, 200, 200]));
        let mut image = original.clone();
        VignetteConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_vignette_keeps_center_attenuates_corners() {
        let mut image = RgbImage::from_pixel(101, 101, Rgb([200, 200, 200]));
        VignetteConfig::new()
            .with_strength(1.0)
            .apply(&mut image)
            .unwrap();

        let center = image.get_pixel(50, 50)[0];
        let corner = image.get_pixel(0, 0)[0];
        assert!(center >= 199, "center attenuated: {center}");
        assert!(corner < center, "corner not attenuated: {corner}");
    }
}
