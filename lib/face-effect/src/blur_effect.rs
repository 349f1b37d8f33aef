use crate::colour_space::gaussian_kernel;
use crate::{Effect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;

/// Separable Gaussian convolution with replicated borders. `sigma <= 0`
/// derives the deviation from the kernel size.
pub(crate) fn gaussian_blur_rgb(image: &RgbImage, ksize: usize, sigma: f32) -> RgbImage {
    let (width, height) = image.dimensions();
    let kernel = gaussian_kernel(ksize, sigma);
    let radius = (kernel.len() / 2) as i32;

    // Horizontal pass
    let mut horizontal = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let nx = (x as i32 + k as i32 - radius).clamp(0, width as i32 - 1) as u32;
                let pixel = image.get_pixel(nx, y);
                for i in 0..3 {
                    sum[i] += pixel[i] as f32 * weight;
                }
            }

            let pixel = horizontal.get_pixel_mut(x, y);
            for i in 0..3 {
                pixel[i] = sum[i].round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    // Vertical pass
    let mut result = RgbImage::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let mut sum = [0.0f32; 3];
            for (k, weight) in kernel.iter().enumerate() {
                let ny = (y as i32 + k as i32 - radius).clamp(0, height as i32 - 1) as u32;
                let pixel = horizontal.get_pixel(x, ny);
                for i in 0..3 {
                    sum[i] += pixel[i] as f32 * weight;
                }
            }

            let pixel = result.get_pixel_mut(x, y);
            for i in 0..3 {
                pixel[i] = sum[i].round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    result
}

/// Gaussian blur configuration. The kernel size is the blur level forced odd
/// (incremented if even); level <= 0 is the identity.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GaussianBlurConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 100]
}

impl GaussianBlurConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GaussianBlurConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let mut ksize = (self.level as usize).max(1);
        if ksize % 2 == 0 {
            ksize += 1;
        }

        *image = gaussian_blur_rgb(image, ksize, 0.0);
        Ok(())
    }
}

/// Skin smoothing configuration: edge-preserving bilateral filter with a
/// 15x15 window; both sigmas scale with the strength. strength <= 0 is the
/// identity.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SkinSmoothConfig {
    #[derivative(Default(value = "0.0"))]
    strength: f32, // [0, 1]
}

impl SkinSmoothConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SkinSmoothConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.strength <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let radius = 7i32; // d = 15
        let sigma_color = 75.0 * self.strength;
        let sigma_space = 75.0 * self.strength;

        let spatial: Vec<f32> = (-radius..=radius)
            .flat_map(|dy| {
                (-radius..=radius).map(move |dx| {
                    let d2 = (dx * dx + dy * dy) as f32;
                    (-d2 / (2.0 * sigma_space * sigma_space)).exp()
                })
            })
            .collect();

        let mut result = RgbImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let center = *image.get_pixel(x, y);
                let mut sum = [0.0f32; 3];
                let mut total_weight = 0.0f32;

                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        let nx = (x as i32 + dx).clamp(0, width as i32 - 1) as u32;
                        let ny = (y as i32 + dy).clamp(0, height as i32 - 1) as u32;
                        let neighbor = image.get_pixel(nx, ny);

                        // Color distance is the L1 norm over channels.
                        let diff = (neighbor[0] as f32 - center[0] as f32).abs()
                            + (neighbor[1] as f32 - center[1] as f32).abs()
                            + (neighbor[2] as f32 - center[2] as f32).abs();
                        let color_weight =
                            (-(diff * diff) / (2.0 * sigma_color * sigma_color)).exp();

                        let si = ((dy + radius) * (2 * radius + 1) + dx + radius) as usize;
                        let weight = spatial[si] * color_weight;

                        total_weight += weight;
                        for i in 0..3 {
                            sum[i] += neighbor[i] as f32 * weight;
                        }
                    }
                }

                let pixel = result.get_pixel_mut(x, y);
                for i in 0..3 {
                    pixel[i] = (sum[i] / total_weight).round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        *image = result;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn noisy_image() -> RgbImage {
        let mut image = RgbImage::from_pixel(16, 16, Rgb([120, 120, 120]));
        // Mild salt noise on a flat background.
        for i in 0..8 {
            image.put_pixel(i * 2 + 1, i, Rgb([140, 140, 140]));
        }
        image
    }

    #[test]
    fn test_blur_level_zero_is_identity() {
        let original = noisy_image();
        let mut image = original.clone();
        GaussianBlurConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_blur_preserves_uniform_image() {
        let original = RgbImage::from_pixel(8, 8, Rgb([77, 140, 33]));
        let mut image = original.clone();
        GaussianBlurConfig::new()
            .with_level(6.0)
            .apply(&mut image)
            .unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_blur_flattens_a_spike() {
        let mut image = RgbImage::from_pixel(9, 9, Rgb([0, 0, 0]));
        image.put_pixel(4, 4, Rgb([255, 255, 255]));

        GaussianBlurConfig::new()
            .with_level(5.0)
            .apply(&mut image)
            .unwrap();

        assert!(image.get_pixel(4, 4)[0] < 255);
        assert!(image.get_pixel(3, 4)[0] > 0);
    }

    #[test]
    fn test_skin_smooth_zero_is_identity() {
        let original = noisy_image();
        let mut image = original.clone();
        SkinSmoothConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_skin_smooth_reduces_noise() {
        let original = noisy_image();
        let mut image = original.clone();
        SkinSmoothConfig::new()
            .with_strength(0.8)
            .apply(&mut image)
            .unwrap();

        let spread = |image: &RgbImage| -> u32 {
            let max = image.pixels().map(|p| p[0] as u32).max().unwrap();
            let min = image.pixels().map(|p| p[0] as u32).min().unwrap();
            max - min
        };
        assert!(spread(&image) < spread(&original));
    }
}
