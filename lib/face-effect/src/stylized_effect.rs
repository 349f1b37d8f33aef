use crate::blur_effect::gaussian_blur_rgb;
use crate::{Effect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;

/// Posterize effect configuration: quantizes each channel to 2^bits levels.
/// bits=8 is the identity.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct PosterizeConfig {
    #[derivative(Default(value = "8"))]
    bits: u8, // [1, 8]
}

impl PosterizeConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for PosterizeConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.bits >= 8 {
            return Ok(());
        }

        let bucket = (256u16 >> self.bits.max(1)) as u8;
        for pixel in image.pixels_mut() {
            for i in 0..3 {
                pixel[i] = pixel[i] / bucket * bucket;
            }
        }

        Ok(())
    }
}

/// Sharpen effect configuration: unsharp masking against a 9x9 Gaussian.
/// The original and blurred images are combined with weights (1 + amount,
/// -amount); amount=0 is the identity (short-circuited), negative amounts
/// blur further.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SharpenConfig {
    #[derivative(Default(value = "0.0"))]
    amount: f32, // [-1, 1]
}

impl SharpenConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SharpenConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.amount == 0.0 {
            return Ok(());
        }

        // Positive amounts subtract a wide blur (sigma 10); negative amounts
        // use the size-derived sigma.
        let sigma = if self.amount > 0.0 { 10.0 } else { 0.0 };
        let blurred = gaussian_blur_rgb(image, 9, sigma);

        for (pixel, blur_pixel) in image.pixels_mut().zip(blurred.pixels()) {
            for i in 0..3 {
                let val = pixel[i] as f32 * (1.0 + self.amount)
                    + blur_pixel[i] as f32 * -self.amount;
                pixel[i] = val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn gradient_image() -> RgbImage {
        let mut image = RgbImage::new(8, 8);
        for (x, y, pixel) in image.enumerate_pixels_mut() {
            *pixel = Rgb([(x * 30) as u8, (y * 30) as u8, 128]);
        }
        image
    }

    #[test]
    fn test_posterize_eight_bits_is_identity() {
        let original = gradient_image();
        let mut image = original.clone();
        PosterizeConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_posterize_is_idempotent() {
        let config = PosterizeConfig::new().with_bits(3);

        let mut once = gradient_image();
        config.apply(&mut once).unwrap();

        let mut twice = once.clone();
        config.apply(&mut twice).unwrap();

        assert_eq!(once, twice);
    }

    #[test]
    fn test_posterize_quantizes_to_buckets() {
        let mut image = gradient_image();
        PosterizeConfig::new().with_bits(2).apply(&mut image).unwrap();

        for pixel in image.pixels() {
            for i in 0..3 {
                assert_eq!(pixel[i] % 64, 0);
            }
        }
    }

    #[test]
    fn test_sharpen_zero_is_identity() {
        let original = gradient_image();
        let mut image = original.clone();
        SharpenConfig::new().apply(&mut image).unwrap();
        assert_eq!(image, original);
    }

    #[test]
    fn test_sharpen_widens_an_edge() {
        // Vertical step edge.
        let mut image = RgbImage::from_pixel(16, 16, Rgb([80, 80, 80]));
        for y in 0..16 {
            for x in 8..16 {
                image.put_pixel(x, y, Rgb([160, 160, 160]));
            }
        }

        SharpenConfig::new().with_amount(1.0).apply(&mut image).unwrap();

        // Overshoot on each side of the edge.
        assert!(image.get_pixel(7, 8)[0] < 80);
        assert!(image.get_pixel(8, 8)[0] > 160);
    }
}
