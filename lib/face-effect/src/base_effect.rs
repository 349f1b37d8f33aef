use crate::colour_space::{from_hsv, to_gray, to_hsv};
use crate::{Effect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::RgbImage;

/// Grayscale blend configuration: linear interpolation between the original
/// image and its grayscale conversion. level=0 is the identity, level=1 is
/// fully desaturated.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct GrayscaleBlendConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 1]
}

impl GrayscaleBlendConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for GrayscaleBlendConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let gray = to_gray(image);
        for (pixel, gray_pixel) in image.pixels_mut().zip(gray.pixels()) {
            let gray_val = gray_pixel[0] as f32;
            for i in 0..3 {
                let val = pixel[i] as f32;
                let new_val = val * (1.0 - self.level) + gray_val * self.level;
                pixel[i] = new_val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(())
    }
}

/// Contrast adjustment configuration: uniform per-channel multiplicative
/// scale with no offset. factor=1 is the identity.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct ContrastConfig {
    #[derivative(Default(value = "1.0"))]
    factor: f32, // [0, 3]
}

impl ContrastConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for ContrastConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        for pixel in image.pixels_mut() {
            for i in 0..3 {
                let new_val = pixel[i] as f32 * self.factor;
                pixel[i] = new_val.round().clamp(0.0, 255.0) as u8;
            }
        }

        Ok(())
    }
}

/// Brightness adjustment configuration. The value channel is scaled by
/// (1 + factor) in HSV space; negative factors darken.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct BrightnessConfig {
    #[derivative(Default(value = "0.0"))]
    factor: f32, // [-1, 1]
}

impl BrightnessConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for BrightnessConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.factor == 0.0 {
            return Ok(());
        }

        let mut hsv = to_hsv(image)?;
        for pixel in hsv.pixels_mut() {
            pixel[2] = (pixel[2] * (1.0 + self.factor)).clamp(0.0, 255.0);
        }

        *image = from_hsv(&hsv);
        Ok(())
    }
}

/// Saturation adjustment configuration. The saturation channel is scaled by
/// (1 + factor) in HSV space; negative factors desaturate.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct SaturationConfig {
    #[derivative(Default(value = "0.0"))]
    factor: f32, // [-1, 1]
}

impl SaturationConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for SaturationConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.factor == 0.0 {
            return Ok(());
        }

        let mut hsv = to_hsv(image)?;
        for pixel in hsv.pixels_mut() {
            pixel[1] = (pixel[1] * (1.0 + self.factor)).clamp(0.0, 1.0);
        }

        *image = from_hsv(&hsv);
        Ok(())
    }
}

/// Hue rotation configuration. The hue channel is shifted by a signed offset
/// and wrapped modulo 360 degrees, never clamped.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct HueRotateConfig {
    #[derivative(Default(value = "0.0"))]
    degrees: f32, // [-180, 180]
}

impl HueRotateConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Effect for HueRotateConfig {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        if self.degrees == 0.0 {
            return Ok(());
        }

        let mut hsv = to_hsv(image)?;
        for pixel in hsv.pixels_mut() {
            pixel[0] = (pixel[0] + self.degrees).rem_euclid(360.0);
        }

        *image = from_hsv(&hsv);
        Ok(())
    }
}
