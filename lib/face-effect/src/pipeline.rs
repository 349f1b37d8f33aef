//! Pipeline orchestration: facial effects per detected face, then global
//! effects, in a fixed order.
//!
//! The order is a contract: several operators (contrast, overlay,
//! brightness, ...) do not commute, so it is expressed as data, an ordered
//! list of effect descriptors consumed by one loop. The alpha plane is
//! split off before any color work and reattached at the end, after one
//! morphological-close denoising pass.

use crate::base_effect::{
    BrightnessConfig, ContrastConfig, GrayscaleBlendConfig, HueRotateConfig, SaturationConfig,
};
use crate::blur_effect::{GaussianBlurConfig, SkinSmoothConfig};
use crate::face_effect::{
    EyeBrightenConfig, EyelashEnhanceConfig, FaceOutlineConfig, GlassesConfig, LipstickConfig,
    TeethWhitenConfig,
};
use crate::filter_effect::{OverlayConfig, VignetteConfig};
use crate::landmarks::{self, LandmarkSet, MESH_LANDMARK_COUNT};
use crate::stylized_effect::{PosterizeConfig, SharpenConfig};
use crate::{Effect, FaceEffect, FacialEffect, ImageEffect, ImageEffectError, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, Rgba, RgbaImage, RgbImage};
use imageproc::morphology::{grayscale_close, Mask};
use std::path::PathBuf;

/// All effect parameters for one pipeline run. Defaults are neutral: a
/// default config is the identity transform. Out-of-range values are
/// reported by [`EffectConfig::validate`]; operators never clamp their
/// parameters silently.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EffectConfig {
    #[derivative(Default(value = "0.0"))]
    black_white_level: f32, // [0, 1]

    #[derivative(Default(value = "8"))]
    posterize_bits: u8, // [1, 8]

    #[derivative(Default(value = "1.0"))]
    contrast_factor: f32, // [0, 3]

    #[derivative(Default(value = "0.0"))]
    overlay_alpha: f32, // [0, 1]

    #[derivative(Default(value = "[0, 0, 0]"))]
    overlay_color: [u8; 3],

    #[derivative(Default(value = "0.0"))]
    brightness: f32, // [-1, 1]

    #[derivative(Default(value = "0.0"))]
    saturation: f32, // [-1, 1]

    #[derivative(Default(value = "0.0"))]
    sharpness: f32, // [-1, 1]

    #[derivative(Default(value = "0.0"))]
    hue: f32, // [-180, 180]

    #[derivative(Default(value = "0.0"))]
    blur: f32, // [0, 100]

    #[derivative(Default(value = "0.0"))]
    vignette: f32, // [0, 1]

    #[derivative(Default(value = "0.0"))]
    skin_smooth: f32, // [0, 1]

    #[derivative(Default(value = "false"))]
    face_enhance: bool,

    #[derivative(Default(value = "0.0"))]
    eye_brighten: f32, // [0, 1]

    #[derivative(Default(value = "0.0"))]
    teeth_whiten: f32, // [0, 1]

    #[derivative(Default(value = "0.0"))]
    lipstick: f32, // [0, 1]

    #[derivative(Default(value = "0.0"))]
    eyelash_enhance: f32, // [0, 1]

    #[derivative(Default(value = "None"))]
    glasses_asset: Option<PathBuf>,

    #[derivative(Default(value = "false"))]
    face_outline: bool,
}

impl EffectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> ImageEffectResult<()> {
        let unit_ranges = [
            ("blackWhiteLevel", self.black_white_level),
            ("overlayAlpha", self.overlay_alpha),
            ("vignette", self.vignette),
            ("skinSmooth", self.skin_smooth),
            ("eyeBrighten", self.eye_brighten),
            ("teethWhiten", self.teeth_whiten),
            ("lipstick", self.lipstick),
            ("eyelashEnhance", self.eyelash_enhance),
        ];
        for (name, value) in unit_ranges {
            if !(0.0..=1.0).contains(&value) {
                return Err(ImageEffectError::InvalidParameter(format!(
                    "{name} must be in [0, 1], got {value}"
                )));
            }
        }

        let signed_unit_ranges = [
            ("brightness", self.brightness),
            ("saturation", self.saturation),
            ("sharpness", self.sharpness),
        ];
        for (name, value) in signed_unit_ranges {
            if !(-1.0..=1.0).contains(&value) {
                return Err(ImageEffectError::InvalidParameter(format!(
                    "{name} must be in [-1, 1], got {value}"
                )));
            }
        }

        if !(1..=8).contains(&self.posterize_bits) {
            return Err(ImageEffectError::InvalidParameter(format!(
                "posterizeBits must be in [1, 8], got {}",
                self.posterize_bits
            )));
        }
        if !(0.0..=3.0).contains(&self.contrast_factor) {
            return Err(ImageEffectError::InvalidParameter(format!(
                "contrastFactor must be in [0, 3], got {}",
                self.contrast_factor
            )));
        }
        if !(-180.0..=180.0).contains(&self.hue) {
            return Err(ImageEffectError::InvalidParameter(format!(
                "hue must be in [-180, 180], got {}",
                self.hue
            )));
        }
        if !(0.0..=100.0).contains(&self.blur) {
            return Err(ImageEffectError::InvalidParameter(format!(
                "blur must be in [0, 100], got {}",
                self.blur
            )));
        }

        Ok(())
    }
}

pub struct EffectPipeline {
    config: EffectConfig,
}

impl EffectPipeline {
    /// Validates the config and the region tables against the detector's
    /// landmark-count contract.
    pub fn new(config: EffectConfig) -> ImageEffectResult<Self> {
        config.validate()?;
        landmarks::validate_regions(MESH_LANDMARK_COUNT)?;
        Ok(Self { config })
    }

    /// Run the full pipeline. The buffer is owned exclusively while the
    /// stages run; faces accumulate onto it sequentially.
    pub fn run(
        &self,
        image: RgbaImage,
        faces: &[LandmarkSet],
    ) -> ImageEffectResult<RgbaImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ImageEffectError::InvalidInput(
                "cannot process a zero-area image".to_string(),
            ));
        }

        log::info!("separating color and alpha planes");
        let (mut rgb, alpha) = split_channels(&image);

        if self.config.face_enhance {
            if faces.is_empty() {
                log::warn!("no faces detected, skipping facial effects");
            }
            for (i, face) in faces.iter().enumerate() {
                for effect in self.face_effects() {
                    log::info!("face {i}: applying {}", effect.name());
                    effect.apply(&mut rgb, face)?;
                }
            }
        } else if !faces.is_empty() {
            log::info!("face enhance disabled, ignoring {} detected face(s)", faces.len());
        }

        for effect in self.global_effects() {
            log::info!("applying {}", effect.name());
            effect.apply(&mut rgb)?;
        }

        log::info!("denoising alpha plane");
        let alpha = grayscale_close(&alpha, &Mask::square(1));

        Ok(merge_channels(&rgb, &alpha))
    }

    /// Facial effects in their fixed application order.
    fn face_effects(&self) -> Vec<FaceEffect> {
        let c = &self.config;
        let mut effects = vec![
            FaceEffect::EyeBrighten(EyeBrightenConfig::new().with_level(c.eye_brighten)),
            FaceEffect::TeethWhiten(TeethWhitenConfig::new().with_level(c.teeth_whiten)),
            FaceEffect::Lipstick(LipstickConfig::new().with_level(c.lipstick)),
            FaceEffect::EyelashEnhance(
                EyelashEnhanceConfig::new().with_level(c.eyelash_enhance),
            ),
        ];

        if let Some(path) = &c.glasses_asset {
            effects.push(FaceEffect::Glasses(GlassesConfig::from_path(path)));
        }
        if c.face_outline {
            effects.push(FaceEffect::FaceOutline(FaceOutlineConfig::new()));
        }

        effects
    }

    /// Global effects in their fixed application order.
    fn global_effects(&self) -> Vec<ImageEffect> {
        let c = &self.config;
        vec![
            ImageEffect::GrayscaleBlend(
                GrayscaleBlendConfig::new().with_level(c.black_white_level),
            ),
            ImageEffect::Posterize(PosterizeConfig::new().with_bits(c.posterize_bits)),
            ImageEffect::Contrast(ContrastConfig::new().with_factor(c.contrast_factor)),
            ImageEffect::Overlay(
                OverlayConfig::new()
                    .with_alpha(c.overlay_alpha)
                    .with_color(c.overlay_color),
            ),
            ImageEffect::Brightness(BrightnessConfig::new().with_factor(c.brightness)),
            ImageEffect::Saturation(SaturationConfig::new().with_factor(c.saturation)),
            ImageEffect::Sharpen(SharpenConfig::new().with_amount(c.sharpness)),
            ImageEffect::HueRotate(HueRotateConfig::new().with_degrees(c.hue)),
            ImageEffect::GaussianBlur(GaussianBlurConfig::new().with_level(c.blur)),
            ImageEffect::Vignette(VignetteConfig::new().with_strength(c.vignette)),
            ImageEffect::SkinSmooth(SkinSmoothConfig::new().with_strength(c.skin_smooth)),
        ]
    }
}

fn split_channels(image: &RgbaImage) -> (RgbImage, GrayImage) {
    let (width, height) = image.dimensions();
    let mut rgb = RgbImage::new(width, height);
    let mut alpha = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        rgb.put_pixel(x, y, Rgb([pixel[0], pixel[1], pixel[2]]));
        alpha.put_pixel(x, y, Luma([pixel[3]]));
    }

    (rgb, alpha)
}

fn merge_channels(rgb: &RgbImage, alpha: &GrayImage) -> RgbaImage {
    let (width, height) = rgb.dimensions();
    let mut result = RgbaImage::new(width, height);

    for (x, y, pixel) in result.enumerate_pixels_mut() {
        let color = rgb.get_pixel(x, y);
        let mask = alpha.get_pixel(x, y);
        *pixel = Rgba([color[0], color[1], color[2], mask[0]]);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::colour_space::to_gray;
    use crate::landmarks::regions;

    fn synthetic_face(placed: &[(&[usize], (f32, f32), f32)]) -> LandmarkSet {
        let mut points = vec![(0.01f32, 0.01f32); MESH_LANDMARK_COUNT];
        for &(indices, (cx, cy), radius) in placed {
            let n = indices.len() as f32;
            for (i, &index) in indices.iter().enumerate() {
                let angle = i as f32 / n * std::f32::consts::TAU;
                points[index] = (cx + radius * angle.cos(), cy + radius * angle.sin());
            }
        }
        LandmarkSet::new(points)
    }

    fn opaque_image(color: [u8; 3]) -> RgbaImage {
        RgbaImage::from_pixel(100, 100, Rgba([color[0], color[1], color[2], 255]))
    }

    #[test]
    fn test_neutral_config_is_identity() {
        let input = opaque_image([120, 90, 60]);
        let pipeline = EffectPipeline::new(EffectConfig::new()).unwrap();
        let output = pipeline.run(input.clone(), &[]).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_zero_area_image_is_rejected() {
        let pipeline = EffectPipeline::new(EffectConfig::new()).unwrap();
        let err = pipeline.run(RgbaImage::new(0, 0), &[]).unwrap_err();
        assert!(matches!(err, ImageEffectError::InvalidInput(_)));
    }

    #[test]
    fn test_out_of_range_config_is_rejected() {
        assert!(EffectPipeline::new(EffectConfig::new().with_posterize_bits(0)).is_err());
        assert!(EffectPipeline::new(EffectConfig::new().with_contrast_factor(-1.0)).is_err());
        assert!(EffectPipeline::new(EffectConfig::new().with_hue(500.0)).is_err());
        assert!(EffectPipeline::new(EffectConfig::new().with_lipstick(1.5)).is_err());
    }

    #[test]
    fn test_black_white_full_equals_gray_broadcast() {
        let mut input = opaque_image([120, 90, 60]);
        input.put_pixel(3, 4, Rgba([200, 10, 250, 255]));

        let (rgb, _) = split_channels(&input);
        let gray = to_gray(&rgb);

        let pipeline =
            EffectPipeline::new(EffectConfig::new().with_black_white_level(1.0)).unwrap();
        let output = pipeline.run(input, &[]).unwrap();

        for (x, y, pixel) in output.enumerate_pixels() {
            let expected = gray.get_pixel(x, y)[0];
            assert_eq!(pixel[0], expected);
            assert_eq!(pixel[1], expected);
            assert_eq!(pixel[2], expected);
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_lipstick_and_teeth_scenario() {
        // Teeth placed first: landmark 17 is shared with the upper lip and
        // must land on the lip circle.
        let face = synthetic_face(&[
            (regions::TEETH, (0.5, 0.4), 0.08),
            (regions::UPPER_LIP, (0.5, 0.7), 0.08),
        ]);

        let input = opaque_image([120, 120, 120]);
        let config = EffectConfig::new()
            .with_face_enhance(true)
            .with_teeth_whiten(0.5)
            .with_lipstick(0.5);
        let pipeline = EffectPipeline::new(config).unwrap();
        let output = pipeline.run(input.clone(), &[face]).unwrap();

        // Inside the lip polygon: shifted toward the red target.
        let lip = output.get_pixel(50, 70);
        assert!(lip[0] > lip[1], "lip pixel not red-shifted: {lip:?}");
        assert!(lip[0] > input.get_pixel(50, 70)[0]);

        // Far outside every masked region: unchanged.
        for (x, y) in [(90, 90), (90, 10), (10, 90)] {
            assert_eq!(output.get_pixel(x, y), input.get_pixel(x, y), "({x},{y}) changed");
        }

        // Alpha: a close on a fully-opaque plane is a no-op.
        for pixel in output.pixels() {
            assert_eq!(pixel[3], 255);
        }
    }

    #[test]
    fn test_facial_effects_require_the_enable_flag() {
        let face = synthetic_face(&[(regions::UPPER_LIP, (0.5, 0.7), 0.08)]);
        let input = opaque_image([120, 120, 120]);

        let config = EffectConfig::new().with_lipstick(0.5); // face_enhance stays off
        let pipeline = EffectPipeline::new(config).unwrap();
        let output = pipeline.run(input.clone(), &[face]).unwrap();
        assert_eq!(output, input);
    }

    #[test]
    fn test_alpha_is_denoised_not_recolored() {
        let mut input = opaque_image([50, 100, 150]);
        // A lone transparent speck inside an opaque area.
        input.put_pixel(40, 40, Rgba([50, 100, 150, 0]));

        let pipeline = EffectPipeline::new(EffectConfig::new()).unwrap();
        let output = pipeline.run(input, &[]).unwrap();

        // The close fills the speck; color is untouched.
        assert_eq!(*output.get_pixel(40, 40), Rgba([50, 100, 150, 255]));
    }

    #[test]
    fn test_ordering_is_not_commutative() {
        // contrast then overlay differs from overlay then contrast; the
        // pipeline pins contrast first.
        let input = opaque_image([100, 100, 100]);
        let config = EffectConfig::new()
            .with_contrast_factor(2.0)
            .with_overlay_alpha(0.5)
            .with_overlay_color([255, 255, 255]);
        let pipeline = EffectPipeline::new(config).unwrap();
        let output = pipeline.run(input, &[]).unwrap();

        // contrast: 100 * 2 = 200; overlay: 200 * 0.5 + 255 * 0.5 = 228.
        // (The reverse order would give 255.)
        assert_eq!(output.get_pixel(10, 10)[0], 228);
    }
}
