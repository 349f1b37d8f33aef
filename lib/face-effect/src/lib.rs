pub mod base_effect;
pub mod blur_effect;
pub mod colour_space;
pub mod face_effect;
pub mod filter_effect;
pub mod landmarks;
pub mod pipeline;
pub mod region_mask;
pub mod stylized_effect;

use image::RgbImage;

pub use landmarks::LandmarkSet;
pub use pipeline::{EffectConfig, EffectPipeline};

pub type ImageEffectResult<T> = Result<T, ImageEffectError>;

#[derive(thiserror::Error, Debug)]
pub enum ImageEffectError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("Image processing error: {0}")]
    ImageProc(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub trait Effect {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()>;
}

/// Effects confined to a landmark-derived facial region. The alpha plane is
/// never part of the buffer these operate on.
pub trait FacialEffect {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()>;
}

/// Whole-image effects, listed in pipeline application order.
#[derive(Debug, Clone)]
pub enum ImageEffect {
    GrayscaleBlend(base_effect::GrayscaleBlendConfig),
    Posterize(stylized_effect::PosterizeConfig),
    Contrast(base_effect::ContrastConfig),
    Overlay(filter_effect::OverlayConfig),
    Brightness(base_effect::BrightnessConfig),
    Saturation(base_effect::SaturationConfig),
    Sharpen(stylized_effect::SharpenConfig),
    HueRotate(base_effect::HueRotateConfig),
    GaussianBlur(blur_effect::GaussianBlurConfig),
    Vignette(filter_effect::VignetteConfig),
    SkinSmooth(blur_effect::SkinSmoothConfig),
}

impl ImageEffect {
    pub fn name(&self) -> &'static str {
        match self {
            ImageEffect::GrayscaleBlend(_) => "grayscale-blend",
            ImageEffect::Posterize(_) => "posterize",
            ImageEffect::Contrast(_) => "contrast",
            ImageEffect::Overlay(_) => "overlay",
            ImageEffect::Brightness(_) => "brightness",
            ImageEffect::Saturation(_) => "saturation",
            ImageEffect::Sharpen(_) => "sharpen",
            ImageEffect::HueRotate(_) => "hue-rotate",
            ImageEffect::GaussianBlur(_) => "gaussian-blur",
            ImageEffect::Vignette(_) => "vignette",
            ImageEffect::SkinSmooth(_) => "skin-smooth",
        }
    }
}

impl Effect for ImageEffect {
    fn apply(&self, image: &mut RgbImage) -> ImageEffectResult<()> {
        match self {
            ImageEffect::GrayscaleBlend(config) => config.apply(image),
            ImageEffect::Posterize(config) => config.apply(image),
            ImageEffect::Contrast(config) => config.apply(image),
            ImageEffect::Overlay(config) => config.apply(image),
            ImageEffect::Brightness(config) => config.apply(image),
            ImageEffect::Saturation(config) => config.apply(image),
            ImageEffect::Sharpen(config) => config.apply(image),
            ImageEffect::HueRotate(config) => config.apply(image),
            ImageEffect::GaussianBlur(config) => config.apply(image),
            ImageEffect::Vignette(config) => config.apply(image),
            ImageEffect::SkinSmooth(config) => config.apply(image),
        }
    }
}

/// Landmark-driven effects, listed in pipeline application order.
#[derive(Debug, Clone)]
pub enum FaceEffect {
    EyeBrighten(face_effect::EyeBrightenConfig),
    TeethWhiten(face_effect::TeethWhitenConfig),
    Lipstick(face_effect::LipstickConfig),
    EyelashEnhance(face_effect::EyelashEnhanceConfig),
    Glasses(face_effect::GlassesConfig),
    FaceOutline(face_effect::FaceOutlineConfig),
}

impl FaceEffect {
    pub fn name(&self) -> &'static str {
        match self {
            FaceEffect::EyeBrighten(_) => "eye-brighten",
            FaceEffect::TeethWhiten(_) => "teeth-whiten",
            FaceEffect::Lipstick(_) => "lipstick",
            FaceEffect::EyelashEnhance(_) => "eyelash-enhance",
            FaceEffect::Glasses(_) => "glasses",
            FaceEffect::FaceOutline(_) => "face-outline",
        }
    }
}

impl FacialEffect for FaceEffect {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        match self {
            FaceEffect::EyeBrighten(config) => config.apply(image, face),
            FaceEffect::TeethWhiten(config) => config.apply(image, face),
            FaceEffect::Lipstick(config) => config.apply(image, face),
            FaceEffect::EyelashEnhance(config) => config.apply(image, face),
            FaceEffect::Glasses(config) => config.apply(image, face),
            FaceEffect::FaceOutline(config) => config.apply(image, face),
        }
    }
}
