//! Landmark-driven effects confined to facial sub-regions.
//!
//! Every operator builds its region mask, transforms the masked pixels in
//! HSV, and composites the contribution back by saturating addition.
//! Overlapping regions stack brightness instead of replacing it. Missing
//! landmark indices degrade to a smaller or empty mask and the region is
//! skipped with a warning, never an error.

use crate::colour_space::{hsv_to_rgb, rgb_to_hsv};
use crate::landmarks::{LandmarkSet, regions};
use crate::region_mask::{convex_hull_points, is_empty_mask, polygon_mask, polyline_mask};
use crate::{FacialEffect, ImageEffectResult};
use derivative::Derivative;
use derive_setters::Setters;
use image::{GrayImage, Luma, Rgb, RgbImage};
use imageproc::{
    distance_transform::Norm,
    drawing::draw_line_segment_mut,
    morphology::{dilate, grayscale_close, Mask},
};
use std::path::PathBuf;

/// Lipstick hue/saturation target (a fixed red tone).
const LIPSTICK_HUE: f32 = 320.0;
const LIPSTICK_SATURATION: f32 = 0.59;

/// Transform the masked pixels in HSV and add the result back onto the image.
fn composite_masked_hsv<F>(image: &mut RgbImage, mask: &GrayImage, transform: F)
where
    F: Fn(&mut f32, &mut f32, &mut f32),
{
    for (pixel, mask_pixel) in image.pixels_mut().zip(mask.pixels()) {
        if mask_pixel[0] == 0 {
            continue;
        }

        let (mut h, mut s, mut v) = rgb_to_hsv(pixel[0], pixel[1], pixel[2]);
        transform(&mut h, &mut s, &mut v);
        let (r, g, b) = hsv_to_rgb(h, s, v);

        pixel[0] = pixel[0].saturating_add(r);
        pixel[1] = pixel[1].saturating_add(g);
        pixel[2] = pixel[2].saturating_add(b);
    }
}

/// Eye brightening configuration. level <= 0 is a no-op.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EyeBrightenConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 1]
}

impl EyeBrightenConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FacialEffect for EyeBrightenConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        for (name, indices) in [("left eye", regions::LEFT_EYE), ("right eye", regions::RIGHT_EYE)] {
            let mask = polygon_mask(width, height, face, indices);
            if is_empty_mask(&mask) {
                log::warn!("eye-brighten: {name} region is empty, skipping");
                continue;
            }

            let level = self.level;
            composite_masked_hsv(image, &mask, |_h, _s, v| {
                *v = (*v * (1.0 + level)).clamp(0.0, 255.0);
            });
        }

        Ok(())
    }
}

/// Teeth whitening configuration. level <= 0 is a no-op.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct TeethWhitenConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 1]
}

impl TeethWhitenConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FacialEffect for TeethWhitenConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let mask = polygon_mask(width, height, face, regions::TEETH);
        if is_empty_mask(&mask) {
            log::warn!("teeth-whiten: teeth region is empty, skipping");
            return Ok(());
        }

        let level = self.level;
        composite_masked_hsv(image, &mask, |_h, _s, v| {
            *v = (*v * (1.0 + level)).clamp(0.0, 255.0);
        });

        Ok(())
    }
}

/// Lipstick configuration: overrides hue/saturation with the fixed red
/// target and scales value by (1 + level). level <= 0 is a no-op.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct LipstickConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 1]
}

impl LipstickConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FacialEffect for LipstickConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        for (name, indices) in [("upper lip", regions::UPPER_LIP), ("lower lip", regions::LOWER_LIP)] {
            let mask = polygon_mask(width, height, face, indices);
            if is_empty_mask(&mask) {
                log::warn!("lipstick: {name} region is empty, skipping");
                continue;
            }

            let level = self.level;
            composite_masked_hsv(image, &mask, |h, s, v| {
                *h = LIPSTICK_HUE;
                *s = LIPSTICK_SATURATION;
                *v = (*v * (1.0 + level)).clamp(0.0, 255.0);
            });
        }

        Ok(())
    }
}

/// Eyelash enhancement configuration: morphological thickening of the
/// eyelash stroke, iterations scaled by the level. level <= 0 is a no-op.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EyelashEnhanceConfig {
    #[derivative(Default(value = "0.0"))]
    level: f32, // [0, 1]
}

impl EyelashEnhanceConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FacialEffect for EyelashEnhanceConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        if self.level <= 0.0 {
            return Ok(());
        }

        let (width, height) = image.dimensions();
        let iterations = (self.level * 3.0) as u8;

        for (name, indices) in [
            ("left eyelash", regions::LEFT_EYELASH),
            ("right eyelash", regions::RIGHT_EYELASH),
        ] {
            let mask = polyline_mask(width, height, face, indices);
            if is_empty_mask(&mask) {
                log::warn!("eyelash-enhance: {name} region is empty, skipping");
                continue;
            }

            // Extract the masked stroke per channel, thicken it, add it back.
            let mut channels =
                [GrayImage::new(width, height), GrayImage::new(width, height), GrayImage::new(width, height)];
            for (x, y, pixel) in image.enumerate_pixels() {
                if mask.get_pixel(x, y)[0] != 0 {
                    for i in 0..3 {
                        channels[i].put_pixel(x, y, Luma([pixel[i]]));
                    }
                }
            }

            if iterations > 0 {
                for channel in channels.iter_mut() {
                    *channel = grayscale_close(channel, &Mask::square(iterations));
                }
            }

            for (x, y, pixel) in image.enumerate_pixels_mut() {
                for i in 0..3 {
                    let contribution = channels[i].get_pixel(x, y)[0];
                    pixel[i] = pixel[i].saturating_add(contribution);
                }
            }
        }

        Ok(())
    }
}

/// Eyewear overlay configuration. The asset is resized to span both eye
/// bounding boxes and alpha-composited; a missing or unreadable asset is a
/// warning, never an error.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_", into)]
#[non_exhaustive]
pub struct GlassesConfig {
    #[derivative(Default(value = "PathBuf::new()"))]
    asset_path: PathBuf,
}

impl GlassesConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { asset_path: path.into() }
    }
}

impl FacialEffect for GlassesConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        let (width, height) = image.dimensions();

        let Some(left) = region_bounding_box(face, regions::LEFT_EYE, width, height) else {
            log::warn!("glasses: left eye region is empty, skipping");
            return Ok(());
        };
        let Some(right) = region_bounding_box(face, regions::RIGHT_EYE, width, height) else {
            log::warn!("glasses: right eye region is empty, skipping");
            return Ok(());
        };

        // Span from the left-eye left edge to the right-eye right edge,
        // square aspect.
        let glasses_width = right.0 + right.2 - left.0;
        let glasses_height = glasses_width;
        if glasses_width <= 0 {
            log::warn!("glasses: eye boxes do not span a positive width, skipping");
            return Ok(());
        }

        let asset = match image::open(&self.asset_path) {
            Ok(asset) => asset,
            Err(e) => {
                log::warn!(
                    "glasses: cannot read asset {}: {e}, skipping",
                    self.asset_path.display()
                );
                return Ok(());
            }
        };
        let has_alpha = asset.color().has_alpha();
        let resized = image::imageops::resize(
            &asset.to_rgba8(),
            glasses_width as u32,
            glasses_height as u32,
            image::imageops::FilterType::Triangle,
        );

        // Position relative to the left-eye box, shifted up by half the
        // asset height; clamp to bounds by shifting, not cropping.
        let mut x1 = left.0;
        let mut y1 = left.1 - glasses_height / 2;
        if y1 < 0 {
            y1 = 0;
        }
        if x1 < 0 {
            x1 = 0;
        }
        if y1 + glasses_height > height as i32 {
            y1 = height as i32 - glasses_height;
        }
        if x1 + glasses_width > width as i32 {
            x1 = width as i32 - glasses_width;
        }
        if x1 < 0 || y1 < 0 {
            log::warn!("glasses: asset larger than the image, skipping");
            return Ok(());
        }

        for (gx, gy, asset_pixel) in resized.enumerate_pixels() {
            let x = x1 as u32 + gx;
            let y = y1 as u32 + gy;
            let pixel = image.get_pixel_mut(x, y);

            if has_alpha {
                let alpha = asset_pixel[3] as f32 / 255.0;
                for i in 0..3 {
                    let val =
                        asset_pixel[i] as f32 * alpha + pixel[i] as f32 * (1.0 - alpha);
                    pixel[i] = val.round().clamp(0.0, 255.0) as u8;
                }
            } else {
                *pixel = Rgb([asset_pixel[0], asset_pixel[1], asset_pixel[2]]);
            }
        }

        Ok(())
    }
}

/// Whole-face convex-hull outline, a diagnostic overlay.
#[derive(Debug, Clone, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct FaceOutlineConfig {
    #[derivative(Default(value = "[255, 0, 0]"))]
    color: [u8; 3],

    #[derivative(Default(value = "2"))]
    thickness: u8,
}

impl FaceOutlineConfig {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FacialEffect for FaceOutlineConfig {
    fn apply(&self, image: &mut RgbImage, face: &LandmarkSet) -> ImageEffectResult<()> {
        let (width, height) = image.dimensions();
        let hull = convex_hull_points(width, height, face);
        if hull.len() < 2 {
            log::warn!("face-outline: not enough landmarks for a hull, skipping");
            return Ok(());
        }

        let mut outline = GrayImage::new(width, height);
        for i in 0..hull.len() {
            let a = hull[i];
            let b = hull[(i + 1) % hull.len()];
            draw_line_segment_mut(
                &mut outline,
                (a.x as f32, a.y as f32),
                (b.x as f32, b.y as f32),
                Luma([255u8]),
            );
        }
        if self.thickness > 1 {
            outline = dilate(&outline, Norm::LInf, self.thickness / 2);
        }

        for (pixel, outline_pixel) in image.pixels_mut().zip(outline.pixels()) {
            if outline_pixel[0] != 0 {
                *pixel = Rgb(self.color);
            }
        }

        Ok(())
    }
}

/// (x, y, width, height) of the region's pixel points, `None` when every
/// index is out of bounds.
fn region_bounding_box(
    face: &LandmarkSet,
    indices: &[usize],
    width: u32,
    height: u32,
) -> Option<(i32, i32, i32, i32)> {
    let points = face.pixel_points(indices, width, height);
    if points.is_empty() {
        return None;
    }

    let min_x = points.iter().map(|p| p.x).min().unwrap();
    let min_y = points.iter().map(|p| p.y).min().unwrap();
    let max_x = points.iter().map(|p| p.x).max().unwrap();
    let max_y = points.iter().map(|p| p.y).max().unwrap();

    Some((min_x, min_y, max_x - min_x, max_y - min_y))
}
