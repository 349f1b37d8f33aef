/// Full pipeline example with a synthetic landmark set
/// Applies lipstick, eye brightening and a soft vignette
use face_effect::landmarks::{MESH_LANDMARK_COUNT, regions};
use face_effect::{EffectConfig, EffectPipeline, LandmarkSet};
use image::{Rgba, RgbaImage};
use std::path::Path;

fn synthetic_face() -> LandmarkSet {
    let mut points = vec![(0.5f32, 0.5f32); MESH_LANDMARK_COUNT];

    // Place the lip and eye regions on small circles
    for (indices, (cx, cy), radius) in [
        (regions::UPPER_LIP, (0.5, 0.72), 0.08),
        (regions::LOWER_LIP, (0.5, 0.78), 0.08),
        (regions::LEFT_EYE, (0.35, 0.4), 0.05),
        (regions::RIGHT_EYE, (0.65, 0.4), 0.05),
    ] {
        let n = indices.len() as f32;
        for (i, &index) in indices.iter().enumerate() {
            let angle = i as f32 / n * std::f32::consts::TAU;
            points[index] = (cx + radius * angle.cos(), cy + radius * angle.sin());
        }
    }

    LandmarkSet::new(points)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output_dir = Path::new("tmp");
    std::fs::create_dir_all(output_dir)?;

    // Skin-toned canvas with full alpha
    let img = RgbaImage::from_pixel(400, 400, Rgba([224, 172, 105, 255]));

    let config = EffectConfig::new()
        .with_face_enhance(true)
        .with_lipstick(0.5)
        .with_eye_brighten(0.3)
        .with_vignette(0.4);

    let pipeline = EffectPipeline::new(config)?;
    let result = pipeline.run(img, &[synthetic_face()])?;

    result.save(output_dir.join("beautify.png"))?;
    println!("✓ Generated beautify.png");
    println!("  Images saved to: tmp/");

    Ok(())
}
