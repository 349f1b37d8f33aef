use anyhow::{Context, Result};
use face_landmarker::{FaceLandmarker, Model};
use image::Rgb;
use std::{fs, path::PathBuf, time::Instant};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let input_file = "./examples/test-face.png";
    let output_dir = PathBuf::from("./output");
    if !output_dir.exists() {
        fs::create_dir(&output_dir)?;
    }

    let img = image::open(input_file)
        .with_context(|| format!("failed to open {input_file}"))?;
    let rgb = img.to_rgb8();
    log::info!("Image size: {}x{}", rgb.width(), rgb.height());

    for model in Model::all_models() {
        let model_path = PathBuf::from("./models").join(model.to_str());
        if !model_path.exists() {
            log::warn!("Model file not found: {}", model_path.display());
            continue;
        }

        let mut landmarker = FaceLandmarker::new(model, &model_path)?;

        let inference_start = Instant::now();
        let faces = landmarker.detect(&rgb)?;
        log::info!("Detection spent: {:?}", inference_start.elapsed());
        log::info!("Detected {} face(s)", faces.len());

        // Paint every landmark as a green dot
        let mut annotated = rgb.clone();
        for face in &faces {
            for &(x, y) in &face.points {
                let px = (x * annotated.width() as f32) as u32;
                let py = (y * annotated.height() as f32) as u32;
                if px < annotated.width() && py < annotated.height() {
                    annotated.put_pixel(px, py, Rgb([0, 255, 0]));
                }
            }
        }

        let model_name = model.to_str().trim_end_matches(".onnx");
        let output_path = output_dir.join(format!("landmarks_{model_name}.png"));
        annotated.save(&output_path)?;
        log::info!("Saved {}", output_path.display());
    }

    Ok(())
}
