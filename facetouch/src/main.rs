//! Offline face-retouch tool: applies facial-region and global effects to a
//! PNG with transparency, preserving the alpha mask.

use anyhow::{Context, anyhow, bail};
use clap::Parser;
use face_effect::{EffectConfig, EffectPipeline, LandmarkSet};
use face_landmarker::{FaceLandmarker, Model};
use image::RgbImage;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Apply face-retouch and global effects to an image")]
struct Args {
    /// Input image path (PNG with transparency)
    input: PathBuf,

    /// Output image path
    output: PathBuf,

    /// Black and white effect intensity (0 to 1)
    #[arg(long, default_value_t = 0.2)]
    black_white_level: f32,

    /// Number of bits for posterize (1 to 8)
    #[arg(long, default_value_t = 4)]
    posterize_bits: u8,

    /// Contrast adjustment factor (1 is neutral)
    #[arg(long, default_value_t = 1.0)]
    contrast_factor: f32,

    /// Overlay alpha (0 to 1)
    #[arg(long, default_value_t = 0.5)]
    overlay_alpha: f32,

    /// Brightness adjustment factor (-1 to 1)
    #[arg(long, default_value_t = 0.0)]
    brightness: f32,

    /// Saturation adjustment factor (-1 to 1)
    #[arg(long, default_value_t = 0.0)]
    saturation: f32,

    /// Sharpness adjustment factor (-1 to 1)
    #[arg(long, default_value_t = 0.0)]
    sharpness: f32,

    /// Hue adjustment in degrees (-180 to 180)
    #[arg(long, default_value_t = 0.0)]
    hue: f32,

    /// Blur level (0 to 100)
    #[arg(long, default_value_t = 0.0)]
    blur: f32,

    /// Vignette strength (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    vignette: f32,

    /// Skin smooth strength (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    skin_smooth: f32,

    /// Enable facial effects (requires a landmark model)
    #[arg(long)]
    face_enhance: bool,

    /// Eye brightening level (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    eye_brighten: f32,

    /// Teeth whitening level (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    teeth_whiten: f32,

    /// Lipstick level (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    lipstick: f32,

    /// Eyelash enhancement level (0 to 1)
    #[arg(long, default_value_t = 0.0)]
    eyelash_enhance: f32,

    /// Composite a glasses overlay onto the face
    #[arg(long)]
    add_glasses: bool,

    /// Glasses overlay asset (RGBA image)
    #[arg(long, default_value = "glasses.png")]
    glasses_asset: PathBuf,

    /// Draw the detected face hull (diagnostic)
    #[arg(long)]
    face_outline: bool,

    /// Landmark model file name
    #[arg(long, default_value = "face_landmark.onnx")]
    model: String,

    /// Directory holding the landmark model
    #[arg(long, default_value = "models")]
    model_dir: PathBuf,

    /// Minimum face-presence confidence (0 to 1)
    #[arg(long, default_value_t = 0.3)]
    min_confidence: f32,
}

fn init_logger() {
    use std::io::Write;

    env_logger::builder()
        .format(|buf, record| {
            let style = buf.default_level_style(record.level());
            let ts = buf.timestamp_seconds();

            writeln!(
                buf,
                "[{} {style}{}{style:#} {} {}] {}",
                ts,
                record.level(),
                record
                    .file()
                    .unwrap_or("unknown")
                    .split('/')
                    .next_back()
                    .unwrap(),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

fn main() -> anyhow::Result<()> {
    init_logger();
    let args = Args::parse();
    run(args)
}

fn run(args: Args) -> anyhow::Result<()> {
    log::info!("reading input image {}", args.input.display());
    let input = image::open(&args.input)
        .with_context(|| format!("failed to read input image {}", args.input.display()))?;
    if !input.color().has_alpha() {
        bail!("input image {} has no alpha channel", args.input.display());
    }

    let pipeline = EffectPipeline::new(build_config(&args))
        .context("invalid effect configuration")?;

    let faces = if args.face_enhance {
        detect_faces(&args, &input.to_rgb8()).context("face landmark detection failed")?
    } else {
        Vec::new()
    };

    let output = pipeline
        .run(input.to_rgba8(), &faces)
        .context("effect pipeline failed")?;

    output
        .save(&args.output)
        .with_context(|| format!("failed to save output image {}", args.output.display()))?;
    log::info!("saved output image {}", args.output.display());

    Ok(())
}

fn build_config(args: &Args) -> EffectConfig {
    EffectConfig::new()
        .with_black_white_level(args.black_white_level)
        .with_posterize_bits(args.posterize_bits)
        .with_contrast_factor(args.contrast_factor)
        .with_overlay_alpha(args.overlay_alpha)
        .with_brightness(args.brightness)
        .with_saturation(args.saturation)
        .with_sharpness(args.sharpness)
        .with_hue(args.hue)
        .with_blur(args.blur)
        .with_vignette(args.vignette)
        .with_skin_smooth(args.skin_smooth)
        .with_face_enhance(args.face_enhance)
        .with_eye_brighten(args.eye_brighten)
        .with_teeth_whiten(args.teeth_whiten)
        .with_lipstick(args.lipstick)
        .with_eyelash_enhance(args.eyelash_enhance)
        .with_glasses_asset(args.add_glasses.then(|| args.glasses_asset.clone()))
        .with_face_outline(args.face_outline)
}

fn detect_faces(args: &Args, image: &RgbImage) -> anyhow::Result<Vec<LandmarkSet>> {
    let model = Model::try_from(&args.model)
        .ok_or_else(|| anyhow!("unknown landmark model {}", args.model))?;
    let model_path = args.model_dir.join(model.to_str());

    let mut landmarker = FaceLandmarker::new(model, &model_path)
        .with_context(|| {
            format!(
                "failed to load landmark model {} (download: {})",
                model_path.display(),
                model.download_url()
            )
        })?
        .with_min_confidence(args.min_confidence);

    let faces = landmarker.detect(image)?;
    log::info!("detected {} face(s)", faces.len());

    Ok(faces
        .into_iter()
        .map(|face| LandmarkSet::new(face.points))
        .collect())
}
