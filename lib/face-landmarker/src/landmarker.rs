use crate::{Error, Model, Result};
use fast_image_resize::{PixelType, ResizeOptions, Resizer, images::Image as FrImage};
use image::RgbImage;
use ndarray::Array;
use ort::{session::Session, value::TensorRef};
use std::path::Path;

/// One detected face: normalized landmark coordinates in [0, 1] plus the
/// model's face-presence confidence.
#[derive(Debug, Clone)]
pub struct FaceLandmarks {
    pub points: Vec<(f32, f32)>,
    pub confidence: f32,
}

#[derive(Debug)]
#[non_exhaustive]
pub struct FaceLandmarker {
    input_size: (u32, u32),
    landmark_count: usize,
    min_confidence: f32,
    session: Session,
    input_name: String,
    output_names: Vec<String>,
}

impl FaceLandmarker {
    pub fn new<P: AsRef<Path>>(model: Model, model_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            return Err(Error::ModelNotFound(model_path.to_path_buf()));
        }

        log::info!("Loading ONNX model from: {}", model_path.display());

        let session = Session::builder()?.commit_from_file(model_path)?;
        let input_name = Self::get_input_name(&session);
        let output_names: Vec<String> = session
            .outputs()
            .iter()
            .map(|output| output.name().to_string())
            .collect();

        Ok(Self {
            input_size: model.to_input_size(),
            landmark_count: model.landmark_count(),
            min_confidence: 0.3,
            session,
            input_name,
            output_names,
        })
    }

    pub fn with_min_confidence(mut self, min_confidence: f32) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }

    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }

    /// Run the landmark model on the full image. Returns an empty vec when
    /// the face-presence score is below the confidence threshold.
    pub fn detect(&mut self, image: &RgbImage) -> Result<Vec<FaceLandmarks>> {
        let target_width = (self.input_size.0 / 2) * 2; // Ensure even
        let target_height = (self.input_size.1 / 2) * 2; // Ensure even

        let resized = self.fast_resize(image, target_width, target_height)?;
        let input_array = self.preprocess_image(&resized)?;
        let (coords, score) = self.run_inference_inner(input_array)?;

        let confidence = normalize_score(score);
        if confidence < self.min_confidence {
            log::info!("face-presence score {confidence:.3} below threshold, no face");
            return Ok(Vec::new());
        }

        // Coordinates come in model-input pixel units, (x, y, z) per point;
        // normalize to [0, 1] and drop z.
        let points: Vec<(f32, f32)> = coords
            .chunks_exact(3)
            .map(|triple| {
                (
                    triple[0] / target_width as f32,
                    triple[1] / target_height as f32,
                )
            })
            .collect();

        Ok(vec![FaceLandmarks { points, confidence }])
    }

    fn fast_resize(
        &self,
        image: &RgbImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<RgbImage> {
        let (width, height) = image.dimensions();
        if width == target_width && height == target_height {
            return Ok(image.clone());
        }

        let src_image =
            FrImage::from_vec_u8(width, height, image.as_raw().clone(), PixelType::U8x3)?;
        let mut dst_image = FrImage::new(target_width, target_height, PixelType::U8x3);
        Resizer::new().resize(&src_image, &mut dst_image, &ResizeOptions::new())?;

        RgbImage::from_raw(target_width, target_height, dst_image.into_vec())
            .ok_or_else(|| Error::ImageProcessing("Failed to create resized image".to_string()))
    }

    fn preprocess_image(&self, image: &RgbImage) -> Result<Array<f32, ndarray::Ix4>> {
        let (width, height) = image.dimensions();

        // NCHW, normalized to [0, 1]
        let mut array = Array::zeros((1, 3, height as usize, width as usize));
        for y in 0..height {
            for x in 0..width {
                let pixel = image.get_pixel(x, y);
                array[[0, 0, y as usize, x as usize]] = pixel[0] as f32 / 255.0;
                array[[0, 1, y as usize, x as usize]] = pixel[1] as f32 / 255.0;
                array[[0, 2, y as usize, x as usize]] = pixel[2] as f32 / 255.0;
            }
        }

        Ok(array)
    }

    /// Returns the flat landmark coordinate vector and the face-presence
    /// score. Outputs are identified by element count: landmark_count * 3
    /// values for coordinates, a single value for the score.
    fn run_inference_inner(&mut self, input: Array<f32, ndarray::Ix4>) -> Result<(Vec<f32>, f32)> {
        let input_tensor = TensorRef::from_array_view(input.view())?;
        let outputs = self
            .session
            .run(ort::inputs! { &self.input_name => input_tensor })?;

        let mut coords = None;
        let mut score = None;
        for output_name in &self.output_names {
            let Ok(array) = outputs[output_name.as_str()].try_extract_array::<f32>() else {
                continue;
            };

            let flat: Vec<f32> = array.iter().copied().collect();
            if flat.len() == self.landmark_count * 3 {
                coords = Some(flat);
            } else if flat.len() == 1 {
                score = Some(flat[0]);
            }
        }

        let coords = coords.ok_or_else(|| {
            Error::InvalidOutput(format!(
                "no output with {} landmark coordinates",
                self.landmark_count * 3
            ))
        })?;
        let score =
            score.ok_or_else(|| Error::InvalidOutput("no face-presence score output".to_string()))?;

        Ok((coords, score))
    }

    fn get_input_name(session: &Session) -> String {
        let common_names = vec!["input", "input.1", "image", "x"];
        let model_inputs: Vec<String> = session
            .inputs()
            .iter()
            .map(|input| input.name().to_string())
            .collect();

        for common_name in &common_names {
            if model_inputs.iter().any(|name| name == common_name) {
                return common_name.to_string();
            }
        }

        model_inputs
            .first()
            .cloned()
            .unwrap_or_else(|| "input".to_string())
    }
}

// Some exports emit a raw logit instead of a probability.
fn normalize_score(score: f32) -> f32 {
    if (0.0..=1.0).contains(&score) {
        score
    } else {
        1.0 / (1.0 + (-score).exp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_score_passes_probabilities_through() {
        assert_eq!(normalize_score(0.7), 0.7);
        assert_eq!(normalize_score(0.0), 0.0);
        assert_eq!(normalize_score(1.0), 1.0);
    }

    #[test]
    fn test_normalize_score_squashes_logits() {
        assert!(normalize_score(10.0) > 0.99);
        assert!(normalize_score(-10.0) < 0.01);
    }

    #[test]
    fn test_missing_model_file_is_reported() {
        let err = FaceLandmarker::new(Model::FaceMesh, "no/such/model.onnx").unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(_)));
    }
}
