#[derive(Clone, Copy, Debug)]
pub enum Model {
    FaceMesh,
    FaceMeshV2,
    FaceMeshWithIris,
}

impl Model {
    pub fn all_models() -> Vec<Self> {
        vec![Self::FaceMesh, Self::FaceMeshV2, Self::FaceMeshWithIris]
    }

    pub fn to_input_size(&self) -> (u32, u32) {
        match self {
            Model::FaceMesh | Model::FaceMeshWithIris => (192, 192),
            Model::FaceMeshV2 => (256, 256),
        }
    }

    /// Points per face in this model's topology.
    pub fn landmark_count(&self) -> usize {
        match self {
            Model::FaceMesh | Model::FaceMeshV2 => 468,
            Model::FaceMeshWithIris => 478,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::FaceMesh => "face_landmark.onnx",
            Self::FaceMeshV2 => "face_landmarks_detector.onnx",
            Self::FaceMeshWithIris => "face_landmark_with_attention.onnx",
        }
    }

    pub fn try_from(model: &str) -> Option<Self> {
        match model {
            "face_landmark.onnx" => Some(Model::FaceMesh),
            "face_landmarks_detector.onnx" => Some(Model::FaceMeshV2),
            "face_landmark_with_attention.onnx" => Some(Model::FaceMeshWithIris),
            _ => None,
        }
    }

    pub fn download_url(&self) -> &'static str {
        match self {
            Self::FaceMesh => {
                "https://huggingface.co/rocca/mediapipe-face-mesh/resolve/main/face_landmark.onnx"
            }
            Self::FaceMeshV2 => {
                "https://huggingface.co/OwlMaster/req2/resolve/main/face_landmarks_detector.onnx"
            }
            Self::FaceMeshWithIris => {
                "https://huggingface.co/keremberke/mediapipe-face-mesh-attention/resolve/main/face_landmark_with_attention.onnx"
            }
        }
    }
}
