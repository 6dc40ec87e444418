use std::sync::Arc;
use anyhow::Error;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use crate::config::config::PipelineConfig;
use crate::error::PipelineError;
use crate::helper::feature_helper::{FeatureClassifier, FeatureLabels};
use crate::modules::avatar_client::{AvatarArtifact, AvatarGenerator, DiceBearClient};
use crate::modules::landmark_detector::{HttpLandmarkDetector, LandmarkDetector};
use crate::utils::coordinate::LandmarkSet;

/// Labels and rendered avatar for one processed face.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarResult {
    pub feature_data: FeatureLabels,
    pub avatar: AvatarArtifact,
}

/// Response body once the avatar has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvatarResponse {
    pub feature_data: FeatureLabels,
    pub avatar_url: String,
}

impl AvatarResult {
    pub fn to_response(&self, avatar_url: impl Into<String>) -> AvatarResponse {
        AvatarResponse {
            feature_data: self.feature_data,
            avatar_url: avatar_url.into(),
        }
    }
}

#[derive(Clone)]
pub struct AvatarPipeline {
    classifier: FeatureClassifier,
    detector: Arc<dyn LandmarkDetector>,
    generator: Arc<dyn AvatarGenerator>,
}

impl std::fmt::Debug for AvatarPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AvatarPipeline")
            .field("classifier", &self.classifier)
            .finish_non_exhaustive()
    }
}

impl AvatarPipeline {

    /// new initializes new instance of the pipeline
    pub fn new(
        detector: Arc<dyn LandmarkDetector>,
        generator: Arc<dyn AvatarGenerator>,
    ) -> Self {
        AvatarPipeline {
            classifier: FeatureClassifier::new(),
            detector,
            generator,
        }
    }

    /// from_config wires the HTTP face-mesh detector and the DiceBear client.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, Error> {
        let detector = HttpLandmarkDetector::new(config.detector.clone())?;
        let generator = DiceBearClient::new(config.avatar.clone())?;
        Ok(AvatarPipeline::new(Arc::new(detector), Arc::new(generator)))
    }

    /// classify maps one face to its feature labels.
    pub fn classify(&self, landmarks: &LandmarkSet) -> Result<FeatureLabels, PipelineError> {
        Ok(self.classifier.classify(landmarks)?)
    }

    /// generate_from_landmarks classifies a face and requests its avatar.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet of the face
    ///
    /// # Returns
    /// * `Result<AvatarResult, PipelineError>`
    pub async fn generate_from_landmarks(&self, landmarks: &LandmarkSet) -> Result<AvatarResult, PipelineError> {
        let feature_data = self.classify(landmarks)?;
        info!(features = ?feature_data.to_map(), "classified face");

        let avatar = self.generator.generate_avatar(&feature_data).await?;
        info!(bytes = avatar.bytes.len(), content_type = %avatar.content_type, "avatar generated");

        Ok(AvatarResult { feature_data, avatar })
    }

    /// process_image runs detection, classification and avatar generation.
    ///
    /// Only the first detected face is used. Returns `Ok(None)` when no
    /// face is found.
    ///
    /// # Arguments
    /// * `im_bytes` - encoded image
    ///
    /// # Returns
    /// * `Result<Option<AvatarResult>, PipelineError>`
    pub async fn process_image(&self, im_bytes: &[u8]) -> Result<Option<AvatarResult>, PipelineError> {
        let landmarks = match self.detector.detect(im_bytes).await? {
            Some(landmarks) => landmarks,
            None => {
                warn!("no face detected");
                return Ok(None)
            }
        };
        info!(landmarks = landmarks.len(), "face detected");

        self.generate_from_landmarks(&landmarks).await.map(Some)
    }
}
