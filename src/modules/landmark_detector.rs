use std::time::Duration;
use anyhow::{Context, Error};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use tracing::{debug, warn};
use crate::config::config::LandmarkDetectorConfig;
use crate::error::PipelineError;
use crate::utils::coordinate::{FaceMeshResponse, LandmarkSet};
use crate::utils::image::image_mime_type;

/// Produces face-mesh landmarks for the first face in an image.
#[async_trait]
pub trait LandmarkDetector: Send + Sync {
    /// Returns `Ok(None)` when the image holds no face.
    async fn detect(&self, im_bytes: &[u8]) -> Result<Option<LandmarkSet>, PipelineError>;
}

/// Client for a face-mesh service that accepts raw image bytes.
#[derive(Debug, Clone)]
pub struct HttpLandmarkDetector {
    client: Client,
    endpoint: Url,
    expected_landmarks: usize,
}

impl HttpLandmarkDetector {
    pub fn new(config: LandmarkDetectorConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("failed to build face-mesh HTTP client")?;
        let endpoint = Url::parse(&config.endpoint).context("invalid face-mesh endpoint")?;

        Ok(HttpLandmarkDetector {
            client,
            endpoint,
            expected_landmarks: config.expected_landmarks,
        })
    }
}

#[async_trait]
impl LandmarkDetector for HttpLandmarkDetector {
    async fn detect(&self, im_bytes: &[u8]) -> Result<Option<LandmarkSet>, PipelineError> {
        let response = self.client
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, image_mime_type(im_bytes))
            .body(im_bytes.to_vec())
            .send()
            .await
            .map_err(|e| PipelineError::Detector(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Detector(format!("face-mesh service returned {status}")))
        }

        let mesh: FaceMeshResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::Detector(format!("invalid face-mesh payload: {e}")))?;

        debug!(faces = mesh.faces.len(), "face-mesh response");
        let Some(face) = mesh.faces.into_iter().next() else {
            return Ok(None)
        };
        if face.landmarks.is_empty() {
            return Ok(None)
        }

        if face.landmarks.len() != self.expected_landmarks {
            warn!(
                got = face.landmarks.len(),
                expected = self.expected_landmarks,
                "unexpected landmark count"
            );
        }
        Ok(Some(face.landmarks))
    }
}
