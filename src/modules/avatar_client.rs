use std::path::Path;
use std::time::Duration;
use anyhow::{Context, Error};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, warn};
use crate::config::config::AvatarGeneratorConfig;
use crate::error::PipelineError;
use crate::helper::feature_helper::FeatureLabels;

const DEFAULT_CONTENT_TYPE: &str = "image/svg+xml";

/// Rendered avatar as returned by the generator.
#[derive(Debug, Clone, PartialEq)]
pub struct AvatarArtifact {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl AvatarArtifact {

    /// save writes the avatar to `path`, creating missing parent directories.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        tokio::fs::write(path, &self.bytes)
            .await
            .with_context(|| format!("failed to write avatar {}", path.display()))?;
        Ok(())
    }
}

/// Renders an avatar from feature labels.
#[async_trait]
pub trait AvatarGenerator: Send + Sync {
    async fn generate_avatar(&self, labels: &FeatureLabels) -> Result<AvatarArtifact, PipelineError>;
}

/// avatar_query builds the flat query the generator is keyed on. The nose
/// label is not part of it.
pub fn avatar_query(labels: &FeatureLabels, size: u32) -> Vec<(&'static str, String)> {
    vec![
        ("mouth", labels.mouth.to_string()),
        ("ears", labels.ears.to_string()),
        ("eyebrows", labels.eyebrows.to_string()),
        ("facialHair", labels.facial_hair.to_string()),
        ("hair", labels.hair.to_string()),
        ("size", size.to_string()),
    ]
}

/// HTTP client for the DiceBear avatar API.
#[derive(Debug, Clone)]
pub struct DiceBearClient {
    client: Client,
    base_url: Url,
    pub size: u32,
}

impl DiceBearClient {
    pub fn new(config: AvatarGeneratorConfig) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout))
            .build()
            .context("failed to build avatar HTTP client")?;
        let base_url = Url::parse(&config.base_url).context("invalid avatar base URL")?;

        Ok(DiceBearClient {
            client,
            base_url,
            size: config.size,
        })
    }
}

#[async_trait]
impl AvatarGenerator for DiceBearClient {
    async fn generate_avatar(&self, labels: &FeatureLabels) -> Result<AvatarArtifact, PipelineError> {
        let params = avatar_query(labels, self.size);
        debug!(?params, url = %self.base_url, "requesting avatar");

        let response = match self.client.get(self.base_url.clone()).query(&params).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "avatar request failed");
                return Err(PipelineError::downstream(None, e.to_string()))
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%status, "avatar service returned an error status");
            return Err(PipelineError::downstream(
                Some(status.as_u16()),
                format!("avatar service returned {status}"),
            ))
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::downstream(Some(status.as_u16()), e.to_string()))?;

        Ok(AvatarArtifact {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use crate::config::config::AvatarGeneratorConfig;
    use crate::error::PipelineError;
    use crate::helper::feature_helper::{Ears, Eyebrows, FeatureLabels, Hair, Mouth, Nose};
    use crate::modules::avatar_client::{avatar_query, AvatarArtifact, AvatarGenerator, DiceBearClient};

    fn labels() -> FeatureLabels {
        FeatureLabels {
            ears: Ears::Detached,
            eyebrows: Eyebrows::EyelashesDown,
            hair: Hair::DougFunny,
            nose: Nose::Pointed,
            mouth: Mouth::Pucker,
            ..FeatureLabels::default()
        }
    }

    fn client_for(base_url: String) -> DiceBearClient {
        DiceBearClient::new(AvatarGeneratorConfig {
            base_url,
            timeout: 5,
            ..AvatarGeneratorConfig::new()
        }).unwrap()
    }

    #[test]
    fn test_avatar_query() {
        let query = avatar_query(&labels(), 96);
        let keys: Vec<&str> = query.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["mouth", "ears", "eyebrows", "facialHair", "hair", "size"]);
        assert_eq!(query[0].1, "pucker");
        assert_eq!(query[2].1, "eyelashesDown");
        assert_eq!(query[3].1, "scruff");
        assert_eq!(query[4].1, "dougFunny");
        assert_eq!(query[5].1, "96");
    }

    #[tokio::test]
    async fn test_generate_avatar_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/9.x/micah/svg"))
            .and(query_param("mouth", "pucker"))
            .and(query_param("ears", "detached"))
            .and(query_param("eyebrows", "eyelashesDown"))
            .and(query_param("facialHair", "scruff"))
            .and(query_param("hair", "dougFunny"))
            .and(query_param("size", "96"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(b"<svg/>".to_vec(), "image/svg+xml"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = client_for(format!("{}/9.x/micah/svg", mock_server.uri()));
        let artifact = client.generate_avatar(&labels()).await.unwrap();
        assert_eq!(artifact.content_type, "image/svg+xml");
        assert_eq!(artifact.bytes, b"<svg/>".to_vec());
    }

    #[tokio::test]
    async fn test_generate_avatar_error_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&mock_server)
            .await;

        let client = client_for(mock_server.uri());
        match client.generate_avatar(&labels()).await {
            Err(PipelineError::DownstreamUnavailable { status, .. }) => assert_eq!(status, Some(503)),
            other => panic!("expected DownstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_avatar_unreachable() {
        let client = client_for("http://127.0.0.1:9/svg".to_string());
        match client.generate_avatar(&labels()).await {
            Err(PipelineError::DownstreamUnavailable { status, .. }) => assert_eq!(status, None),
            other => panic!("expected DownstreamUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("static").join("avatar.svg");
        let artifact = AvatarArtifact {
            content_type: "image/svg+xml".to_string(),
            bytes: b"<svg/>".to_vec(),
        };
        artifact.save(&target).await.unwrap();
        assert_eq!(std::fs::read(&target).unwrap(), b"<svg/>".to_vec());
    }
}
