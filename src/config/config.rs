use std::path::{Path, PathBuf};
use anyhow::{Context, Error};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AvatarGeneratorConfig {
    pub base_url: String,
    pub size: u32,
    pub timeout: u64,
}

impl AvatarGeneratorConfig {
    pub fn new() -> Self {
        AvatarGeneratorConfig {
            base_url: "https://api.dicebear.com/9.x/micah/svg".to_string(),
            size: 96,
            timeout: 20,
        }
    }
}

impl Default for AvatarGeneratorConfig {
    fn default() -> Self {
        AvatarGeneratorConfig::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandmarkDetectorConfig {
    pub endpoint: String,
    pub timeout: u64,
    pub expected_landmarks: usize,
}

impl LandmarkDetectorConfig {
    pub fn new() -> Self {
        LandmarkDetectorConfig {
            endpoint: "http://127.0.0.1:8500/v1/face-mesh".to_string(),
            timeout: 20,
            expected_landmarks: 468,
        }
    }
}

impl Default for LandmarkDetectorConfig {
    fn default() -> Self {
        LandmarkDetectorConfig::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    pub avatar: AvatarGeneratorConfig,
    pub detector: LandmarkDetectorConfig,
    pub output_path: PathBuf,
}

impl PipelineConfig {
    pub fn new() -> Self {
        PipelineConfig {
            avatar: AvatarGeneratorConfig::new(),
            detector: LandmarkDetectorConfig::new(),
            output_path: PathBuf::from("static/avatar.svg"),
        }
    }

    /// from_json_file loads the configuration, filling absent keys with defaults.
    ///
    /// # Arguments
    /// * `path` - path of a JSON configuration file
    ///
    /// # Returns
    /// * `Result<PipelineConfig, Error>`
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(config)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        PipelineConfig::new()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;
    use crate::config::config::{AvatarGeneratorConfig, PipelineConfig};

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::new();
        assert_eq!(config.avatar.size, 96);
        assert_eq!(config.avatar.base_url, "https://api.dicebear.com/9.x/micah/svg");
        assert_eq!(config.detector.expected_landmarks, 468);
        assert_eq!(config.output_path, PathBuf::from("static/avatar.svg"));
    }

    #[test]
    fn test_partial_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"avatar":{{"size":128}},"output_path":"out/me.svg"}}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.avatar, AvatarGeneratorConfig { size: 128, ..AvatarGeneratorConfig::new() });
        assert_eq!(config.detector, PipelineConfig::new().detector);
        assert_eq!(config.output_path, PathBuf::from("out/me.svg"));
    }

    #[test]
    fn test_invalid_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(PipelineConfig::from_json_file(file.path()).is_err());
        assert!(PipelineConfig::from_json_file("/nonexistent/config.json").is_err());
    }
}
