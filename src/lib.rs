pub mod utils;
pub mod pipeline;
pub mod config;
pub mod error;
pub mod helper;
pub mod modules;

pub use error::{ClassifierError, PipelineError};
pub use helper::feature_helper::{classify, FeatureClassifier, FeatureLabels};
pub use pipeline::pipeline::{AvatarPipeline, AvatarResponse, AvatarResult};
pub use utils::coordinate::{LandmarkPoint, LandmarkSet};
