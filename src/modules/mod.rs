pub mod avatar_client;
pub mod landmark_detector;
