use nalgebra::Vector2;
use crate::utils::coordinate::LandmarkPoint;

/// calculate_distance returns the euclidean distance between two points,
/// computed in double precision.
pub fn calculate_distance(p1: &LandmarkPoint, p2: &LandmarkPoint) -> f64 {
    let a = Vector2::new(f64::from(p1.x), f64::from(p1.y));
    let b = Vector2::new(f64::from(p2.x), f64::from(p2.y));
    (a - b).norm()
}

/// mean returns the arithmetic mean, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// spread returns `max - min` of the values, 0.0 for an empty slice.
pub fn spread(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0
    }
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    max - min
}
