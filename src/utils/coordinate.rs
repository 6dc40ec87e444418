use ndarray::{Array2, ArrayView1, Axis};
use serde::{Deserialize, Serialize};
use crate::error::ClassifierError;

/// A normalized image-plane point. Extra keys such as `z` are ignored on decode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32) -> Self {
        LandmarkPoint { x, y }
    }
}

/// Ordered landmark points of one detected face, stored as an (N, 2) matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<LandmarkPoint>", into = "Vec<LandmarkPoint>")]
pub struct LandmarkSet {
    points: Array2<f32>,
}

impl LandmarkSet {

    /// new builds a landmark set from points in detector order.
    pub fn new(points: &[LandmarkPoint]) -> Self {
        let points = Array2::from_shape_fn((points.len(), 2), |(row, col)| {
            if col == 0 { points[row].x } else { points[row].y }
        });
        LandmarkSet { points }
    }

    /// from_array wraps an existing matrix of `x, y` rows.
    ///
    /// # Arguments
    /// * `points` - Array2<f32> with exactly two columns
    ///
    /// # Returns
    /// * `Result<LandmarkSet, ClassifierError>`
    pub fn from_array(points: Array2<f32>) -> Result<Self, ClassifierError> {
        let (rows, cols) = points.dim();
        if cols != 2 {
            return Err(ClassifierError::InvalidShape { rows, cols })
        }
        Ok(LandmarkSet { points })
    }

    pub fn len(&self) -> usize {
        self.points.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.points.nrows() == 0
    }

    /// point returns the landmark stored at `index`.
    pub fn point(&self, index: usize) -> Result<LandmarkPoint, ClassifierError> {
        if index >= self.len() {
            return Err(ClassifierError::IndexOutOfRange { index, len: self.len() })
        }
        Ok(row_to_point(self.points.row(index)))
    }

    /// ensure_indices fails on the first index that is not present in the set.
    pub fn ensure_indices<I>(&self, indices: I) -> Result<(), ClassifierError>
    where
        I: IntoIterator<Item = usize>,
    {
        let len = self.len();
        match indices.into_iter().find(|&index| index >= len) {
            Some(index) => Err(ClassifierError::IndexOutOfRange { index, len }),
            None => Ok(()),
        }
    }

    /// positions gathers the points for a group of indices, in group order.
    pub fn positions(&self, indices: &[usize]) -> Result<Vec<LandmarkPoint>, ClassifierError> {
        indices.iter().map(|&index| self.point(index)).collect()
    }
}

fn row_to_point(row: ArrayView1<'_, f32>) -> LandmarkPoint {
    LandmarkPoint { x: row[0], y: row[1] }
}

impl From<Vec<LandmarkPoint>> for LandmarkSet {
    fn from(points: Vec<LandmarkPoint>) -> Self {
        LandmarkSet::new(&points)
    }
}

impl From<LandmarkSet> for Vec<LandmarkPoint> {
    fn from(set: LandmarkSet) -> Self {
        set.points.axis_iter(Axis(0)).map(row_to_point).collect()
    }
}

/// Payload returned by a remote face-mesh service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMeshResponse {
    #[serde(default)]
    pub faces: Vec<FaceMesh>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaceMesh {
    pub landmarks: LandmarkSet,
}
