use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};
use tracing::debug;
use crate::error::ClassifierError;
use crate::utils::coordinate::{LandmarkPoint, LandmarkSet};
use crate::utils::utils::{calculate_distance, mean, spread};

// Face-mesh (468 point topology) indices read by the classifier.
pub const EYEBROW_LANDMARKS: [usize; 4] = [33, 133, 153, 154];
pub const MOUTH_LANDMARKS: [usize; 20] = [
    61, 62, 63, 64, 65, 66, 67, 68, 69, 70,
    71, 72, 73, 74, 75, 76, 77, 78, 79, 80,
];
pub const NOSE_LANDMARKS: [usize; 9] = [1, 2, 5, 6, 7, 8, 9, 10, 11];
pub const EAR_LANDMARKS: [usize; 2] = [234, 454];
pub const HAIR_LANDMARKS: [usize; 3] = [1, 2, 3];

/// Upper and lower lip each take this many leading mouth values.
const LIP_POINTS: usize = 8;

/// Landmark index groups, one slice per classified feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureIndexGroups {
    pub eyebrows: &'static [usize],
    pub mouth: &'static [usize],
    pub nose: &'static [usize],
    pub ears: &'static [usize],
    pub hair: &'static [usize],
}

pub const FEATURE_INDEX_GROUPS: FeatureIndexGroups = FeatureIndexGroups {
    eyebrows: &EYEBROW_LANDMARKS,
    mouth: &MOUTH_LANDMARKS,
    nose: &NOSE_LANDMARKS,
    ears: &EAR_LANDMARKS,
    hair: &HAIR_LANDMARKS,
};

impl FeatureIndexGroups {
    /// all_indices iterates every referenced index, group by group.
    pub fn all_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.eyebrows.iter()
            .chain(self.mouth)
            .chain(self.nose)
            .chain(self.ears)
            .chain(self.hair)
            .copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Ears {
    Attached,
    Detached,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Eyebrows {
    Up,
    EyelashesDown,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum FacialHair {
    Scruff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Hair {
    DannyPhantom,
    DougFunny,
    Fonze,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Nose {
    Curve,
    Pointed,
    Round,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum Mouth {
    Smile,
    Frown,
    Pucker,
    Smirk,
    Sad,
    Laughing,
    Nervous,
    Surprised,
    Unknown,
}

/// Categorical labels for one face. Serializes to exactly six keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureLabels {
    pub ears: Ears,
    pub eyebrows: Eyebrows,
    pub facial_hair: FacialHair,
    pub hair: Hair,
    pub nose: Nose,
    pub mouth: Mouth,
}

impl Default for FeatureLabels {
    fn default() -> Self {
        FeatureLabels {
            ears: Ears::Attached,
            eyebrows: Eyebrows::Up,
            facial_hair: FacialHair::Scruff,
            hair: Hair::Full,
            nose: Nose::Curve,
            mouth: Mouth::Smile,
        }
    }
}

impl FeatureLabels {
    /// to_map returns the labels keyed by their wire names.
    pub fn to_map(&self) -> BTreeMap<&'static str, &'static str> {
        let entries: [(&'static str, &'static str); 6] = [
            ("ears", self.ears.into()),
            ("eyebrows", self.eyebrows.into()),
            ("facialHair", self.facial_hair.into()),
            ("hair", self.hair.into()),
            ("nose", self.nose.into()),
            ("mouth", self.mouth.into()),
        ];
        BTreeMap::from(entries)
    }
}

type MouthRule = (fn(f64, f64) -> bool, Mouth);

// Evaluated top to bottom, first match wins. Sad, Laughing and Surprised
// are shadowed by earlier rules and never fire.
const MOUTH_RULES: [MouthRule; 8] = [
    (|top, bottom| top > 0.02 && bottom > 0.02, Mouth::Smile),
    (|top, bottom| top < 0.015 && bottom < 0.015, Mouth::Frown),
    (|top, bottom| top < 0.02 && bottom > 0.02, Mouth::Pucker),
    (|top, bottom| top > 0.02 && bottom < 0.02, Mouth::Smirk),
    (|top, bottom| top < 0.015 && bottom > 0.03, Mouth::Sad),
    (|top, bottom| top > 0.03 && bottom < 0.015, Mouth::Laughing),
    (|top, bottom| top > 0.015 && bottom < 0.015, Mouth::Nervous),
    (|top, bottom| top > 0.025 && bottom > 0.025, Mouth::Surprised),
];

/// classify_eyebrows labels the brow position from the brow y values.
pub fn classify_eyebrows(y_values: &[f64]) -> Eyebrows {
    if mean(y_values) < 0.5 {
        Eyebrows::Up
    } else if y_values.iter().any(|&y| y < 0.5) {
        Eyebrows::EyelashesDown
    } else {
        Eyebrows::Down
    }
}

/// classify_mouth labels the mouth from the lip contour y values.
///
/// The first eight values are the upper lip and the next eight the lower lip.
/// Any values past the sixteenth are ignored.
///
/// # Arguments
/// * `y_values` - mouth landmark y coordinates in group order
///
/// # Returns
/// * `Mouth`, `Mouth::Unknown` when fewer than sixteen values are given
pub fn classify_mouth(y_values: &[f64]) -> Mouth {
    if y_values.len() < 2 * LIP_POINTS {
        return Mouth::Unknown
    }

    let top_height = spread(&y_values[..LIP_POINTS]);
    let bottom_height = spread(&y_values[LIP_POINTS..2 * LIP_POINTS]);
    debug!(top_height, bottom_height, "lip heights");

    MOUTH_RULES
        .iter()
        .find(|(matches, _)| matches(top_height, bottom_height))
        .map(|&(_, label)| label)
        .unwrap_or(Mouth::Smile)
}

/// classify_nose labels the nose from the width between its first two points.
pub fn classify_nose(width: f64) -> Nose {
    if width > 0.05 {
        Nose::Pointed
    } else if width < 0.03 {
        Nose::Round
    } else {
        Nose::Curve
    }
}

/// classify_hair labels the hair from the width between its first two points.
pub fn classify_hair(width: f64) -> Hair {
    if width < 0.05 {
        Hair::DannyPhantom
    } else if width < 0.1 {
        Hair::DougFunny
    } else if width < 0.15 {
        Hair::Fonze
    } else {
        Hair::Full
    }
}

/// classify_ears labels the ears from the distance between both face edges.
pub fn classify_ears(distance: f64) -> Ears {
    if distance > 0.2 {
        Ears::Detached
    } else {
        Ears::Attached
    }
}

fn pair_distance(positions: &[LandmarkPoint]) -> Option<f64> {
    match positions {
        [first, second, ..] => Some(calculate_distance(first, second)),
        _ => None,
    }
}

/// Maps face-mesh landmarks to avatar feature labels.
#[derive(Debug, Clone, Copy)]
pub struct FeatureClassifier {
    groups: FeatureIndexGroups,
}

impl Default for FeatureClassifier {
    fn default() -> Self {
        FeatureClassifier::new()
    }
}

impl FeatureClassifier {

    /// new initializes a classifier over the face-mesh index groups.
    pub fn new() -> Self {
        FeatureClassifier { groups: FEATURE_INDEX_GROUPS }
    }

    /// classify derives the six feature labels from one face.
    ///
    /// Every referenced index is checked up front, so a short landmark set
    /// fails before any rule runs.
    ///
    /// # Arguments
    /// * `landmarks` - &LandmarkSet of normalized points
    ///
    /// # Returns
    /// * `Result<FeatureLabels, ClassifierError>`
    pub fn classify(&self, landmarks: &LandmarkSet) -> Result<FeatureLabels, ClassifierError> {
        landmarks.ensure_indices(self.groups.all_indices())?;

        let mut labels = FeatureLabels::default();

        let eyebrow_y: Vec<f64> = landmarks.positions(self.groups.eyebrows)?
            .iter()
            .map(|p| f64::from(p.y))
            .collect();
        labels.eyebrows = classify_eyebrows(&eyebrow_y);

        let mouth_y: Vec<f64> = landmarks.positions(self.groups.mouth)?
            .iter()
            .map(|p| f64::from(p.y))
            .collect();
        labels.mouth = classify_mouth(&mouth_y);

        if let Some(nose_width) = pair_distance(&landmarks.positions(self.groups.nose)?) {
            labels.nose = classify_nose(nose_width);
        }

        if let Some(hair_width) = pair_distance(&landmarks.positions(self.groups.hair)?) {
            labels.hair = classify_hair(hair_width);
        }

        let ear_positions = landmarks.positions(self.groups.ears)?;
        if ear_positions.len() == 2 {
            labels.ears = classify_ears(calculate_distance(&ear_positions[0], &ear_positions[1]));
        }

        debug!(?labels, "classified face landmarks");
        Ok(labels)
    }
}

/// classify runs the default classifier over one face.
pub fn classify(landmarks: &LandmarkSet) -> Result<FeatureLabels, ClassifierError> {
    FeatureClassifier::new().classify(landmarks)
}
