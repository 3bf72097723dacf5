use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named body landmarks as exported by the pose estimator (MediaPipe Pose subset)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    LeftHeel,
    RightHeel,
    LeftFootIndex,
    RightFootIndex,
}

/// A single tracked landmark position with detection confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    pub x: f64,
    pub y: f64,
    /// Depth estimate, when the pose model provides one
    pub z: Option<f64>,
    /// Detection confidence in [0, 1] (MediaPipe reports visibility)
    pub confidence: f64,
}

impl Keypoint {
    pub fn distance_to(&self, other: &Keypoint) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// One frame of the keypoint stream: a timestamp plus the landmarks detected in it
///
/// Insertion order of frames is temporal order; timestamps are non-decreasing.
/// Landmarks absent from the map are missing for that frame, never zeroed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// Seconds from the start of the clip
    pub timestamp: f64,
    pub keypoints: BTreeMap<Landmark, Keypoint>,
}

impl Frame {
    pub fn new(timestamp: f64) -> Self {
        Self {
            timestamp,
            keypoints: BTreeMap::new(),
        }
    }

    pub fn keypoint(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.keypoints.get(&landmark)
    }

    /// Whether every listed landmark is present in this frame
    pub fn has_all(&self, landmarks: &[Landmark]) -> bool {
        landmarks.iter().all(|l| self.keypoints.contains_key(l))
    }

    /// Midpoint of two landmarks, if both are present
    pub fn midpoint(&self, a: Landmark, b: Landmark) -> Option<(f64, f64)> {
        let ka = self.keypoint(a)?;
        let kb = self.keypoint(b)?;
        Some(((ka.x + kb.x) / 2.0, (ka.y + kb.y) / 2.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_serializes_snake_case() {
        let json = serde_json::to_string(&Landmark::LeftFootIndex).unwrap();
        assert_eq!(json, "\"left_foot_index\"");
        let back: Landmark = serde_json::from_str("\"right_shoulder\"").unwrap();
        assert_eq!(back, Landmark::RightShoulder);
    }

    #[test]
    fn test_midpoint_requires_both_landmarks() {
        let mut frame = Frame::new(0.0);
        frame.keypoints.insert(
            Landmark::LeftHip,
            Keypoint {
                x: 0.4,
                y: 0.5,
                z: None,
                confidence: 0.9,
            },
        );
        assert_eq!(frame.midpoint(Landmark::LeftHip, Landmark::RightHip), None);

        frame.keypoints.insert(
            Landmark::RightHip,
            Keypoint {
                x: 0.6,
                y: 0.5,
                z: None,
                confidence: 0.9,
            },
        );
        assert_eq!(
            frame.midpoint(Landmark::LeftHip, Landmark::RightHip),
            Some((0.5, 0.5))
        );
    }
}
