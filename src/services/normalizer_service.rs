use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::config::NormalizerConfig;
use crate::models::{Frame, Keypoint, Landmark};
use crate::services::errors::AnalysisError;

/// Tolerance under which a stream counts as already body-relative
const IDENTITY_EPSILON: f64 = 1e-9;

/// Service cleaning and aligning raw keypoint streams before angle extraction
///
/// Low-confidence keypoints are dropped (marked missing, never zeroed), short
/// gaps are bridged by linear interpolation, and coordinates are rescaled to
/// a body-relative frame so camera distance does not affect downstream
/// thresholds. The input is never mutated and the operation is idempotent.
#[derive(Debug, Clone)]
pub struct KeypointNormalizerService {
    config: NormalizerConfig,
}

impl KeypointNormalizerService {
    /// Create a new KeypointNormalizerService
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Normalize a frame sequence for the given exercise's required landmarks
    pub fn normalize(
        &self,
        frames: &[Frame],
        required: &[Landmark],
    ) -> Result<Vec<Frame>, AnalysisError> {
        if frames.is_empty() {
            warn!("normalize called with an empty frame sequence");
            return Err(AnalysisError::InsufficientKeypoints {
                visible_fraction: 0.0,
            });
        }

        let mut normalized = self.filter_by_confidence(frames);
        self.fill_gaps(&mut normalized);
        self.rescale_body_relative(&mut normalized);

        let visible = normalized
            .iter()
            .filter(|f| f.has_all(required))
            .count();
        let visible_fraction = visible as f64 / normalized.len() as f64;

        if visible_fraction < self.config.min_visible_fraction {
            warn!(
                visible_fraction,
                required = required.len(),
                "too few frames carry the required landmarks"
            );
            return Err(AnalysisError::InsufficientKeypoints { visible_fraction });
        }

        info!(
            frames = normalized.len(),
            visible_fraction, "keypoint stream normalized"
        );
        Ok(normalized)
    }

    /// Drop keypoints whose confidence is below the cutoff
    fn filter_by_confidence(&self, frames: &[Frame]) -> Vec<Frame> {
        frames
            .iter()
            .map(|frame| Frame {
                timestamp: frame.timestamp,
                keypoints: frame
                    .keypoints
                    .iter()
                    .filter(|(_, kp)| kp.confidence >= self.config.confidence_threshold)
                    .map(|(l, kp)| (*l, *kp))
                    .collect(),
            })
            .collect()
    }

    /// Bridge short per-landmark gaps by linear interpolation between the
    /// nearest valid neighbors; longer gaps stay missing
    fn fill_gaps(&self, frames: &mut [Frame]) {
        let landmarks: Vec<Landmark> = {
            let mut seen = BTreeMap::new();
            for frame in frames.iter() {
                for l in frame.keypoints.keys() {
                    seen.insert(*l, ());
                }
            }
            seen.into_keys().collect()
        };

        for landmark in landmarks {
            let present: Vec<usize> = frames
                .iter()
                .enumerate()
                .filter(|(_, f)| f.keypoints.contains_key(&landmark))
                .map(|(i, _)| i)
                .collect();

            for pair in present.windows(2) {
                let (left, right) = (pair[0], pair[1]);
                let gap = right - left - 1;
                if gap == 0 || gap > self.config.max_gap_frames {
                    continue;
                }

                let start = frames[left].keypoints[&landmark];
                let end = frames[right].keypoints[&landmark];
                for idx in (left + 1)..right {
                    let t = (idx - left) as f64 / (right - left) as f64;
                    let z = match (start.z, end.z) {
                        (Some(a), Some(b)) => Some(a + (b - a) * t),
                        _ => None,
                    };
                    frames[idx].keypoints.insert(
                        landmark,
                        Keypoint {
                            x: start.x + (end.x - start.x) * t,
                            y: start.y + (end.y - start.y) * t,
                            z,
                            confidence: start.confidence.min(end.confidence),
                        },
                    );
                }
            }
        }
    }

    /// Rescale to a body-relative frame: per-frame hip-center origin, unit
    /// length = clip-wide mean hip-to-shoulder distance
    fn rescale_body_relative(&self, frames: &mut [Frame]) {
        let mut torso_lengths = Vec::new();
        for frame in frames.iter() {
            if let (Some(hip), Some(shoulder)) = (
                frame.midpoint(Landmark::LeftHip, Landmark::RightHip),
                frame.midpoint(Landmark::LeftShoulder, Landmark::RightShoulder),
            ) {
                let len = ((hip.0 - shoulder.0).powi(2) + (hip.1 - shoulder.1).powi(2)).sqrt();
                if len > f64::EPSILON {
                    torso_lengths.push(len);
                }
            }
        }

        if torso_lengths.is_empty() {
            debug!("no frame exposes both hip and shoulder centers; skipping rescale");
            return;
        }
        let scale = torso_lengths.iter().sum::<f64>() / torso_lengths.len() as f64;

        // A stream already in body-relative coordinates passes through
        // untouched. Without this the mean scale lands within an ulp of 1.0
        // on a second pass (interpolated hips shift it) and every coordinate
        // drifts, breaking idempotence.
        let centered = frames.iter().all(|f| {
            f.midpoint(Landmark::LeftHip, Landmark::RightHip)
                .map_or(true, |(x, y)| x.abs() < IDENTITY_EPSILON && y.abs() < IDENTITY_EPSILON)
        });
        if centered && (scale - 1.0).abs() < IDENTITY_EPSILON {
            debug!("stream is already body-relative; skipping rescale");
            return;
        }

        for frame in frames.iter_mut() {
            let origin = frame
                .midpoint(Landmark::LeftHip, Landmark::RightHip)
                .unwrap_or((0.0, 0.0));
            for kp in frame.keypoints.values_mut() {
                kp.x = (kp.x - origin.0) / scale;
                kp.y = (kp.y - origin.1) / scale;
                if let Some(z) = kp.z.as_mut() {
                    *z /= scale;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kp(x: f64, y: f64, confidence: f64) -> Keypoint {
        Keypoint {
            x,
            y,
            z: None,
            confidence,
        }
    }

    fn body_frame(t: f64) -> Frame {
        let mut frame = Frame::new(t);
        frame.keypoints.insert(Landmark::LeftShoulder, kp(0.45, 0.30, 0.9));
        frame.keypoints.insert(Landmark::RightShoulder, kp(0.55, 0.30, 0.9));
        frame.keypoints.insert(Landmark::LeftHip, kp(0.45, 0.55, 0.9));
        frame.keypoints.insert(Landmark::RightHip, kp(0.55, 0.55, 0.9));
        frame
    }

    fn required() -> Vec<Landmark> {
        vec![
            Landmark::LeftShoulder,
            Landmark::RightShoulder,
            Landmark::LeftHip,
            Landmark::RightHip,
        ]
    }

    fn service() -> KeypointNormalizerService {
        KeypointNormalizerService::new(NormalizerConfig::default())
    }

    #[test]
    fn test_low_confidence_keypoints_become_missing() {
        let mut frames = vec![body_frame(0.0)];
        frames[0]
            .keypoints
            .insert(Landmark::Nose, kp(0.5, 0.1, 0.2));

        let out = service().normalize(&frames, &required()).unwrap();
        assert!(out[0].keypoint(Landmark::Nose).is_none());
        assert!(out[0].keypoint(Landmark::LeftHip).is_some());
    }

    #[test]
    fn test_short_gap_is_interpolated() {
        let mut frames: Vec<Frame> = (0..5).map(|i| body_frame(i as f64 * 0.1)).collect();
        frames[0].keypoints.insert(Landmark::Nose, kp(0.0, 0.0, 0.8));
        frames[4].keypoints.insert(Landmark::Nose, kp(0.4, 0.0, 0.8));

        let out = service().normalize(&frames, &required()).unwrap();
        let nose = out[2].keypoint(Landmark::Nose).expect("gap filled");
        // Midway between the two anchors, in body-relative units
        let expected = (out[0].keypoint(Landmark::Nose).unwrap().x
            + out[4].keypoint(Landmark::Nose).unwrap().x)
            / 2.0;
        assert!((nose.x - expected).abs() < 1e-9);
    }

    #[test]
    fn test_long_gap_stays_missing() {
        let mut frames: Vec<Frame> = (0..10).map(|i| body_frame(i as f64 * 0.1)).collect();
        frames[0].keypoints.insert(Landmark::Nose, kp(0.0, 0.0, 0.8));
        frames[9].keypoints.insert(Landmark::Nose, kp(0.4, 0.0, 0.8));

        let out = service().normalize(&frames, &required()).unwrap();
        assert!(out[5].keypoint(Landmark::Nose).is_none());
    }

    #[test]
    fn test_hip_center_becomes_origin_and_torso_unit_length() {
        let frames = vec![body_frame(0.0)];
        let out = service().normalize(&frames, &required()).unwrap();

        let (hx, hy) = out[0]
            .midpoint(Landmark::LeftHip, Landmark::RightHip)
            .unwrap();
        assert!(hx.abs() < 1e-9 && hy.abs() < 1e-9);

        let (sx, sy) = out[0]
            .midpoint(Landmark::LeftShoulder, Landmark::RightShoulder)
            .unwrap();
        let torso = (sx * sx + sy * sy).sqrt();
        assert!((torso - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let mut frames: Vec<Frame> = (0..8).map(|i| body_frame(i as f64 * 0.1)).collect();
        frames[1].keypoints.remove(&Landmark::LeftHip);
        frames[3].keypoints.insert(Landmark::Nose, kp(0.5, 0.1, 0.9));

        let svc = service();
        let once = svc.normalize(&frames, &required()).unwrap();
        let twice = svc.normalize(&once, &required()).unwrap();
        assert_eq!(once, twice);

        // The interpolated hip must not nudge the scale off 1.0 on repeat
        // passes; equality here is exact, not approximate
        let thrice = svc.normalize(&twice, &required()).unwrap();
        assert_eq!(twice, thrice);
    }

    #[test]
    fn test_insufficient_coverage_is_an_error() {
        let mut frames: Vec<Frame> = (0..10).map(|i| body_frame(i as f64 * 0.1)).collect();
        for frame in frames.iter_mut().take(8) {
            frame.keypoints.remove(&Landmark::LeftShoulder);
        }

        let err = service().normalize(&frames, &required()).unwrap_err();
        match err {
            AnalysisError::InsufficientKeypoints { visible_fraction } => {
                assert!(visible_fraction < 0.6)
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_input_frames_are_not_mutated() {
        let frames = vec![body_frame(0.0)];
        let before = frames.clone();
        let _ = service().normalize(&frames, &required()).unwrap();
        assert_eq!(frames, before);
    }
}
