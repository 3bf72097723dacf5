// Synthetic keypoint stream generators shared by the integration tests
#![allow(dead_code)]

use std::f64::consts::TAU;

use gymform::models::{Frame, Keypoint, Landmark};

/// Tunable stick-figure squat generator
///
/// Builds a side-view skeleton whose hip-knee-ankle angle follows a cosine
/// between `high_deg` and `low_deg`. Geometry is exact: the knee flexion
/// angle extracted from the frames equals the requested angle (before any
/// optional valgus or lean perturbation).
pub struct SquatSequence {
    pub cycles: usize,
    pub frames_per_cycle: usize,
    pub high_deg: f64,
    pub low_deg: f64,
    pub fps: f64,
    /// Inward knee shift (raw units) applied in proportion to depth
    pub valgus_shift: f64,
    /// Forward torso lean (degrees from vertical) applied in proportion to depth
    pub max_lean_deg: f64,
}

impl Default for SquatSequence {
    fn default() -> Self {
        Self {
            cycles: 3,
            frames_per_cycle: 100,
            high_deg: 170.0,
            low_deg: 80.0,
            fps: 30.0,
            valgus_shift: 0.0,
            max_lean_deg: 0.0,
        }
    }
}

impl SquatSequence {
    pub fn frames(&self) -> Vec<Frame> {
        let total = self.cycles * self.frames_per_cycle + 1;
        let mid = (self.high_deg + self.low_deg) / 2.0;
        let amp = (self.high_deg - self.low_deg) / 2.0;

        (0..total)
            .map(|i| {
                let phase = i as f64 / self.frames_per_cycle as f64 * TAU;
                let knee_deg = mid + amp * phase.cos();
                let depth_factor = (self.high_deg - knee_deg) / (self.high_deg - self.low_deg);
                self.frame(i as f64 / self.fps, knee_deg, depth_factor)
            })
            .collect()
    }

    fn frame(&self, timestamp: f64, knee_deg: f64, depth_factor: f64) -> Frame {
        let theta = knee_deg.to_radians();

        // Ankle fixed, knee stacked above it; hip set so the interior
        // hip-knee-ankle angle equals knee_deg (image y grows downward)
        let ankle = (0.50, 0.90);
        let knee = (0.50, 0.70);
        let hip = (
            knee.0 - 0.20 * theta.sin(),
            knee.1 + 0.20 * theta.cos(),
        );

        let lean = (self.max_lean_deg * depth_factor).to_radians();
        let shoulder = (hip.0 + 0.30 * lean.sin(), hip.1 - 0.30 * lean.cos());

        let knee_x = knee.0 - self.valgus_shift * depth_factor;

        let mut frame = Frame::new(timestamp);
        let mut put = |l: Landmark, x: f64, y: f64| {
            frame.keypoints.insert(
                l,
                Keypoint {
                    x,
                    y,
                    z: None,
                    confidence: 1.0,
                },
            );
        };

        put(Landmark::LeftShoulder, shoulder.0 + 0.01, shoulder.1);
        put(Landmark::RightShoulder, shoulder.0 - 0.01, shoulder.1);
        put(Landmark::LeftHip, hip.0 + 0.01, hip.1);
        put(Landmark::RightHip, hip.0 - 0.01, hip.1);
        put(Landmark::LeftKnee, knee_x + 0.01, knee.1);
        put(Landmark::RightKnee, knee_x - 0.01, knee.1);
        put(Landmark::LeftAnkle, ankle.0 + 0.01, ankle.1);
        put(Landmark::RightAnkle, ankle.0 - 0.01, ankle.1);
        frame
    }
}

/// A clean three-rep squat clip, roughly ten seconds at 30 fps
pub fn clean_squat() -> Vec<Frame> {
    SquatSequence::default().frames()
}
