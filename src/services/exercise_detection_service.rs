use tracing::{debug, info};

use crate::config::RuleTable;
use crate::models::{Exercise, Frame};

/// Minimum pattern score before a detection is trusted
const ACCEPTANCE_SCORE: f64 = 0.6;

/// Heuristic classifier used when the caller supplies no exercise hint
///
/// Scores each configured exercise on raw (pre-normalization) frames from two
/// signals: how often its required landmarks are visible, and how much gross
/// vertical travel its indicator joints show (hip drop for squats, shoulder
/// drop for pushups). The best-scoring exercise wins only if it clears the
/// acceptance score; otherwise the motion is unrecognized.
#[derive(Debug, Clone)]
pub struct ExerciseDetectionService {
    confidence_threshold: f64,
}

impl ExerciseDetectionService {
    /// Create a new ExerciseDetectionService
    pub fn new(confidence_threshold: f64) -> Self {
        Self {
            confidence_threshold,
        }
    }

    /// Pick the most likely configured exercise, or None if nothing matches
    pub fn detect(&self, frames: &[Frame], table: &RuleTable) -> Option<Exercise> {
        if frames.is_empty() {
            return None;
        }

        let mut best: Option<(Exercise, f64)> = None;
        for exercise in table.supported() {
            let rules = table.get(exercise)?;
            let visibility = self.visibility_share(frames, rules);
            let motion = self.motion_share(frames, rules);
            let score = visibility * 0.5 + motion * 0.5;
            debug!(%exercise, visibility, motion, score, "exercise pattern score");

            if best.map_or(true, |(_, s)| score > s) {
                best = Some((exercise, score));
            }
        }

        match best {
            Some((exercise, score)) if score > ACCEPTANCE_SCORE => {
                info!(%exercise, score, "exercise detected from motion pattern");
                Some(exercise)
            }
            _ => None,
        }
    }

    /// Fraction of frames where every required landmark is confidently visible
    fn visibility_share(&self, frames: &[Frame], rules: &crate::config::ExerciseRules) -> f64 {
        let visible = frames
            .iter()
            .filter(|frame| {
                rules.required_landmarks.iter().all(|l| {
                    frame
                        .keypoint(*l)
                        .is_some_and(|kp| kp.confidence >= self.confidence_threshold)
                })
            })
            .count();
        visible as f64 / frames.len() as f64
    }

    /// Vertical travel of the indicator midpoint, saturating at the
    /// exercise's expected travel
    fn motion_share(&self, frames: &[Frame], rules: &crate::config::ExerciseRules) -> f64 {
        let (a, b) = rules.indicator_pair;
        let heights: Vec<f64> = frames
            .iter()
            .filter_map(|frame| frame.midpoint(a, b).map(|(_, y)| y))
            .collect();
        if heights.len() < 2 {
            return 0.0;
        }

        let max = heights.iter().cloned().fold(f64::MIN, f64::max);
        let min = heights.iter().cloned().fold(f64::MAX, f64::min);
        ((max - min) / rules.min_indicator_travel).min(1.0)
    }
}
