use std::collections::BTreeMap;

use tracing::info;

use crate::config::{AngleDef, ExerciseRules};
use crate::models::{AngleSample, AngleSeries, Frame, Keypoint, Landmark};

/// Service deriving joint-angle time series from normalized keypoint frames
///
/// Pure and stateless: the output is a function of the input frames and the
/// exercise's angle definitions alone. Each definition yields `left_*` and
/// `right_*` series plus a combined series under the bare name: the side
/// mean for joint angles, the worst side for frontal tilts. Frames missing a
/// required landmark produce explicitly invalid samples.
#[derive(Debug, Clone, Default)]
pub struct AngleExtractionService;

impl AngleExtractionService {
    /// Create a new AngleExtractionService
    pub fn new() -> Self {
        Self
    }

    /// Extract every angle series the exercise's rule set defines
    pub fn extract(
        &self,
        frames: &[Frame],
        rules: &ExerciseRules,
    ) -> BTreeMap<String, AngleSeries> {
        let mut out = BTreeMap::new();

        for def in &rules.angles {
            let (left, right, combined) = match def {
                AngleDef::Joint { left, right, .. } => self.joint_series(frames, left, right),
                AngleDef::FrontalTilt { left, right, .. } => {
                    self.frontal_tilt_series(frames, *left, *right)
                }
            };

            out.insert(
                format!("left_{}", def.name()),
                AngleSeries::new(format!("left_{}", def.name()), left),
            );
            out.insert(
                format!("right_{}", def.name()),
                AngleSeries::new(format!("right_{}", def.name()), right),
            );
            out.insert(
                def.name().to_string(),
                AngleSeries::new(def.name(), combined),
            );
        }

        info!(
            exercise = %rules.exercise,
            series = out.len(),
            frames = frames.len(),
            "angle series extracted"
        );
        out
    }

    fn joint_series(
        &self,
        frames: &[Frame],
        left: &[Landmark; 3],
        right: &[Landmark; 3],
    ) -> (Vec<AngleSample>, Vec<AngleSample>, Vec<AngleSample>) {
        let mut l_samples = Vec::with_capacity(frames.len());
        let mut r_samples = Vec::with_capacity(frames.len());
        let mut combined = Vec::with_capacity(frames.len());

        for frame in frames {
            let l = self.joint_angle(frame, left);
            let r = self.joint_angle(frame, right);

            l_samples.push(to_sample(frame.timestamp, l));
            r_samples.push(to_sample(frame.timestamp, r));
            combined.push(to_sample(frame.timestamp, mean_of_sides(l, r)));
        }

        (l_samples, r_samples, combined)
    }

    fn frontal_tilt_series(
        &self,
        frames: &[Frame],
        left: (Landmark, Landmark),
        right: (Landmark, Landmark),
    ) -> (Vec<AngleSample>, Vec<AngleSample>, Vec<AngleSample>) {
        let mut l_samples = Vec::with_capacity(frames.len());
        let mut r_samples = Vec::with_capacity(frames.len());
        let mut combined = Vec::with_capacity(frames.len());

        for frame in frames {
            let l = self.inward_tilt(frame, left.0, left.1);
            let r = self.inward_tilt(frame, right.0, right.1);

            l_samples.push(to_sample(frame.timestamp, l));
            r_samples.push(to_sample(frame.timestamp, r));
            combined.push(to_sample(frame.timestamp, max_of_sides(l, r)));
        }

        (l_samples, r_samples, combined)
    }

    /// Interior angle at the middle landmark, in degrees [0, 180]
    fn joint_angle(&self, frame: &Frame, triple: &[Landmark; 3]) -> Option<f64> {
        let a = frame.keypoint(triple[0])?;
        let vertex = frame.keypoint(triple[1])?;
        let c = frame.keypoint(triple[2])?;
        angle_between(a, vertex, c)
    }

    /// Tilt of the lower→upper segment from vertical toward the body midline,
    /// in degrees [0, 90]; outward lean reads as zero
    fn inward_tilt(&self, frame: &Frame, upper: Landmark, lower: Landmark) -> Option<f64> {
        let up = frame.keypoint(upper)?;
        let low = frame.keypoint(lower)?;
        let (hip_x, _) = frame.midpoint(Landmark::LeftHip, Landmark::RightHip)?;

        // Image y grows downward, so the upper joint sits at the smaller y
        let vertical = low.y - up.y;
        if vertical <= f64::EPSILON {
            return None;
        }

        let inward_sign = (hip_x - low.x).signum();
        let inward = (up.x - low.x) * inward_sign;
        let tilt = inward.atan2(vertical).to_degrees();
        Some(tilt.clamp(0.0, 90.0))
    }
}

/// Angle between the vectors vertex→a and vertex→c via the dot-product
/// relation, clamped into the valid arccos domain
pub fn angle_between(a: &Keypoint, vertex: &Keypoint, c: &Keypoint) -> Option<f64> {
    let v1 = (a.x - vertex.x, a.y - vertex.y);
    let v2 = (c.x - vertex.x, c.y - vertex.y);

    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1).sqrt();
    if mag1 <= f64::EPSILON || mag2 <= f64::EPSILON {
        return None;
    }

    let cos = ((v1.0 * v2.0 + v1.1 * v2.1) / (mag1 * mag2)).clamp(-1.0, 1.0);
    Some(cos.acos().to_degrees())
}

fn to_sample(timestamp: f64, degrees: Option<f64>) -> AngleSample {
    match degrees {
        Some(d) => AngleSample::valid(timestamp, d),
        None => AngleSample::invalid(timestamp),
    }
}

fn mean_of_sides(l: Option<f64>, r: Option<f64>) -> Option<f64> {
    match (l, r) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}

fn max_of_sides(l: Option<f64>, r: Option<f64>) -> Option<f64> {
    match (l, r) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(a), None) | (None, Some(a)) => Some(a),
        (None, None) => None,
    }
}
