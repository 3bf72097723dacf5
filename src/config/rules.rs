use std::collections::BTreeMap;

use crate::models::{Exercise, Landmark};

/// How a derived angle series is computed from the normalized keypoints
///
/// Each definition yields a `left_*` and `right_*` series plus a combined
/// series under the bare name (side mean for joint angles, worst side for
/// frontal tilts).
#[derive(Debug, Clone)]
pub enum AngleDef {
    /// Interior angle at the middle landmark, per body side
    Joint {
        name: &'static str,
        left: [Landmark; 3],
        right: [Landmark; 3],
    },
    /// Inward tilt of the lower→upper segment away from vertical, per side.
    /// "Inward" is toward the hip center, so outward lean reads as zero.
    FrontalTilt {
        name: &'static str,
        left: (Landmark, Landmark),
        right: (Landmark, Landmark),
    },
}

impl AngleDef {
    pub fn name(&self) -> &'static str {
        match self {
            AngleDef::Joint { name, .. } => name,
            AngleDef::FrontalTilt { name, .. } => name,
        }
    }
}

/// Predicate a risk rule applies to one rep's slice of a named series
#[derive(Debug, Clone)]
pub enum RiskCheck {
    /// The lowest angle in the rep never got below the threshold
    TroughAbove {
        series: &'static str,
        threshold_deg: f64,
    },
    /// The highest angle in the rep exceeded the threshold
    MaxAbove {
        series: &'static str,
        threshold_deg: f64,
    },
    /// The lowest angle in the rep dropped below the threshold
    MinBelow {
        series: &'static str,
        threshold_deg: f64,
    },
}

/// One biomechanical rule: a fixed label, its correction text, and a penalty
#[derive(Debug, Clone)]
pub struct RiskRule {
    pub label: &'static str,
    pub correction: &'static str,
    pub severity: f64,
    pub check: RiskCheck,
}

/// Thresholds driving the rep segmentation state machine
#[derive(Debug, Clone, Copy)]
pub struct SegmentationConfig {
    /// Crossing below this starts a descent
    pub descent_threshold_deg: f64,
    /// Crossing back above this closes the rep (hysteresis when distinct)
    pub ascent_threshold_deg: f64,
    /// At or below this the movement counts as having reached the bottom
    pub depth_threshold_deg: f64,
    /// Consecutive valid samples required to confirm a transition
    pub debounce_samples: usize,
    /// Invalid-sample run length that aborts an in-progress rep
    pub invalid_tolerance: usize,
}

/// Tunables for the keypoint stream normalizer
#[derive(Debug, Clone, Copy)]
pub struct NormalizerConfig {
    /// Keypoints below this confidence are treated as missing
    pub confidence_threshold: f64,
    /// Longest landmark gap (in frames) bridged by linear interpolation
    pub max_gap_frames: usize,
    /// Minimum fraction of frames carrying all required landmarks
    pub min_visible_fraction: f64,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.5,
            max_gap_frames: 5,
            min_visible_fraction: 0.6,
        }
    }
}

/// The full immutable rule set for one exercise
#[derive(Debug, Clone)]
pub struct ExerciseRules {
    pub exercise: Exercise,
    /// Landmarks the normalizer must find in enough frames
    pub required_landmarks: Vec<Landmark>,
    pub angles: Vec<AngleDef>,
    /// Name of the combined series the rep state machine runs on
    pub primary_series: &'static str,
    pub segmentation: SegmentationConfig,
    pub risk_rules: Vec<RiskRule>,
    /// A rule's label qualifies only if flagged in more than this fraction of reps
    pub min_flag_fraction: f64,
    /// Landmark pair whose midpoint's vertical travel indicates this exercise
    /// to the hint-absent classifier
    pub indicator_pair: (Landmark, Landmark),
    /// Raw-coordinate vertical travel at which the indicator saturates
    pub min_indicator_travel: f64,
}

/// Mapping from exercise to its rule set, built once at startup and shared
/// read-only across requests
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: BTreeMap<Exercise, ExerciseRules>,
}

impl RuleTable {
    /// The standard squat and pushup rule sets
    pub fn standard() -> Self {
        let mut rules = BTreeMap::new();
        rules.insert(Exercise::Squat, squat_rules());
        rules.insert(Exercise::Pushup, pushup_rules());
        Self { rules }
    }

    pub fn get(&self, exercise: Exercise) -> Option<&ExerciseRules> {
        self.rules.get(&exercise)
    }

    pub fn supported(&self) -> impl Iterator<Item = Exercise> + '_ {
        self.rules.keys().copied()
    }
}

fn squat_rules() -> ExerciseRules {
    use Landmark::*;

    ExerciseRules {
        exercise: Exercise::Squat,
        required_landmarks: vec![
            LeftShoulder,
            RightShoulder,
            LeftHip,
            RightHip,
            LeftKnee,
            RightKnee,
            LeftAnkle,
            RightAnkle,
        ],
        angles: vec![
            AngleDef::Joint {
                name: "knee_flexion",
                left: [LeftHip, LeftKnee, LeftAnkle],
                right: [RightHip, RightKnee, RightAnkle],
            },
            AngleDef::Joint {
                name: "torso_lean",
                left: [LeftShoulder, LeftHip, LeftKnee],
                right: [RightShoulder, RightHip, RightKnee],
            },
            AngleDef::FrontalTilt {
                name: "knee_valgus",
                left: (LeftKnee, LeftAnkle),
                right: (RightKnee, RightAnkle),
            },
        ],
        primary_series: "knee_flexion",
        segmentation: SegmentationConfig {
            descent_threshold_deg: 150.0,
            ascent_threshold_deg: 150.0,
            depth_threshold_deg: 110.0,
            debounce_samples: 3,
            invalid_tolerance: 10,
        },
        risk_rules: vec![
            RiskRule {
                label: "knees caving inward",
                correction: "Push your knees out in line with your toes as you descend.",
                severity: 2.0,
                check: RiskCheck::MaxAbove {
                    series: "knee_valgus",
                    threshold_deg: 12.0,
                },
            },
            RiskRule {
                label: "insufficient depth",
                correction: "Sink your hips until your thighs reach parallel before driving back up.",
                severity: 1.5,
                check: RiskCheck::TroughAbove {
                    series: "knee_flexion",
                    threshold_deg: 100.0,
                },
            },
            RiskRule {
                label: "excessive forward lean",
                correction: "Keep your chest up and core braced instead of folding over your thighs.",
                severity: 1.5,
                check: RiskCheck::MinBelow {
                    series: "torso_lean",
                    threshold_deg: 60.0,
                },
            },
        ],
        min_flag_fraction: 0.3,
        indicator_pair: (LeftHip, RightHip),
        min_indicator_travel: 0.1,
    }
}

fn pushup_rules() -> ExerciseRules {
    use Landmark::*;

    ExerciseRules {
        exercise: Exercise::Pushup,
        required_landmarks: vec![
            LeftShoulder,
            RightShoulder,
            LeftElbow,
            RightElbow,
            LeftWrist,
            RightWrist,
            LeftHip,
            RightHip,
            LeftAnkle,
            RightAnkle,
        ],
        angles: vec![
            AngleDef::Joint {
                name: "elbow_flexion",
                left: [LeftShoulder, LeftElbow, LeftWrist],
                right: [RightShoulder, RightElbow, RightWrist],
            },
            AngleDef::Joint {
                name: "body_line",
                left: [LeftShoulder, LeftHip, LeftAnkle],
                right: [RightShoulder, RightHip, RightAnkle],
            },
            AngleDef::Joint {
                name: "elbow_flare",
                left: [LeftHip, LeftShoulder, LeftElbow],
                right: [RightHip, RightShoulder, RightElbow],
            },
        ],
        primary_series: "elbow_flexion",
        segmentation: SegmentationConfig {
            descent_threshold_deg: 140.0,
            ascent_threshold_deg: 140.0,
            depth_threshold_deg: 110.0,
            debounce_samples: 3,
            invalid_tolerance: 10,
        },
        risk_rules: vec![
            RiskRule {
                label: "sagging hips",
                correction: "Squeeze your glutes and brace your abs to hold a straight line from shoulders to heels.",
                severity: 2.0,
                check: RiskCheck::MinBelow {
                    series: "body_line",
                    threshold_deg: 150.0,
                },
            },
            RiskRule {
                label: "insufficient depth",
                correction: "Lower your chest until your elbows bend past ninety degrees.",
                severity: 1.5,
                check: RiskCheck::TroughAbove {
                    series: "elbow_flexion",
                    threshold_deg: 110.0,
                },
            },
            RiskRule {
                label: "flared elbows",
                correction: "Tuck your elbows closer to your ribcage on the way down.",
                severity: 1.0,
                check: RiskCheck::MaxAbove {
                    series: "elbow_flare",
                    threshold_deg: 80.0,
                },
            },
        ],
        min_flag_fraction: 0.3,
        indicator_pair: (LeftShoulder, RightShoulder),
        min_indicator_travel: 0.05,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_table_covers_squat_and_pushup_only() {
        let table = RuleTable::standard();
        assert!(table.get(Exercise::Squat).is_some());
        assert!(table.get(Exercise::Pushup).is_some());
        assert_eq!(table.supported().count(), 2);
    }

    #[test]
    fn test_every_rule_reads_a_defined_series() {
        let table = RuleTable::standard();
        for exercise in [Exercise::Squat, Exercise::Pushup] {
            let rules = table.get(exercise).unwrap();
            let names: Vec<&str> = rules.angles.iter().map(|a| a.name()).collect();
            assert!(names.contains(&rules.primary_series));
            for rule in &rules.risk_rules {
                let series = match &rule.check {
                    RiskCheck::TroughAbove { series, .. }
                    | RiskCheck::MaxAbove { series, .. }
                    | RiskCheck::MinBelow { series, .. } => series,
                };
                assert!(names.contains(series), "rule {} reads unknown series {}", rule.label, series);
            }
        }
    }
}
