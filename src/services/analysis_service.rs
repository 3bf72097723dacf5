use std::sync::Arc;

use tracing::{info, warn};

use crate::config::{NormalizerConfig, RuleTable};
use crate::models::{AnalysisResult, Exercise, Frame};
use crate::services::errors::AnalysisError;
use crate::services::{
    AngleExtractionService, ExerciseDetectionService, KeypointNormalizerService,
    RepSegmentationService, RiskEvaluationService,
};

/// Orchestrator composing the analysis pipeline behind a single entry point
///
/// normalize → extract angles → segment reps → evaluate risks, short-circuiting
/// at the first failing stage. The rule table is built once and shared
/// read-only; the whole computation is pure and CPU-bound, so concurrent
/// calls need no coordination.
#[derive(Debug, Clone)]
pub struct AnalysisService {
    rules: Arc<RuleTable>,
    normalizer: KeypointNormalizerService,
    extractor: AngleExtractionService,
    segmenter: RepSegmentationService,
    evaluator: RiskEvaluationService,
    detector: ExerciseDetectionService,
}

impl AnalysisService {
    /// Create a new AnalysisService sharing the given rule table
    pub fn new(rules: Arc<RuleTable>, normalizer_config: NormalizerConfig) -> Self {
        let detector = ExerciseDetectionService::new(normalizer_config.confidence_threshold);
        Self {
            rules,
            normalizer: KeypointNormalizerService::new(normalizer_config),
            extractor: AngleExtractionService::new(),
            segmenter: RepSegmentationService::new(),
            evaluator: RiskEvaluationService::new(),
            detector,
        }
    }

    /// Analyze a keypoint stream, classifying the exercise first if no hint
    /// is given
    pub fn analyze(
        &self,
        frames: &[Frame],
        exercise_hint: Option<&str>,
    ) -> Result<AnalysisResult, AnalysisError> {
        let exercise = self.resolve_exercise(frames, exercise_hint)?;
        let rules = self
            .rules
            .get(exercise)
            .ok_or_else(|| AnalysisError::UnsupportedExercise(exercise.to_string()))?;

        let normalized = self.normalizer.normalize(frames, &rules.required_landmarks)?;
        let series = self.extractor.extract(&normalized, rules);

        let reps = match series.get(rules.primary_series) {
            Some(primary) => self.segmenter.segment(primary, &rules.segmentation),
            None => Vec::new(),
        };
        if reps.is_empty() {
            warn!(%exercise, "no repetitions segmented from the stream");
            return Err(AnalysisError::InsufficientMotion);
        }

        let (score, findings) = self.evaluator.evaluate(&reps, &series, rules);

        info!(%exercise, score, rep_count = reps.len(), "analysis complete");
        Ok(AnalysisResult {
            exercise,
            score,
            findings,
            rep_count: reps.len(),
        })
    }

    fn resolve_exercise(
        &self,
        frames: &[Frame],
        hint: Option<&str>,
    ) -> Result<Exercise, AnalysisError> {
        match hint {
            Some(name) => name
                .parse::<Exercise>()
                .map_err(AnalysisError::UnsupportedExercise),
            None => self
                .detector
                .detect(frames, &self.rules)
                .ok_or(AnalysisError::UnrecognizedExercise),
        }
    }
}

impl Default for AnalysisService {
    fn default() -> Self {
        Self::new(Arc::new(RuleTable::standard()), NormalizerConfig::default())
    }
}
