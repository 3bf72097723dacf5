use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Recoverable analysis failures, each tied to the pipeline stage that raised it
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("normalizer: only {visible_fraction:.2} of frames carry the required landmarks")]
    InsufficientKeypoints { visible_fraction: f64 },
    #[error("evaluator: no rule set configured for exercise '{0}'")]
    UnsupportedExercise(String),
    #[error("classifier: motion pattern did not match any supported exercise")]
    UnrecognizedExercise,
    #[error("segmentation: no repetitions detected in the stream")]
    InsufficientMotion,
    #[error("api: frame timestamps are not in non-decreasing order")]
    NonMonotonicTimestamps,
}

// User-facing messages stay free of internal thresholds; the Display impl
// above carries the diagnostic detail for logs.
impl IntoResponse for AnalysisError {
    fn into_response(self) -> Response {
        let message = match &self {
            AnalysisError::InsufficientKeypoints { .. } => {
                "Could not see enough of your body. Please re-record with your full body clearly in frame."
            }
            AnalysisError::UnsupportedExercise(_) | AnalysisError::UnrecognizedExercise => {
                "This exercise isn't supported yet."
            }
            AnalysisError::InsufficientMotion => {
                "No repetitions detected. Try performing the exercise more clearly."
            }
            AnalysisError::NonMonotonicTimestamps => {
                "Frame timestamps must not decrease. Please send frames in recording order."
            }
        };

        let body = Json(json!({
            "error": message,
        }));

        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_the_failing_stage() {
        let err = AnalysisError::InsufficientKeypoints {
            visible_fraction: 0.25,
        };
        assert!(err.to_string().starts_with("normalizer:"));
        assert!(AnalysisError::InsufficientMotion
            .to_string()
            .starts_with("segmentation:"));
        assert!(AnalysisError::NonMonotonicTimestamps
            .to_string()
            .starts_with("api:"));
    }

    #[test]
    fn test_user_message_does_not_leak_thresholds() {
        let response = AnalysisError::InsufficientKeypoints {
            visible_fraction: 0.25,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
