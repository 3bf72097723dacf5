use axum::{extract::State, response::Json};
use serde::Deserialize;
use tracing::info;

use crate::models::{AnalysisRecord, AnalysisResponse, Frame};
use crate::services::{AnalysisError, AnalysisService};

/// Request body for POST /api/analyze
///
/// `frames` is the keypoint stream the external pose estimator produced for
/// the uploaded video; `exercise` is an optional hint from the client.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub frames: Vec<Frame>,
    pub exercise: Option<String>,
}

/// Analyze a keypoint stream and return the form assessment
pub async fn analyze(
    State(service): State<AnalysisService>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalysisResponse>, AnalysisError> {
    info!(
        frames = request.frames.len(),
        hint = request.exercise.as_deref().unwrap_or("none"),
        "analysis request received"
    );

    // The core assumes frames arrive in recording order; reject streams
    // whose timestamps go backwards before they reach it
    if request
        .frames
        .windows(2)
        .any(|pair| pair[1].timestamp < pair[0].timestamp)
    {
        return Err(AnalysisError::NonMonotonicTimestamps);
    }

    let result = service.analyze(&request.frames, request.exercise.as_deref())?;

    // Key the result the way an external store would persist it
    let record = AnalysisRecord::new(result);
    info!(analysis_id = %record.id, "analysis complete");

    Ok(Json(AnalysisResponse::from(&record.result)))
}
