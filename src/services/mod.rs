// Analysis pipeline services

pub mod analysis_service;
pub mod angle_extraction_service;
pub mod errors;
pub mod exercise_detection_service;
pub mod normalizer_service;
pub mod rep_segmentation_service;
pub mod risk_evaluation_service;

pub use analysis_service::AnalysisService;
pub use angle_extraction_service::AngleExtractionService;
pub use errors::AnalysisError;
pub use exercise_detection_service::ExerciseDetectionService;
pub use normalizer_service::KeypointNormalizerService;
pub use rep_segmentation_service::RepSegmentationService;
pub use risk_evaluation_service::RiskEvaluationService;
