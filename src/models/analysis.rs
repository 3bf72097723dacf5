use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Exercises with a configured rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Exercise {
    Squat,
    Pushup,
}

impl fmt::Display for Exercise {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exercise::Squat => write!(f, "squat"),
            Exercise::Pushup => write!(f, "pushup"),
        }
    }
}

impl FromStr for Exercise {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "squat" => Ok(Exercise::Squat),
            "pushup" | "push_up" | "push-up" => Ok(Exercise::Pushup),
            other => Err(other.to_string()),
        }
    }
}

/// A form risk detected across the analyzed reps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFinding {
    /// Fixed label from the exercise's rule set (e.g. "knees caving inward")
    pub label: String,
    /// Fixed correction text paired with the label
    pub correction: String,
    /// Score penalty applied for this finding
    pub severity: f64,
    /// Zero-based indices of the reps the risk was flagged in
    pub reps: Vec<usize>,
}

/// Terminal output of an analysis; the contract returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub exercise: Exercise,
    /// Aggregate form score in [1, 10], one decimal place
    pub score: f64,
    /// At most two findings, ordered by (frequency desc, severity desc)
    pub findings: Vec<RiskFinding>,
    pub rep_count: usize,
}

/// Wire shape of an analysis, matching the frontend contract
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub exercise: String,
    pub score: f64,
    pub risks: Vec<String>,
    pub corrections: Vec<String>,
    pub rep_count: usize,
}

impl From<&AnalysisResult> for AnalysisResponse {
    fn from(result: &AnalysisResult) -> Self {
        Self {
            exercise: result.exercise.to_string(),
            score: result.score,
            risks: result.findings.iter().map(|f| f.label.clone()).collect(),
            corrections: result
                .findings
                .iter()
                .map(|f| f.correction.clone())
                .collect(),
            rep_count: result.rep_count,
        }
    }
}

/// A persisted analysis, keyed by an opaque identifier
///
/// The core returns self-contained values; an external store may keep these.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub result: AnalysisResult,
    pub created_at: DateTime<Utc>,
}

impl AnalysisRecord {
    pub fn new(result: AnalysisResult) -> Self {
        Self {
            id: Uuid::new_v4(),
            result,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exercise_parsing() {
        assert_eq!("squat".parse::<Exercise>(), Ok(Exercise::Squat));
        assert_eq!("Push_Up".parse::<Exercise>(), Ok(Exercise::Pushup));
        assert_eq!("push-up".parse::<Exercise>(), Ok(Exercise::Pushup));
        assert_eq!("deadlift".parse::<Exercise>(), Err("deadlift".to_string()));
    }

    #[test]
    fn test_response_keeps_risks_and_corrections_paired() {
        let result = AnalysisResult {
            exercise: Exercise::Squat,
            score: 7.5,
            findings: vec![
                RiskFinding {
                    label: "knees caving inward".to_string(),
                    correction: "Push your knees out over your toes.".to_string(),
                    severity: 2.0,
                    reps: vec![0, 2],
                },
                RiskFinding {
                    label: "insufficient depth".to_string(),
                    correction: "Sink your hips until your thighs reach parallel.".to_string(),
                    severity: 1.5,
                    reps: vec![1],
                },
            ],
            rep_count: 3,
        };

        let response = AnalysisResponse::from(&result);
        assert_eq!(response.exercise, "squat");
        assert_eq!(response.risks.len(), response.corrections.len());
        assert_eq!(response.risks[0], "knees caving inward");
        assert_eq!(response.corrections[1], "Sink your hips until your thighs reach parallel.");
    }
}
