use std::collections::BTreeMap;

use tracing::info;

use crate::config::{ExerciseRules, RiskCheck, RiskRule};
use crate::models::{AngleSeries, Rep, RiskFinding};

/// Service applying per-exercise biomechanical rules to segmented reps
///
/// Rules are data (`config::rules`), so the evaluator is a fixed interpreter:
/// each rule reads one named angle series restricted to a rep's interval and
/// flags the rep or not. Flags aggregate across reps; a label only reaches
/// the output if it fired in more than the configured fraction of reps, so a
/// single noisy rep cannot dominate the result.
#[derive(Debug, Clone, Default)]
pub struct RiskEvaluationService;

impl RiskEvaluationService {
    /// Create a new RiskEvaluationService
    pub fn new() -> Self {
        Self
    }

    /// Score the reps and return the top findings, ranked by
    /// (frequency desc, severity desc), at most two labels
    pub fn evaluate(
        &self,
        reps: &[Rep],
        series: &BTreeMap<String, AngleSeries>,
        rules: &ExerciseRules,
    ) -> (f64, Vec<RiskFinding>) {
        if reps.is_empty() {
            return (10.0, Vec::new());
        }

        let mut qualifying: Vec<(RiskFinding, usize)> = Vec::new();
        for rule in &rules.risk_rules {
            let flagged = self.flagged_reps(rule, reps, series);
            let fraction = flagged.len() as f64 / reps.len() as f64;
            if fraction > rules.min_flag_fraction {
                let count = flagged.len();
                qualifying.push((
                    RiskFinding {
                        label: rule.label.to_string(),
                        correction: rule.correction.to_string(),
                        severity: rule.severity,
                        reps: flagged,
                    },
                    count,
                ));
            }
        }

        // Severity is deducted once per qualifying label, not per rep
        let penalty: f64 = qualifying.iter().map(|(f, _)| f.severity).sum();
        let score = ((10.0 - penalty).max(1.0) * 10.0).round() / 10.0;

        qualifying.sort_by(|(a, a_count), (b, b_count)| {
            b_count
                .cmp(a_count)
                .then(b.severity.total_cmp(&a.severity))
                .then(a.label.cmp(&b.label))
        });
        let findings: Vec<RiskFinding> = qualifying
            .into_iter()
            .map(|(finding, _)| finding)
            .take(2)
            .collect();

        info!(
            exercise = %rules.exercise,
            reps = reps.len(),
            score,
            findings = findings.len(),
            "form risk evaluation complete"
        );
        (score, findings)
    }

    /// Indices of the reps a rule flags
    fn flagged_reps(
        &self,
        rule: &RiskRule,
        reps: &[Rep],
        series: &BTreeMap<String, AngleSeries>,
    ) -> Vec<usize> {
        reps.iter()
            .enumerate()
            .filter(|(_, rep)| self.check_rep(&rule.check, rep, series))
            .map(|(i, _)| i)
            .collect()
    }

    fn check_rep(
        &self,
        check: &RiskCheck,
        rep: &Rep,
        series: &BTreeMap<String, AngleSeries>,
    ) -> bool {
        match check {
            RiskCheck::TroughAbove {
                series: name,
                threshold_deg,
            } => series
                .get(*name)
                .and_then(|s| s.min_in_interval(rep.start, rep.end))
                .is_some_and(|min| min > *threshold_deg),
            RiskCheck::MaxAbove {
                series: name,
                threshold_deg,
            } => series
                .get(*name)
                .and_then(|s| s.max_in_interval(rep.start, rep.end))
                .is_some_and(|max| max > *threshold_deg),
            RiskCheck::MinBelow {
                series: name,
                threshold_deg,
            } => series
                .get(*name)
                .and_then(|s| s.min_in_interval(rep.start, rep.end))
                .is_some_and(|min| min < *threshold_deg),
        }
    }
}
