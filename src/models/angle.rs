use serde::{Deserialize, Serialize};

/// One sample of a joint-angle time series
///
/// `degrees` is `None` when a required landmark was missing for the frame;
/// invalid samples are explicit, never encoded as zero or NaN.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleSample {
    pub timestamp: f64,
    pub degrees: Option<f64>,
}

impl AngleSample {
    pub fn valid(timestamp: f64, degrees: f64) -> Self {
        Self {
            timestamp,
            degrees: Some(degrees),
        }
    }

    pub fn invalid(timestamp: f64) -> Self {
        Self {
            timestamp,
            degrees: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.degrees.is_some()
    }
}

/// A named joint-angle time series derived from the keypoint stream
///
/// Owned by the angle extractor; consumed read-only downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AngleSeries {
    pub name: String,
    pub samples: Vec<AngleSample>,
}

impl AngleSeries {
    pub fn new(name: impl Into<String>, samples: Vec<AngleSample>) -> Self {
        Self {
            name: name.into(),
            samples,
        }
    }

    /// Valid samples whose timestamp falls within [start, end]
    pub fn valid_in_interval(&self, start: f64, end: f64) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples
            .iter()
            .filter(move |s| s.timestamp >= start && s.timestamp <= end)
            .filter_map(|s| s.degrees.map(|d| (s.timestamp, d)))
    }

    pub fn min_in_interval(&self, start: f64, end: f64) -> Option<f64> {
        self.valid_in_interval(start, end)
            .map(|(_, d)| d)
            .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.min(d))))
    }

    pub fn max_in_interval(&self, start: f64, end: f64) -> Option<f64> {
        self.valid_in_interval(start, end)
            .map(|(_, d)| d)
            .fold(None, |acc, d| Some(acc.map_or(d, |m: f64| m.max(d))))
    }

    /// Fraction of samples that are valid; 0.0 for an empty series
    pub fn valid_fraction(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let valid = self.samples.iter().filter(|s| s.is_valid()).count();
        valid as f64 / self.samples.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series() -> AngleSeries {
        AngleSeries::new(
            "knee_flexion",
            vec![
                AngleSample::valid(0.0, 170.0),
                AngleSample::invalid(0.1),
                AngleSample::valid(0.2, 120.0),
                AngleSample::valid(0.3, 85.0),
                AngleSample::valid(0.4, 140.0),
            ],
        )
    }

    #[test]
    fn test_interval_extrema_skip_invalid_samples() {
        let s = series();
        assert_eq!(s.min_in_interval(0.0, 0.3), Some(85.0));
        assert_eq!(s.max_in_interval(0.0, 0.3), Some(170.0));
        assert_eq!(s.min_in_interval(0.05, 0.15), None);
    }

    #[test]
    fn test_valid_fraction() {
        assert_eq!(series().valid_fraction(), 0.8);
        assert_eq!(AngleSeries::new("empty", vec![]).valid_fraction(), 0.0);
    }
}
