use serde::{Deserialize, Serialize};

/// One segmented repetition: a closed time interval within the stream
///
/// Immutable once emitted by the segmentation state machine. `end > start`,
/// and reps from the same series never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rep {
    /// Timestamp at which the descent began
    pub start: f64,
    /// Timestamp at which the angle recovered past the start threshold
    pub end: f64,
    /// Highest primary-angle value observed inside the rep
    pub peak: f64,
    /// Lowest primary-angle value observed inside the rep
    pub trough: f64,
}

impl Rep {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }

    pub fn contains(&self, timestamp: f64) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}
