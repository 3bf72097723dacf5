use tracing::{debug, info};

use crate::config::SegmentationConfig;
use crate::models::{AngleSeries, Rep};

/// Phases of one repetition, driven by the primary angle series
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    WaitingForStart,
    Descending,
    Bottom,
    Ascending,
}

/// Service segmenting a primary joint-angle series into discrete repetitions
///
/// A debounced threshold state machine with hysteresis: descent must be
/// sustained for `debounce_samples` valid samples before a rep opens, and the
/// rep closes only when the angle recovers past the ascent threshold. This
/// keeps keypoint jitter near a threshold from double-counting reps, which
/// naive peak detection on the raw series cannot guarantee.
#[derive(Debug, Clone, Default)]
pub struct RepSegmentationService;

impl RepSegmentationService {
    /// Create a new RepSegmentationService
    pub fn new() -> Self {
        Self
    }

    /// Segment the series into completed, non-overlapping reps
    ///
    /// A stream ending mid-rep discards the partial rep. Invalid samples are
    /// skipped for transition decisions; an invalid run longer than the
    /// configured tolerance aborts the in-progress rep unemitted.
    pub fn segment(&self, series: &AngleSeries, config: &SegmentationConfig) -> Vec<Rep> {
        let mut reps = Vec::new();
        let mut machine = RepMachine::new(config);

        for sample in &series.samples {
            match sample.degrees {
                Some(degrees) => {
                    if let Some(rep) = machine.on_valid(sample.timestamp, degrees) {
                        reps.push(rep);
                    }
                }
                None => machine.on_invalid(),
            }
        }

        if machine.phase != Phase::WaitingForStart {
            debug!("stream ended mid-rep; partial rep discarded");
        }

        info!(
            series = %series.name,
            reps = reps.len(),
            "rep segmentation complete"
        );
        reps
    }
}

struct RepMachine<'a> {
    config: &'a SegmentationConfig,
    phase: Phase,
    /// A descent may only start after the angle has been seen above the
    /// descent threshold
    armed: bool,
    /// Consecutive below-descent-threshold samples while waiting
    descend_run: usize,
    /// Consecutive rising samples above the depth threshold at the bottom
    ascend_run: usize,
    invalid_run: usize,
    last_valid: Option<f64>,
    rep_start: f64,
    peak: f64,
    trough: f64,
}

impl<'a> RepMachine<'a> {
    fn new(config: &'a SegmentationConfig) -> Self {
        Self {
            config,
            phase: Phase::WaitingForStart,
            armed: false,
            descend_run: 0,
            ascend_run: 0,
            invalid_run: 0,
            last_valid: None,
            rep_start: 0.0,
            peak: 0.0,
            trough: 0.0,
        }
    }

    fn on_valid(&mut self, timestamp: f64, degrees: f64) -> Option<Rep> {
        self.invalid_run = 0;
        let prev = self.last_valid.replace(degrees);

        match self.phase {
            Phase::WaitingForStart => {
                self.waiting(timestamp, degrees);
                None
            }
            Phase::Descending => {
                self.track_extremes(degrees);
                if degrees <= self.config.depth_threshold_deg
                    || prev.is_some_and(|p| degrees > p)
                {
                    self.phase = Phase::Bottom;
                    self.ascend_run = 0;
                }
                None
            }
            Phase::Bottom => {
                self.track_extremes(degrees);
                if degrees > self.config.depth_threshold_deg && prev.is_some_and(|p| degrees >= p)
                {
                    self.ascend_run += 1;
                    if self.ascend_run >= self.config.debounce_samples {
                        self.phase = Phase::Ascending;
                    }
                } else {
                    self.ascend_run = 0;
                }
                None
            }
            Phase::Ascending => {
                self.track_extremes(degrees);
                if degrees >= self.config.ascent_threshold_deg {
                    let rep = Rep {
                        start: self.rep_start,
                        end: timestamp,
                        peak: self.peak,
                        trough: self.trough,
                    };
                    self.reset_after(degrees);
                    Some(rep)
                } else {
                    // Bouncing back down re-enters the bottom
                    if degrees <= self.config.depth_threshold_deg {
                        self.phase = Phase::Bottom;
                        self.ascend_run = 0;
                    }
                    None
                }
            }
        }
    }

    fn waiting(&mut self, timestamp: f64, degrees: f64) {
        if degrees >= self.config.descent_threshold_deg {
            self.armed = true;
            self.descend_run = 0;
            return;
        }
        if !self.armed {
            return;
        }

        if self.descend_run == 0 {
            self.rep_start = timestamp;
            self.peak = degrees;
            self.trough = degrees;
        } else {
            self.track_extremes(degrees);
        }
        self.descend_run += 1;

        if self.descend_run >= self.config.debounce_samples {
            self.phase = Phase::Descending;
            self.armed = false;
            self.descend_run = 0;
        }
    }

    fn on_invalid(&mut self) {
        self.invalid_run += 1;
        if self.invalid_run > self.config.invalid_tolerance && self.phase != Phase::WaitingForStart
        {
            debug!("invalid run exceeded tolerance; aborting in-progress rep");
            self.abort();
        }
    }

    fn track_extremes(&mut self, degrees: f64) {
        self.peak = self.peak.max(degrees);
        self.trough = self.trough.min(degrees);
    }

    fn reset_after(&mut self, closing_degrees: f64) {
        self.phase = Phase::WaitingForStart;
        self.armed = closing_degrees >= self.config.descent_threshold_deg;
        self.descend_run = 0;
        self.ascend_run = 0;
    }

    fn abort(&mut self) {
        self.phase = Phase::WaitingForStart;
        self.armed = false;
        self.descend_run = 0;
        self.ascend_run = 0;
        self.last_valid = None;
    }
}
