//! The shared time axis assembled from independently discovered families.

use serde::{Deserialize, Serialize};

use barrel_core::errors::LoadWarning;

/// The time axis of one load: simulation step counts and wall-clock times.
///
/// Invariant: both arrays always have equal length and
/// `t[i] == t_steps[i] * dt` elementwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TimeSeries {
    /// Time in simulation steps.
    pub t_steps: Vec<u64>,
    /// Time in simulation units, `t_steps * dt`.
    pub t: Vec<f64>,
}

impl TimeSeries {
    /// Number of timesteps on the axis.
    pub fn len(&self) -> usize {
        self.t_steps.len()
    }

    /// True when no family has populated the axis yet.
    pub fn is_empty(&self) -> bool {
        self.t_steps.is_empty()
    }
}

/// Single-pass builder for the shared [`TimeSeries`].
///
/// The first family to arrive allocates the axis; a second family of equal
/// length confirms consistency. A differing length is the recoverable
/// `SeriesLengthMismatch` condition: the axis is recreated at the new length
/// (the later family wins) and a warning is recorded, never just printed.
#[derive(Debug)]
pub struct TimeSeriesAccumulator {
    dt: f64,
    series: TimeSeries,
}

impl TimeSeriesAccumulator {
    /// Creates an accumulator for a load using the given step duration.
    pub fn new(dt: f64) -> Self {
        Self {
            dt,
            series: TimeSeries::default(),
        }
    }

    /// Allocates the axis on first use, or verifies the length announced by
    /// a subsequent family. Returns the warning to record when the families
    /// disagree and the axis was recreated.
    pub fn create_or_verify(&mut self, num_times: usize, family: &str) -> Option<LoadWarning> {
        if self.series.is_empty() {
            self.allocate(num_times);
            return None;
        }
        if self.series.len() == num_times {
            return None;
        }
        let existing = self.series.len();
        self.allocate(num_times);
        Some(LoadWarning::SeriesLengthMismatch {
            existing,
            incoming: num_times,
            family: family.to_string(),
        })
    }

    fn allocate(&mut self, num_times: usize) {
        self.series = TimeSeries {
            t_steps: vec![0; num_times],
            t: vec![0.0; num_times],
        };
    }

    /// Records the timestep decoded from the file at position `index`.
    pub fn record(&mut self, index: usize, step: u64) {
        self.series.t_steps[index] = step;
        self.series.t[index] = step as f64 * self.dt;
    }

    /// Consumes the accumulator, yielding the assembled axis.
    pub fn finish(self) -> TimeSeries {
        self.series
    }
}
