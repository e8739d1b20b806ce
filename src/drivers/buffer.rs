use std::collections::VecDeque;
use crate::drivers::MonitorError;
use crate::types::SamplePoint;
/// Default number of samples kept for the live view.
pub const DEFAULT_CAPACITY: usize = 1200;
/// Rolling window of the most recent samples, stored as three index-aligned columns.
pub struct History {
    time: VecDeque<f64>,
    magnitude: VecDeque<f64>,
    rms: VecDeque<f64>,
    capacity: usize,
}
impl History {
    pub fn with_capacity(capacity: usize) -> Result<Self, MonitorError> {
        if capacity == 0 {
            return Err(MonitorError::Config(
                "history capacity must be at least one sample".into(),
            ));
        }
        Ok(Self {
            time: VecDeque::with_capacity(capacity),
            magnitude: VecDeque::with_capacity(capacity),
            rms: VecDeque::with_capacity(capacity),
            capacity,
        })
    }
    pub fn len(&self) -> usize {
        self.time.len()
    }
    pub fn push(&mut self, point: SamplePoint) {
        if self.time.len() == self.capacity {
            self.time.pop_front();
            self.magnitude.pop_front();
            self.rms.pop_front();
        }
        self.time.push_back(point.elapsed);
        self.magnitude.push_back(point.magnitude);
        self.rms.push_back(point.rms);
    }
    pub fn magnitude(&self) -> &VecDeque<f64> {
        &self.magnitude
    }
    pub fn rms(&self) -> &VecDeque<f64> {
        &self.rms
    }
    pub fn oldest(&self) -> Option<f64> {
        self.time.front().copied()
    }
    pub fn newest(&self) -> Option<f64> {
        self.time.back().copied()
    }
    /// `(elapsed, magnitude)` pairs, oldest first.
    pub fn magnitude_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.magnitude.iter().copied())
    }
    /// `(elapsed, rms)` pairs, oldest first.
    pub fn rms_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.time.iter().copied().zip(self.rms.iter().copied())
    }
}
