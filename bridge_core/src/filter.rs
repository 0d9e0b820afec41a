//! Per-channel exponential smoothing.
//!
//! The recurrence blends the *previous* raw sample with the previous output:
//!
//! ```text
//! filtered_new  = c * prev_raw + (1 - c) * prev_filtered
//! prev_raw      = raw_incoming
//! prev_filtered = filtered_new
//! ```
//!
//! A sample therefore influences the output one update after it arrives.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFilter {
    coefficient: f64,
    prev_raw: f64,
    prev_filtered: f64,
}

impl SmoothingFilter {
    /// Coefficient is clamped into `(0, 1]`; history starts at zero.
    pub fn new(coefficient: f64) -> Self {
        let coefficient = if coefficient.is_finite() {
            coefficient.clamp(f64::MIN_POSITIVE, 1.0)
        } else {
            1.0
        };
        Self {
            coefficient,
            prev_raw: 0.0,
            prev_filtered: 0.0,
        }
    }

    /// Feed an already-clamped sample; returns the new filtered value.
    pub fn update(&mut self, raw: f64) -> f64 {
        let c = self.coefficient;
        let filtered = c * self.prev_raw + (1.0 - c) * self.prev_filtered;
        self.prev_raw = raw;
        self.prev_filtered = filtered;
        filtered
    }

    pub fn coefficient(&self) -> f64 {
        self.coefficient
    }

    pub fn prev_raw(&self) -> f64 {
        self.prev_raw
    }

    pub fn prev_filtered(&self) -> f64 {
        self.prev_filtered
    }
}
