use crate::foundation::error::{TalkcutError, TalkcutResult};

/// Closed time interval `[start, end]` in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeInterval {
    /// Interval start in seconds.
    pub start: f64,
    /// Interval end in seconds, always `>= start`.
    pub end: f64,
}

impl TimeInterval {
    /// Create a validated interval with `start <= end`.
    pub fn new(start: f64, end: f64) -> TalkcutResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(TalkcutError::validation(
                "TimeInterval bounds must be finite",
            ));
        }
        if end < start {
            return Err(TalkcutError::validation(format!(
                "TimeInterval end ({end:.3}) must be >= start ({start:.3})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build an interval, collapsing an inverted pair to zero length at `start`.
    pub fn clamped(start: f64, end: f64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    /// Interval length in seconds.
    pub fn duration(self) -> f64 {
        self.end - self.start
    }

    /// Strict overlap test: `self.start < other.end && self.end > other.start`.
    ///
    /// Touching intervals do not overlap.
    pub fn overlaps(self, other: TimeInterval) -> bool {
        self.start < other.end && self.end > other.start
    }

    /// Return `true` when `t` lies inside `[start, end]`.
    pub fn contains(self, t: f64) -> bool {
        self.start <= t && t <= self.end
    }

    /// Widen both bounds by `slack` seconds.
    pub fn widen(self, slack: f64) -> Self {
        Self {
            start: self.start - slack,
            end: self.end + slack,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
