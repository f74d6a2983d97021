use std::fmt::Display;

use size::Size;

/// Progress on a 0 to 100 scale.
///
/// Construction clamps into range and maps NaN to zero, so two percents compare equal whenever
/// they print the same.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Self = Self(0.0);
    pub const COMPLETE: Self = Self(100.0);

    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            return Self::ZERO;
        }
        Self(value.clamp(0.0, 100.0))
    }

    /// Share of `total` covered by `part`. An empty total counts as complete.
    pub fn of(part: Size, total: Size) -> Self {
        if total.bytes() <= 0 {
            return Self::COMPLETE;
        }
        Self::new(100.0 * (part.bytes() as f64) / (total.bytes() as f64))
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Display for Percent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}%", self.0)
    }
}
