//! Time and duration windows used to reject records early.

/// Absolute time window in epoch millis, inclusive on both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    pub from: i64,
    pub to: i64,
}

impl TimeRange {
    pub fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Window covering everything
    pub fn all() -> Self {
        Self {
            from: i64::MIN,
            to: i64::MAX,
        }
    }

    /// True when a call spanning `[start, start+duration]` overlaps the window
    pub fn overlaps(&self, start: i64, duration: u32) -> bool {
        start + duration as i64 >= self.from && start <= self.to
    }
}

/// Inclusive duration bounds in millis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationRange {
    pub min: u32,
    pub max: u32,
}

impl DurationRange {
    pub fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn at_least(min: u32) -> Self {
        Self { min, max: u32::MAX }
    }

    pub fn any() -> Self {
        Self {
            min: 0,
            max: u32::MAX,
        }
    }

    pub fn in_range(&self, duration: u32) -> bool {
        duration >= self.min && duration <= self.max
    }
}
