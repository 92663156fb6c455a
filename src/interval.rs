use serde::Serialize;

use crate::error::AlignmentError;

/// Millisecond time span with `begin <= end`.
///
/// Values are immutable: the only way to get an interval is through a
/// validating constructor, and "growing" one yields a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TimeInterval {
    begin_ms: u64,
    end_ms: u64,
}

impl TimeInterval {
    pub fn new(begin_ms: u64, end_ms: u64) -> Result<Self, AlignmentError> {
        if end_ms < begin_ms {
            return Err(AlignmentError::interval_order(format!(
                "interval end {end_ms} ms is earlier than begin {begin_ms} ms"
            )));
        }
        Ok(Self { begin_ms, end_ms })
    }

    /// Zero-length interval at a single point in time.
    pub fn point(at_ms: u64) -> Self {
        Self {
            begin_ms: at_ms,
            end_ms: at_ms,
        }
    }

    /// Interval spanning the gap from the end of `earlier` to the begin of `later`.
    pub fn between(earlier: &TimeInterval, later: &TimeInterval) -> Result<Self, AlignmentError> {
        if later.begin_ms < earlier.end_ms {
            return Err(AlignmentError::interval_order(format!(
                "cannot span from {} ms back to {} ms",
                earlier.end_ms, later.begin_ms
            )));
        }
        Ok(Self {
            begin_ms: earlier.end_ms,
            end_ms: later.begin_ms,
        })
    }

    pub fn begin_ms(&self) -> u64 {
        self.begin_ms
    }

    pub fn end_ms(&self) -> u64 {
        self.end_ms
    }

    pub fn length_ms(&self) -> u64 {
        self.end_ms - self.begin_ms
    }

    /// Inclusive on both ends.
    pub fn contains(&self, t_ms: u64) -> bool {
        self.begin_ms <= t_ms && t_ms <= self.end_ms
    }

    /// The interval is over before `t_ms`.
    pub fn is_earlier(&self, t_ms: u64) -> bool {
        self.end_ms < t_ms
    }

    /// The interval has not started yet at `t_ms`.
    pub fn is_later(&self, t_ms: u64) -> bool {
        self.begin_ms > t_ms
    }

    pub fn extended_to(&self, end_ms: u64) -> Result<Self, AlignmentError> {
        Self::new(self.begin_ms, end_ms)
    }
}

impl std::fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}] ms", self.begin_ms, self.end_ms)
    }
}
