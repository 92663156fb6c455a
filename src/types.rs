use serde::Serialize;

use crate::error::AlignmentError;
use crate::interval::TimeInterval;

/// Detected silence of one recording: sorted, pairwise disjoint intervals.
///
/// Gaps between consecutive entries are speech.
#[derive(Debug, Clone, PartialEq)]
pub struct SilenceIntervals {
    intervals: Vec<TimeInterval>,
    duration_ms: u64,
}

impl SilenceIntervals {
    /// Validates ordering; rejects overlapping, unsorted or out-of-range input.
    pub fn new(intervals: Vec<TimeInterval>, duration_ms: u64) -> Result<Self, AlignmentError> {
        for pair in intervals.windows(2) {
            if pair[1].begin_ms() < pair[0].end_ms() {
                return Err(AlignmentError::interval_order(format!(
                    "silence interval {} starts before previous {} ends",
                    pair[1], pair[0]
                )));
            }
        }
        if let Some(last) = intervals.last() {
            if last.end_ms() > duration_ms {
                return Err(AlignmentError::interval_order(format!(
                    "silence interval {last} ends after audio duration {duration_ms} ms"
                )));
            }
        }
        Ok(Self {
            intervals,
            duration_ms,
        })
    }

    pub fn as_slice(&self) -> &[TimeInterval] {
        &self.intervals
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn total_silence_ms(&self) -> u64 {
        self.intervals.iter().map(TimeInterval::length_ms).sum()
    }

    pub fn average_length_ms(&self) -> f64 {
        if self.intervals.is_empty() {
            return 0.0;
        }
        self.total_silence_ms() as f64 / self.intervals.len() as f64
    }

    pub fn into_vec(self) -> Vec<TimeInterval> {
        self.intervals
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    pub text: String,
    /// Relative spoken duration estimate, never negative.
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryOrigin {
    Detected,
    Synthesized,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Boundary {
    pub interval: TimeInterval,
    pub origin: BoundaryOrigin,
}

impl Boundary {
    pub fn detected(interval: TimeInterval) -> Self {
        Self {
            interval,
            origin: BoundaryOrigin::Detected,
        }
    }

    pub fn synthesized(at_ms: u64) -> Self {
        Self {
            interval: TimeInterval::point(at_ms),
            origin: BoundaryOrigin::Synthesized,
        }
    }
}

/// Result of boundary search: `sentence_count + 1` boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundarySet {
    pub boundaries: Vec<Boundary>,
    /// Milliseconds of speech per unit of sentence weight.
    pub average_speed: f64,
}

impl BoundarySet {
    /// Speech interval of every sentence, `between(b[i], b[i + 1])`.
    pub fn speech_intervals(&self) -> Result<Vec<TimeInterval>, AlignmentError> {
        self.boundaries
            .windows(2)
            .map(|pair| TimeInterval::between(&pair[0].interval, &pair[1].interval))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignedSegment {
    pub interval: TimeInterval,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentOutput {
    pub segments: Vec<AlignedSegment>,
    pub silence: SilenceIntervals,
    pub boundaries: BoundarySet,
    pub sentences: Vec<Sentence>,
}
