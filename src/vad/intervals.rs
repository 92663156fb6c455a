use crate::error::AlignmentError;
use crate::interval::TimeInterval;
use crate::types::SilenceIntervals;
use crate::vad::frames::FrameTiming;

/// Turns final per-frame decisions into frame-aligned silence intervals.
#[derive(Debug, Clone, Copy)]
pub struct IntervalBuilder {
    timing: FrameTiming,
}

impl IntervalBuilder {
    pub fn new(timing: FrameTiming) -> Self {
        Self { timing }
    }

    /// Bounds are clamped to `duration_ms`: with fractional samples per frame
    /// the grid can run a few steps past the audio.
    pub fn build(&self, decisions: &[bool], duration_ms: u64) -> Result<SilenceIntervals, AlignmentError> {
        let mut intervals: Vec<TimeInterval> = Vec::new();
        let mut previous_silent = false;
        for (i, &speech) in decisions.iter().enumerate() {
            if speech {
                previous_silent = false;
                continue;
            }
            let begin = self.timing.start_ms(i).min(duration_ms);
            let end = self.timing.start_ms(i + 1).min(duration_ms);
            match intervals.last_mut() {
                Some(last) if previous_silent => *last = last.extended_to(end)?,
                _ if begin == end => continue,
                _ => intervals.push(TimeInterval::new(begin, end)?),
            }
            previous_silent = true;
        }
        tracing::debug!(
            frames = decisions.len(),
            silence_intervals = intervals.len(),
            "vad: built silence intervals"
        );
        SilenceIntervals::new(intervals, duration_ms)
    }
}
