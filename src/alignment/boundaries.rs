use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::interval::TimeInterval;
use crate::pipeline::traits::BoundaryAligner;
use crate::types::{Boundary, BoundarySet, Sentence, SilenceIntervals};

/// Milliseconds of speech per unit of sentence weight over the whole file.
pub fn average_speed(sentences: &[Sentence], silence: &SilenceIntervals) -> f64 {
    let total_weight: f64 = sentences.iter().map(|s| s.weight).sum();
    if total_weight <= 0.0 {
        return 0.0;
    }
    let speaking_ms = silence
        .duration_ms()
        .saturating_sub(silence.total_silence_ms());
    speaking_ms as f64 / total_weight
}

/// Greedy search for one silence boundary per sentence, guided by the
/// expected spoken length of each sentence. Sentences without a fitting
/// silence get a synthesized zero-length boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveBoundaryAligner {
    pub min_gap_factor: f64,
    pub max_gap_factor: f64,
    pub synthetic_shrink_divisor: f64,
}

impl Default for AdaptiveBoundaryAligner {
    fn default() -> Self {
        Self::from_config(&AlignerConfig::default())
    }
}

impl AdaptiveBoundaryAligner {
    pub fn from_config(config: &AlignerConfig) -> Self {
        Self {
            min_gap_factor: config.min_gap_factor,
            max_gap_factor: config.max_gap_factor,
            synthetic_shrink_divisor: config.synthetic_shrink_divisor,
        }
    }

    fn synthesize(&self, previous: &TimeInterval, target_ms: f64, silence: &SilenceIntervals) -> Boundary {
        let average_silence = silence.average_length_ms();
        let shrink = if target_ms > average_silence {
            average_silence
        } else {
            target_ms / self.synthetic_shrink_divisor
        };
        let offset = (target_ms - shrink).max(0.0).round() as u64;
        let at_ms = previous
            .end_ms()
            .saturating_add(offset)
            .min(silence.duration_ms().max(previous.end_ms()));
        Boundary::synthesized(at_ms)
    }
}

impl BoundaryAligner for AdaptiveBoundaryAligner {
    fn name(&self) -> &'static str {
        "adaptive"
    }

    fn select_boundaries(
        &self,
        sentences: &[Sentence],
        silence: &SilenceIntervals,
    ) -> Result<BoundarySet, AlignmentError> {
        let speed = average_speed(sentences, silence);
        let intervals = silence.as_slice();

        let mut boundaries = Vec::with_capacity(sentences.len() + 1);
        boundaries.push(match intervals.first() {
            Some(first) => Boundary::detected(*first),
            None => Boundary::synthesized(0),
        });
        let mut cursor = 1usize;
        let mut synthesized = 0usize;

        for (index, sentence) in sentences.iter().enumerate() {
            let previous = boundaries[boundaries.len() - 1].interval;
            let target_ms = sentence.weight * speed;
            let min_gap = self.min_gap_factor * target_ms;
            let max_gap = self.max_gap_factor * target_ms;

            let mut best: Option<usize> = None;
            let mut scan = cursor;
            while scan < intervals.len() {
                let candidate = &intervals[scan];
                if candidate.begin_ms() < previous.end_ms() {
                    scan += 1;
                    continue;
                }
                let gap = TimeInterval::between(&previous, candidate)?.length_ms() as f64;
                if gap >= min_gap && gap <= max_gap {
                    let longer = best.map_or(true, |b| candidate.length_ms() > intervals[b].length_ms());
                    if longer {
                        best = Some(scan);
                    }
                }
                if gap >= max_gap {
                    break;
                }
                scan += 1;
            }

            let boundary = match best {
                Some(chosen) => {
                    cursor = chosen + 1;
                    Boundary::detected(intervals[chosen])
                }
                None => {
                    synthesized += 1;
                    let boundary = self.synthesize(&previous, target_ms, silence);
                    tracing::debug!(
                        sentence = index,
                        target_ms,
                        at_ms = boundary.interval.begin_ms(),
                        "align: no silence fits, synthesized boundary"
                    );
                    boundary
                }
            };
            boundaries.push(boundary);
        }

        tracing::debug!(
            sentences = sentences.len(),
            silence_intervals = intervals.len(),
            synthesized,
            average_speed = speed,
            "align: adaptive boundary search done"
        );
        Ok(BoundarySet {
            boundaries,
            average_speed: speed,
        })
    }
}
