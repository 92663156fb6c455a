use crate::alignment::boundaries::average_speed;
use crate::error::AlignmentError;
use crate::pipeline::traits::BoundaryAligner;
use crate::types::{Boundary, BoundarySet, Sentence, SilenceIntervals};

/// Uses the `sentences + 1` longest silences as boundaries, in time order.
#[derive(Debug, Clone, Copy, Default)]
pub struct LongestIntervalsAligner;

impl BoundaryAligner for LongestIntervalsAligner {
    fn name(&self) -> &'static str {
        "longest_intervals"
    }

    fn select_boundaries(
        &self,
        sentences: &[Sentence],
        silence: &SilenceIntervals,
    ) -> Result<BoundarySet, AlignmentError> {
        let required = sentences.len() + 1;
        if silence.len() < required {
            return Err(AlignmentError::InsufficientIntervals {
                required,
                available: silence.len(),
            });
        }

        let mut longest = silence.as_slice().to_vec();
        // Stable: equal lengths keep time order.
        longest.sort_by(|a, b| b.length_ms().cmp(&a.length_ms()));
        longest.truncate(required);
        longest.sort_by_key(|iv| iv.begin_ms());

        Ok(BoundarySet {
            boundaries: longest.into_iter().map(Boundary::detected).collect(),
            average_speed: average_speed(sentences, silence),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval::TimeInterval;

    fn iv(begin: u64, end: u64) -> TimeInterval {
        TimeInterval::new(begin, end).unwrap()
    }

    fn sentences(n: usize) -> Vec<Sentence> {
        (0..n)
            .map(|i| Sentence {
                text: format!("s{i}"),
                weight: 1.0,
            })
            .collect()
    }

    #[test]
    fn keeps_longest_in_time_order() {
        let silence = SilenceIntervals::new(
            vec![iv(0, 300), iv(1000, 1050), iv(2000, 2500), iv(3000, 3020), iv(4000, 4400)],
            5000,
        )
        .unwrap();
        let set = LongestIntervalsAligner
            .select_boundaries(&sentences(2), &silence)
            .unwrap();
        let chosen: Vec<_> = set.boundaries.iter().map(|b| b.interval).collect();
        assert_eq!(chosen, vec![iv(0, 300), iv(2000, 2500), iv(4000, 4400)]);
    }

    #[test]
    fn too_few_intervals_fail() {
        let silence = SilenceIntervals::new(vec![iv(0, 300), iv(900, 1000)], 1000).unwrap();
        let err = LongestIntervalsAligner
            .select_boundaries(&sentences(2), &silence)
            .unwrap_err();
        assert!(matches!(
            err,
            AlignmentError::InsufficientIntervals {
                required: 3,
                available: 2
            }
        ));
    }
}
