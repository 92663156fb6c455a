use crate::error::AlignmentError;
use crate::types::{BoundarySet, Sentence, SilenceIntervals};
use crate::vad::frames::Frames;

/// Scalar feature per analysis frame.
pub trait FeatureExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns exactly `frames.len()` values.
    fn extract(&self, frames: &Frames<'_>) -> Vec<f64>;
}

/// Raw per-frame speech decision, before hysteresis smoothing.
pub trait ThresholdDecider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns exactly `frames.len()` decisions (`true` = speech).
    fn decide(&self, frames: &Frames<'_>) -> Result<Vec<bool>, AlignmentError>;
}

/// Chooses the `sentences.len() + 1` boundaries separating sentences.
pub trait BoundaryAligner: Send + Sync {
    fn name(&self) -> &'static str;

    fn select_boundaries(
        &self,
        sentences: &[Sentence],
        silence: &SilenceIntervals,
    ) -> Result<BoundarySet, AlignmentError>;
}

pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Vec<String>;
}

/// Relative spoken-duration estimate of one sentence.
pub trait SentenceWeigher: Send + Sync {
    fn weigh(&self, sentence: &str) -> f64;
}
