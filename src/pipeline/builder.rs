use crate::config::PipelineConfig;
use crate::error::AlignmentError;
use crate::pipeline::defaults::{
    default_boundary_aligner, default_threshold_decider, CharacterWeigher, TerminatorSplitter,
};
use crate::pipeline::runtime::{SubtitleAligner, SubtitleAlignerParts};
use crate::pipeline::traits::{BoundaryAligner, SentenceSplitter, SentenceWeigher, ThresholdDecider};
use crate::vad::SilenceDetector;

pub struct SubtitleAlignerBuilder {
    config: PipelineConfig,
    threshold_decider: Option<Box<dyn ThresholdDecider>>,
    boundary_aligner: Option<Box<dyn BoundaryAligner>>,
    sentence_splitter: Option<Box<dyn SentenceSplitter>>,
    sentence_weigher: Option<Box<dyn SentenceWeigher>>,
}

impl SubtitleAlignerBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            threshold_decider: None,
            boundary_aligner: None,
            sentence_splitter: None,
            sentence_weigher: None,
        }
    }

    pub fn with_threshold_decider(mut self, threshold_decider: Box<dyn ThresholdDecider>) -> Self {
        self.threshold_decider = Some(threshold_decider);
        self
    }

    pub fn with_boundary_aligner(mut self, boundary_aligner: Box<dyn BoundaryAligner>) -> Self {
        self.boundary_aligner = Some(boundary_aligner);
        self
    }

    pub fn with_sentence_splitter(mut self, sentence_splitter: Box<dyn SentenceSplitter>) -> Self {
        self.sentence_splitter = Some(sentence_splitter);
        self
    }

    pub fn with_sentence_weigher(mut self, sentence_weigher: Box<dyn SentenceWeigher>) -> Self {
        self.sentence_weigher = Some(sentence_weigher);
        self
    }

    pub fn build(self) -> Result<SubtitleAligner, AlignmentError> {
        self.config.validate()?;

        let threshold_decider = self
            .threshold_decider
            .unwrap_or_else(|| default_threshold_decider(&self.config.vad));
        let detector = SilenceDetector::new(&self.config.vad, threshold_decider);
        let boundary_aligner = self
            .boundary_aligner
            .unwrap_or_else(|| default_boundary_aligner(&self.config.aligner));

        tracing::debug!(
            mode = self.config.vad.mode.as_str(),
            decider = detector.decider_name(),
            aligner = boundary_aligner.name(),
            frame_length_ms = self.config.vad.frame_length_ms,
            overlap_ms = self.config.vad.overlap_ms,
            "built subtitle aligner"
        );

        Ok(SubtitleAligner::from_parts(SubtitleAlignerParts {
            config: self.config,
            detector,
            boundary_aligner,
            sentence_splitter: self
                .sentence_splitter
                .unwrap_or_else(|| Box::new(TerminatorSplitter)),
            sentence_weigher: self
                .sentence_weigher
                .unwrap_or_else(|| Box::new(CharacterWeigher)),
        }))
    }
}
