use crate::audio::SampleSource;
use crate::config::PipelineConfig;
use crate::error::AlignmentError;
use crate::pipeline::traits::{BoundaryAligner, SentenceSplitter, SentenceWeigher};
use crate::types::{AlignedSegment, AlignmentOutput, Sentence, SilenceIntervals};
use crate::vad::SilenceDetector;

pub struct SubtitleAligner {
    config: PipelineConfig,
    detector: SilenceDetector,
    boundary_aligner: Box<dyn BoundaryAligner>,
    sentence_splitter: Box<dyn SentenceSplitter>,
    sentence_weigher: Box<dyn SentenceWeigher>,
}

pub(crate) struct SubtitleAlignerParts {
    pub config: PipelineConfig,
    pub detector: SilenceDetector,
    pub boundary_aligner: Box<dyn BoundaryAligner>,
    pub sentence_splitter: Box<dyn SentenceSplitter>,
    pub sentence_weigher: Box<dyn SentenceWeigher>,
}

impl SubtitleAligner {
    pub(crate) fn from_parts(parts: SubtitleAlignerParts) -> Self {
        Self {
            config: parts.config,
            detector: parts.detector,
            boundary_aligner: parts.boundary_aligner,
            sentence_splitter: parts.sentence_splitter,
            sentence_weigher: parts.sentence_weigher,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.decider_name()
    }

    pub fn aligner_name(&self) -> &'static str {
        self.boundary_aligner.name()
    }

    pub fn detect_silence(&self, source: &mut dyn SampleSource) -> Result<SilenceIntervals, AlignmentError> {
        let silence = self.detector.detect(source)?;
        tracing::info!(
            detector = self.detector.decider_name(),
            duration_ms = silence.duration_ms(),
            silence_intervals = silence.len(),
            silence_ms = silence.total_silence_ms(),
            "silence detection complete"
        );
        Ok(silence)
    }

    /// Splits `text` into weighted sentences.
    pub fn sentences(&self, text: &str) -> Vec<Sentence> {
        self.sentence_splitter
            .split(text)
            .into_iter()
            .map(|text| {
                let weight = self.sentence_weigher.weigh(&text);
                Sentence { text, weight }
            })
            .collect()
    }

    /// Second stage only: places `sentences` over already detected silence.
    pub fn align_sentences(
        &self,
        sentences: Vec<Sentence>,
        silence: SilenceIntervals,
    ) -> Result<AlignmentOutput, AlignmentError> {
        if let Some(bad) = sentences.iter().find(|s| !(s.weight >= 0.0 && s.weight.is_finite())) {
            return Err(AlignmentError::invalid_input(format!(
                "sentence {:?} has weight {}, expected a finite non-negative value",
                bad.text, bad.weight
            )));
        }
        if sentences.is_empty() {
            tracing::warn!("no sentences to align");
        }

        let boundaries = self
            .boundary_aligner
            .select_boundaries(&sentences, &silence)?;
        let segments = boundaries
            .speech_intervals()?
            .into_iter()
            .zip(&sentences)
            .map(|(interval, sentence)| AlignedSegment {
                interval,
                text: sentence.text.clone(),
            })
            .collect::<Vec<_>>();

        tracing::info!(
            aligner = self.boundary_aligner.name(),
            sentences = sentences.len(),
            average_speed = boundaries.average_speed,
            "alignment complete"
        );
        Ok(AlignmentOutput {
            segments,
            silence,
            boundaries,
            sentences,
        })
    }

    pub fn align(
        &self,
        source: &mut dyn SampleSource,
        sentences: Vec<Sentence>,
    ) -> Result<AlignmentOutput, AlignmentError> {
        let silence = self.detect_silence(source)?;
        self.align_sentences(sentences, silence)
    }

    pub fn align_text(&self, source: &mut dyn SampleSource, text: &str) -> Result<AlignmentOutput, AlignmentError> {
        let sentences = self.sentences(text);
        self.align(source, sentences)
    }
}
