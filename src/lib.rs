pub mod alignment;
pub mod audio;
pub mod config;
pub mod error;
pub mod interval;
pub mod pipeline;
pub mod subtitle;
pub mod types;
pub mod vad;

pub use audio::{MemorySource, PcmFormat, PcmSource, SampleSource, WavSource};
pub use config::{AlignerConfig, BoundaryStrategy, PipelineConfig, VadConfig, VadMode};
pub use error::AlignmentError;
pub use interval::TimeInterval;
pub use pipeline::builder::SubtitleAlignerBuilder;
pub use pipeline::runtime::SubtitleAligner;
pub use pipeline::traits::{
    BoundaryAligner, FeatureExtractor, SentenceSplitter, SentenceWeigher, ThresholdDecider,
};
pub use subtitle::{Cue, SubtitleTrack};
pub use types::{
    AlignedSegment, AlignmentOutput, Boundary, BoundaryOrigin, BoundarySet, Sentence,
    SilenceIntervals,
};
