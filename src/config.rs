use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AlignmentError;

/// Which speech detector drives the VAD stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VadMode {
    /// Voice-band spectral energy against a calibrated ambient baseline.
    #[default]
    VoiceBand,
    /// Two-of-three vote over energy, dominant frequency and spectral flatness.
    Consensus,
    /// Long-term spectral flatness with an adaptive threshold.
    Lsfm,
}

impl VadMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::VoiceBand => "voice_band",
            Self::Consensus => "consensus",
            Self::Lsfm => "lsfm",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VadConfig {
    pub mode: VadMode,
    pub frame_length_ms: u32,
    pub overlap_ms: u32,
    /// Analysis frames decoded per read from the sample source.
    pub read_chunk_frames: usize,
    pub calibration_frames: usize,
    pub threshold_ratio: f64,
    pub voice_band_low_hz: f64,
    pub voice_band_high_hz: f64,
    pub min_speech_frames: usize,
    pub min_silence_frames: usize,
    /// Energy vote margin is `energy_margin_scale * ln(min_energy)`.
    pub energy_margin_scale: f64,
    pub frequency_margin_hz: f64,
    pub flatness_margin_db: f64,
    pub lsfm_lambda: f64,
    /// R: frames the flatness ratio is taken over.
    pub lsfm_long_window: usize,
    /// M: frames averaged into one short-time spectrum.
    pub lsfm_short_window: usize,
    /// Frames the adaptive min/max threshold anchors look back over.
    pub lsfm_threshold_window: usize,
    pub lsfm_low_hz: f64,
    pub lsfm_high_hz: f64,
    pub lsfm_density_ratio: f64,
}

impl VadConfig {
    pub const DEFAULT_FRAME_LENGTH_MS: u32 = 10;
    pub const DEFAULT_READ_CHUNK_FRAMES: usize = 2048;
    pub const DEFAULT_CALIBRATION_FRAMES: usize = 30;
    pub const DEFAULT_THRESHOLD_RATIO: f64 = 10.0;
    pub const DEFAULT_VOICE_BAND_LOW_HZ: f64 = 300.0;
    pub const DEFAULT_VOICE_BAND_HIGH_HZ: f64 = 1000.0;
    pub const DEFAULT_MIN_SPEECH_FRAMES: usize = 5;
    pub const DEFAULT_MIN_SILENCE_FRAMES: usize = 10;
    pub const LSFM_FRAME_LENGTH_MS: u32 = 20;
    pub const LSFM_OVERLAP_MS: u32 = 10;

    /// Defaults tuned for `mode`; LSFM analyses 20 ms frames with 10 ms overlap.
    pub fn for_mode(mode: VadMode) -> Self {
        let base = Self {
            mode,
            ..Self::default()
        };
        match mode {
            VadMode::VoiceBand | VadMode::Consensus => base,
            VadMode::Lsfm => Self {
                frame_length_ms: Self::LSFM_FRAME_LENGTH_MS,
                overlap_ms: Self::LSFM_OVERLAP_MS,
                ..base
            },
        }
    }

    /// Time between the starts of consecutive analysis frames.
    pub fn frame_step_ms(&self) -> u32 {
        self.frame_length_ms.saturating_sub(self.overlap_ms)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if self.frame_length_ms == 0 {
            return Err(AlignmentError::invalid_config("frame_length_ms must be > 0"));
        }
        if self.overlap_ms >= self.frame_length_ms {
            return Err(AlignmentError::invalid_config(format!(
                "overlap_ms ({}) must be shorter than frame_length_ms ({})",
                self.overlap_ms, self.frame_length_ms
            )));
        }
        if self.read_chunk_frames == 0 {
            return Err(AlignmentError::invalid_config("read_chunk_frames must be > 0"));
        }
        if self.calibration_frames == 0 {
            return Err(AlignmentError::invalid_config("calibration_frames must be > 0"));
        }
        for (name, value) in [
            ("threshold_ratio", self.threshold_ratio),
            ("energy_margin_scale", self.energy_margin_scale),
            ("frequency_margin_hz", self.frequency_margin_hz),
            ("flatness_margin_db", self.flatness_margin_db),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(AlignmentError::invalid_config(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if self.voice_band_low_hz > self.voice_band_high_hz {
            return Err(AlignmentError::invalid_config(
                "voice_band_low_hz must not exceed voice_band_high_hz",
            ));
        }
        if self.lsfm_low_hz > self.lsfm_high_hz {
            return Err(AlignmentError::invalid_config(
                "lsfm_low_hz must not exceed lsfm_high_hz",
            ));
        }
        if !(0.0..=1.0).contains(&self.lsfm_lambda) {
            return Err(AlignmentError::invalid_config("lsfm_lambda must be in [0, 1]"));
        }
        if !(0.0..=1.0).contains(&self.lsfm_density_ratio) {
            return Err(AlignmentError::invalid_config(
                "lsfm_density_ratio must be in [0, 1]",
            ));
        }
        if self.lsfm_long_window == 0
            || self.lsfm_short_window == 0
            || self.lsfm_threshold_window == 0
        {
            return Err(AlignmentError::invalid_config("LSFM windows must be > 0"));
        }
        Ok(())
    }
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            mode: VadMode::VoiceBand,
            frame_length_ms: Self::DEFAULT_FRAME_LENGTH_MS,
            overlap_ms: 0,
            read_chunk_frames: Self::DEFAULT_READ_CHUNK_FRAMES,
            calibration_frames: Self::DEFAULT_CALIBRATION_FRAMES,
            threshold_ratio: Self::DEFAULT_THRESHOLD_RATIO,
            voice_band_low_hz: Self::DEFAULT_VOICE_BAND_LOW_HZ,
            voice_band_high_hz: Self::DEFAULT_VOICE_BAND_HIGH_HZ,
            min_speech_frames: Self::DEFAULT_MIN_SPEECH_FRAMES,
            min_silence_frames: Self::DEFAULT_MIN_SILENCE_FRAMES,
            energy_margin_scale: 40.0,
            frequency_margin_hz: 185.0,
            flatness_margin_db: 5.0,
            lsfm_lambda: 0.55,
            lsfm_long_window: 5,
            lsfm_short_window: 10,
            lsfm_threshold_window: 100,
            lsfm_low_hz: 500.0,
            lsfm_high_hz: 4000.0,
            lsfm_density_ratio: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryStrategy {
    /// Rate-driven greedy search with synthesized fallback boundaries.
    #[default]
    Adaptive,
    /// Pick the `n + 1` longest silences; fails when too few were detected.
    LongestIntervals,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlignerConfig {
    pub strategy: BoundaryStrategy,
    /// Shortest acceptable gap as a fraction of the sentence target length.
    pub min_gap_factor: f64,
    /// Longest acceptable gap; scanning stops past it.
    pub max_gap_factor: f64,
    /// Target length divisor used when a synthesized boundary is pulled back.
    pub synthetic_shrink_divisor: f64,
}

impl AlignerConfig {
    pub const DEFAULT_MIN_GAP_FACTOR: f64 = 0.5;
    pub const DEFAULT_MAX_GAP_FACTOR: f64 = 1.8;
    pub const DEFAULT_SYNTHETIC_SHRINK_DIVISOR: f64 = 2.5;

    pub fn validate(&self) -> Result<(), AlignmentError> {
        if !(self.min_gap_factor >= 0.0 && self.min_gap_factor <= self.max_gap_factor) {
            return Err(AlignmentError::invalid_config(format!(
                "gap window [{}, {}] is empty",
                self.min_gap_factor, self.max_gap_factor
            )));
        }
        if !(self.synthetic_shrink_divisor >= 1.0 && self.synthetic_shrink_divisor.is_finite()) {
            return Err(AlignmentError::invalid_config(
                "synthetic_shrink_divisor must be >= 1",
            ));
        }
        Ok(())
    }
}

impl Default for AlignerConfig {
    fn default() -> Self {
        Self {
            strategy: BoundaryStrategy::Adaptive,
            min_gap_factor: Self::DEFAULT_MIN_GAP_FACTOR,
            max_gap_factor: Self::DEFAULT_MAX_GAP_FACTOR,
            synthetic_shrink_divisor: Self::DEFAULT_SYNTHETIC_SHRINK_DIVISOR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub vad: VadConfig,
    pub aligner: AlignerConfig,
}

impl PipelineConfig {
    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read pipeline config", e))?;
        let config: Self = serde_json::from_str(&data)
            .map_err(|e| AlignmentError::json("parse pipeline config", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), AlignmentError> {
        self.vad.validate()?;
        self.aligner.validate()
    }
}
