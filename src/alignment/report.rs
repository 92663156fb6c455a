use serde::Serialize;

use crate::interval::TimeInterval;
use crate::types::{AlignmentOutput, BoundaryOrigin};

#[derive(Debug, Clone, Serialize)]
pub struct AlignmentReport {
    pub schema_version: u32,
    pub meta: ReportMeta,
    pub totals: ReportTotals,
    pub segments: Vec<SegmentReport>,
    pub silence: Vec<TimeInterval>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub generated_at: String,
    pub audio_path: String,
    pub detector: String,
    pub aligner: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportTotals {
    pub duration_ms: u64,
    pub silence_ms: u64,
    pub speaking_ms: u64,
    pub silence_interval_count: usize,
    pub average_silence_ms: f64,
    /// Milliseconds of speech per unit of sentence weight.
    pub average_speed: f64,
    pub sentence_count: usize,
    pub synthesized_boundary_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SegmentReport {
    pub index: usize,
    pub text: String,
    pub weight: f64,
    pub begin_ms: u64,
    pub end_ms: u64,
    pub length_ms: u64,
    pub target_ms: f64,
    /// Signed `length - target`.
    pub deviation_ms: f64,
    pub start_origin: BoundaryOrigin,
    pub end_origin: BoundaryOrigin,
}

pub fn build_report(output: &AlignmentOutput, meta: ReportMeta) -> AlignmentReport {
    let speed = output.boundaries.average_speed;
    let boundaries = &output.boundaries.boundaries;
    let segments = output
        .segments
        .iter()
        .zip(&output.sentences)
        .enumerate()
        .map(|(index, (segment, sentence))| {
            let target_ms = sentence.weight * speed;
            let length_ms = segment.interval.length_ms();
            SegmentReport {
                index,
                text: segment.text.clone(),
                weight: sentence.weight,
                begin_ms: segment.interval.begin_ms(),
                end_ms: segment.interval.end_ms(),
                length_ms,
                target_ms,
                deviation_ms: length_ms as f64 - target_ms,
                start_origin: boundaries
                    .get(index)
                    .map_or(BoundaryOrigin::Synthesized, |b| b.origin),
                end_origin: boundaries
                    .get(index + 1)
                    .map_or(BoundaryOrigin::Synthesized, |b| b.origin),
            }
        })
        .collect();

    let silence = &output.silence;
    AlignmentReport {
        schema_version: 1,
        meta,
        totals: ReportTotals {
            duration_ms: silence.duration_ms(),
            silence_ms: silence.total_silence_ms(),
            speaking_ms: silence.duration_ms().saturating_sub(silence.total_silence_ms()),
            silence_interval_count: silence.len(),
            average_silence_ms: silence.average_length_ms(),
            average_speed: speed,
            sentence_count: output.sentences.len(),
            synthesized_boundary_count: boundaries
                .iter()
                .filter(|b| b.origin == BoundaryOrigin::Synthesized)
                .count(),
        },
        segments,
        silence: silence.as_slice().to_vec(),
    }
}
