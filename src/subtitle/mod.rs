//! SubRip subtitle tracks.

pub mod srt;

use std::path::Path;

use crate::error::AlignmentError;
use crate::interval::TimeInterval;
use crate::types::AlignedSegment;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cue {
    pub interval: TimeInterval,
    pub text: String,
}

/// Cues ordered by non-decreasing start time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubtitleTrack {
    cues: Vec<Cue>,
}

impl SubtitleTrack {
    pub fn from_cues(cues: Vec<Cue>) -> Result<Self, AlignmentError> {
        for pair in cues.windows(2) {
            if pair[1].interval.begin_ms() < pair[0].interval.begin_ms() {
                return Err(AlignmentError::interval_order(format!(
                    "cue {} starts before the preceding cue {}",
                    pair[1].interval, pair[0].interval
                )));
            }
        }
        Ok(Self { cues })
    }

    pub fn from_segments(segments: &[AlignedSegment]) -> Result<Self, AlignmentError> {
        Self::from_cues(
            segments
                .iter()
                .map(|s| Cue {
                    interval: s.interval,
                    text: s.text.clone(),
                })
                .collect(),
        )
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn to_srt(&self) -> String {
        srt::render(self)
    }

    /// Accepts `\n` or `\r\n` line endings, a leading BOM, and multi-line cue text.
    pub fn parse(input: &str) -> Result<Self, AlignmentError> {
        srt::parse(input)
    }

    pub fn load(path: &Path) -> Result<Self, AlignmentError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| AlignmentError::io("read subtitle file", e))?;
        Self::parse(&data)
    }

    pub fn save(&self, path: &Path) -> Result<(), AlignmentError> {
        std::fs::write(path, self.to_srt()).map_err(|e| AlignmentError::io("write subtitle file", e))
    }

    /// Cue on screen at `at_ms`; the latest-starting one wins where cues touch
    /// or overlap.
    pub fn cue_at(&self, at_ms: u64) -> Option<&Cue> {
        let started = self.cues.partition_point(|c| c.interval.begin_ms() <= at_ms);
        self.cues[..started]
            .iter()
            .rev()
            .find(|c| c.interval.contains(at_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cue(begin: u64, end: u64, text: &str) -> Cue {
        Cue {
            interval: TimeInterval::new(begin, end).unwrap(),
            text: text.to_string(),
        }
    }

    fn track() -> SubtitleTrack {
        SubtitleTrack::from_cues(vec![
            cue(1000, 4000, "Hello there."),
            cue(4000, 9000, "General Kenobi!"),
            cue(9500, 12_345, "Line one\nline two"),
        ])
        .unwrap()
    }

    #[test]
    fn renders_numbered_blocks() {
        let srt = SubtitleTrack::from_cues(vec![cue(1000, 4000, "A."), cue(4000, 61_001, "B.")])
            .unwrap()
            .to_srt();
        assert_eq!(
            srt,
            "1\n00:00:01,000 --> 00:00:04,000\nA.\n\n2\n00:00:04,000 --> 00:01:01,001\nB.\n"
        );
    }

    #[test]
    fn round_trips_to_the_millisecond() {
        let track = track();
        assert_eq!(SubtitleTrack::parse(&track.to_srt()).unwrap(), track);
    }

    #[test]
    fn parses_crlf_and_extra_blank_lines() {
        let input = "\u{feff}1\r\n00:00:00,000 --> 00:00:01,250\r\nFirst\r\n\r\n\r\n2\r\n00:00:02,000 --> 00:00:03,000\r\nSecond\r\nmore\r\n";
        let track = SubtitleTrack::parse(input).unwrap();
        assert_eq!(track.len(), 2);
        assert_eq!(track.cues()[0], cue(0, 1250, "First"));
        assert_eq!(track.cues()[1].text, "Second\nmore");
    }

    #[test]
    fn reports_line_of_bad_timing() {
        let err = SubtitleTrack::parse("1\n00:00:01,000 -> 00:00:02,000\nx\n").unwrap_err();
        assert!(matches!(err, AlignmentError::SubtitleParse { line: 2, .. }));
        let err = SubtitleTrack::parse("1\n00:00:03,000 --> 00:00:02,000\nx\n").unwrap_err();
        assert!(matches!(err, AlignmentError::SubtitleParse { line: 2, .. }));
        let err = SubtitleTrack::parse("one\n").unwrap_err();
        assert!(matches!(err, AlignmentError::SubtitleParse { line: 1, .. }));
    }

    #[test]
    fn rejects_cues_out_of_order() {
        let err = SubtitleTrack::from_cues(vec![cue(500, 900, "b"), cue(100, 200, "a")]).unwrap_err();
        assert!(matches!(err, AlignmentError::IntervalOrderViolation { .. }));
    }

    #[test]
    fn cue_at_finds_active_subtitle() {
        let track = track();
        assert_eq!(track.cue_at(999), None);
        assert_eq!(track.cue_at(1000).map(|c| c.text.as_str()), Some("Hello there."));
        assert_eq!(track.cue_at(4000).map(|c| c.text.as_str()), Some("General Kenobi!"));
        assert_eq!(track.cue_at(9200), None);
        assert_eq!(track.cue_at(12_345).map(|c| c.interval.begin_ms()), Some(9500));
        assert_eq!(track.cue_at(20_000), None);
    }

    #[test]
    fn save_and_load() {
        let dir = std::env::temp_dir().join(format!("subalign-srt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("track.srt");
        track().save(&path).unwrap();
        assert_eq!(SubtitleTrack::load(&path).unwrap(), track());
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
