use std::fmt::Write as _;

use crate::error::AlignmentError;
use crate::interval::TimeInterval;
use crate::subtitle::{Cue, SubtitleTrack};

/// `HH:MM:SS,mmm`; hours grow past two digits when needed.
pub fn format_timestamp(ms: u64) -> String {
    let hours = ms / 3_600_000;
    let minutes = ms / 60_000 % 60;
    let seconds = ms / 1000 % 60;
    let millis = ms % 1000;
    format!("{hours:02}:{minutes:02}:{seconds:02},{millis:03}")
}

pub fn parse_timestamp(raw: &str) -> Option<u64> {
    let (clock, millis) = raw.trim().split_once([',', '.'])?;
    let mut parts = clock.split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let seconds: u64 = parts.next()?.parse().ok()?;
    if parts.next().is_some() || minutes >= 60 || seconds >= 60 || millis.len() != 3 {
        return None;
    }
    let millis: u64 = millis.parse().ok()?;
    Some(((hours * 60 + minutes) * 60 + seconds) * 1000 + millis)
}

pub(crate) fn render(track: &SubtitleTrack) -> String {
    let mut out = String::new();
    for (i, cue) in track.cues().iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        // Infallible for String.
        let _ = writeln!(
            out,
            "{}\n{} --> {}\n{}",
            i + 1,
            format_timestamp(cue.interval.begin_ms()),
            format_timestamp(cue.interval.end_ms()),
            cue.text
        );
    }
    out
}

pub(crate) fn parse(input: &str) -> Result<SubtitleTrack, AlignmentError> {
    let mut cues = Vec::new();
    let mut lines = input.lines().enumerate().peekable();

    loop {
        while matches!(lines.peek(), Some((_, line)) if line.trim().is_empty()) {
            lines.next();
        }
        let Some((index_line, index)) = lines.next() else {
            break;
        };
        let index = index.trim_start_matches('\u{feff}').trim();
        if index.parse::<u64>().is_err() {
            return Err(AlignmentError::subtitle_parse(
                index_line + 1,
                format!("expected cue number, found {index:?}"),
            ));
        }

        let Some((timing_line, timing)) = lines.next() else {
            return Err(AlignmentError::subtitle_parse(
                index_line + 2,
                "cue ends before its timing line",
            ));
        };
        let interval = parse_timing(timing)
            .ok_or_else(|| {
                AlignmentError::subtitle_parse(timing_line + 1, format!("bad timing line {timing:?}"))
            })?
            .map_err(|e| match e {
                AlignmentError::IntervalOrderViolation { message } => {
                    AlignmentError::subtitle_parse(timing_line + 1, message)
                }
                other => other,
            })?;

        let mut text = Vec::new();
        while let Some((_, line)) = lines.peek() {
            if line.trim().is_empty() {
                break;
            }
            text.push(line.trim_end().to_string());
            lines.next();
        }
        cues.push(Cue {
            interval,
            text: text.join("\n"),
        });
    }

    SubtitleTrack::from_cues(cues)
}

fn parse_timing(line: &str) -> Option<Result<TimeInterval, AlignmentError>> {
    let (begin, end) = line.split_once("-->")?;
    // Players may append position hints after the end timestamp.
    let end = end.split_whitespace().next()?;
    Some(TimeInterval::new(parse_timestamp(begin)?, parse_timestamp(end)?))
}
