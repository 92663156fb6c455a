use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use libtest_mimic::{Arguments, Failed, Trial};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use subalign::pipeline::defaults::CharacterWeigher;
use subalign::pipeline::traits::SentenceWeigher;
use subalign::{
    AlignmentError, AlignmentOutput, BoundaryStrategy, PcmFormat, PcmSource, PipelineConfig,
    SubtitleAligner, SubtitleAlignerBuilder, SubtitleTrack, TimeInterval, VadConfig, VadMode,
    WavSource,
};

const RATE: u32 = 16_000;
const LEAD_MS: u64 = 600;
const GAP_MS: u64 = 500;
const TAIL_MS: u64 = 600;
const SCRIPT: &str = "The first sentence is here. Then a second one follows!\nAnd finally the third?";

fn main() {
    let args = Arguments::from_args();
    let trials = vec![
        Trial::test("voice_band_over_digital_silence", voice_band_over_digital_silence),
        Trial::test("voice_band_over_hiss", voice_band_over_hiss),
        Trial::test("consensus_over_digital_silence", consensus_over_digital_silence),
        Trial::test("stereo_24_bit_wav_matches_raw_pcm", stereo_24_bit_wav_matches_raw_pcm),
        Trial::test("legacy_longest_intervals", legacy_longest_intervals),
        Trial::test("legacy_fails_without_enough_silence", legacy_fails_without_enough_silence),
        Trial::test("lsfm_mode_yields_one_segment_per_sentence", lsfm_mode_yields_one_segment_per_sentence),
        Trial::test("subrip_round_trip", subrip_round_trip),
        Trial::test("short_audio_is_malformed", short_audio_is_malformed),
    ];
    libtest_mimic::run(&args, trials).exit();
}

/// Tone lengths follow sentence weights so the speaking rate is uniform.
fn tone_lengths_ms(script: &str) -> Vec<u64> {
    let aligner = build(PipelineConfig::default());
    aligner
        .sentences(script)
        .iter()
        .map(|s| {
            assert_eq!(s.weight, CharacterWeigher.weigh(&s.text));
            ((s.weight * 2.5).round() * 10.0) as u64
        })
        .collect()
}

enum Background {
    Digital,
    Hiss(StdRng),
}

impl Background {
    fn sample(&mut self) -> f64 {
        match self {
            Self::Digital => 0.0,
            Self::Hiss(rng) => rng.random_range(-20.0..20.0),
        }
    }
}

fn samples_for(ms: u64) -> usize {
    (RATE as u64 * ms / 1000) as usize
}

/// Background, then tone bursts separated by `GAP_MS` of background.
fn synthesize(tones_ms: &[u64], tone_hz: f64, mut background: Background) -> Vec<f64> {
    let mut samples = Vec::new();
    let pad = |samples: &mut Vec<f64>, ms: u64, background: &mut Background| {
        samples.extend((0..samples_for(ms)).map(|_| background.sample()));
    };
    pad(&mut samples, LEAD_MS, &mut background);
    for (i, &ms) in tones_ms.iter().enumerate() {
        if i > 0 {
            pad(&mut samples, GAP_MS, &mut background);
        }
        samples.extend((0..samples_for(ms)).map(|n| {
            8000.0 * (2.0 * std::f64::consts::PI * tone_hz * n as f64 / RATE as f64).sin()
        }));
    }
    pad(&mut samples, TAIL_MS, &mut background);
    samples
}

fn expected_segments(tones_ms: &[u64]) -> Vec<TimeInterval> {
    let mut begin = LEAD_MS;
    tones_ms
        .iter()
        .map(|&ms| {
            let interval = TimeInterval::new(begin, begin + ms).unwrap();
            begin += ms + GAP_MS;
            interval
        })
        .collect()
}

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("subalign-it-{}-{name}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_wav(path: &Path, mono: &[f64], channels: u16, bits_per_sample: u16) -> Result<(), String> {
    let spec = WavSpec {
        channels,
        sample_rate: RATE,
        bits_per_sample,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).map_err(|e| e.to_string())?;
    let scale = f64::from(1u32 << (bits_per_sample - 16));
    for &sample in mono {
        for _ in 0..channels {
            writer
                .write_sample((sample * scale).round() as i32)
                .map_err(|e| e.to_string())?;
        }
    }
    writer.finalize().map_err(|e| e.to_string())
}

fn build(config: PipelineConfig) -> SubtitleAligner {
    SubtitleAlignerBuilder::new(config).build().unwrap()
}

fn align_wav(path: &Path, config: PipelineConfig) -> Result<AlignmentOutput, AlignmentError> {
    let mut source = WavSource::open(path)?;
    build(config).align_text(&mut source, SCRIPT)
}

fn segment_intervals(output: &AlignmentOutput) -> Vec<TimeInterval> {
    output.segments.iter().map(|s| s.interval).collect()
}

fn check_segments(output: &AlignmentOutput, tones_ms: &[u64]) -> Result<(), Failed> {
    let actual = segment_intervals(output);
    let expected = expected_segments(tones_ms);
    if actual != expected {
        return Err(format!("segments {actual:?} != expected {expected:?}").into());
    }
    Ok(())
}

fn voice_band_over_digital_silence() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("digital");
    let path = dir.join("talk.wav");
    write_wav(&path, &synthesize(&tones, 500.0, Background::Digital), 1, 16)?;

    let output = align_wav(&path, PipelineConfig::default())?;
    check_segments(&output, &tones)?;
    if output.silence.len() != 4 {
        return Err(format!("expected 4 silences, got {:?}", output.silence).into());
    }
    Ok(())
}

fn voice_band_over_hiss() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("hiss");
    let path = dir.join("talk.wav");
    let background = Background::Hiss(StdRng::seed_from_u64(7));
    write_wav(&path, &synthesize(&tones, 500.0, background), 1, 16)?;

    let output = align_wav(&path, PipelineConfig::default())?;
    check_segments(&output, &tones)
}

fn consensus_over_digital_silence() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("consensus");
    let path = dir.join("talk.wav");
    write_wav(&path, &synthesize(&tones, 2000.0, Background::Digital), 1, 16)?;

    let config = PipelineConfig {
        vad: VadConfig::for_mode(VadMode::Consensus),
        ..PipelineConfig::default()
    };
    let output = align_wav(&path, config)?;
    check_segments(&output, &tones)
}

fn stereo_24_bit_wav_matches_raw_pcm() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let mono = synthesize(&tones, 500.0, Background::Hiss(StdRng::seed_from_u64(99)));
    let dir = scratch_dir("stereo24");
    let wav_path = dir.join("talk.wav");
    write_wav(&wav_path, &mono, 2, 24)?;

    let pcm_path = dir.join("talk.pcm");
    let mut raw = File::create(&pcm_path)?;
    for &sample in &mono {
        let value = (sample * 256.0).round() as i32;
        let bytes = value.to_le_bytes();
        raw.write_all(&bytes[..3])?;
        raw.write_all(&bytes[..3])?;
    }
    drop(raw);

    let aligner = build(PipelineConfig::default());
    let from_wav = aligner.detect_silence(&mut WavSource::open(&wav_path)?)?;
    let format = PcmFormat {
        sample_rate_hz: RATE,
        channels: 2,
        sample_width_bytes: 3,
    };
    let mut pcm = PcmSource::new(
        BufReader::new(File::open(&pcm_path)?),
        format,
        mono.len() as u64,
    )?;
    let from_pcm = aligner.detect_silence(&mut pcm)?;
    if from_wav != from_pcm {
        return Err(format!("WAV {from_wav:?} != PCM {from_pcm:?}").into());
    }

    let output = aligner.align_sentences(aligner.sentences(SCRIPT), from_pcm)?;
    check_segments(&output, &tones)
}

fn legacy_longest_intervals() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("legacy");
    let path = dir.join("talk.wav");
    write_wav(&path, &synthesize(&tones, 500.0, Background::Digital), 1, 16)?;

    let mut config = PipelineConfig::default();
    config.aligner.strategy = BoundaryStrategy::LongestIntervals;
    let output = align_wav(&path, config)?;
    check_segments(&output, &tones)
}

fn legacy_fails_without_enough_silence() -> Result<(), Failed> {
    let tones = [1000, 1200];
    let dir = scratch_dir("legacy-short");
    let path = dir.join("talk.wav");
    write_wav(&path, &synthesize(&tones, 500.0, Background::Digital), 1, 16)?;

    let mut config = PipelineConfig::default();
    config.aligner.strategy = BoundaryStrategy::LongestIntervals;
    match align_wav(&path, config) {
        Err(AlignmentError::InsufficientIntervals {
            required: 4,
            available: 3,
        }) => Ok(()),
        other => Err(format!("expected InsufficientIntervals, got {other:?}").into()),
    }
}

fn lsfm_mode_yields_one_segment_per_sentence() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("lsfm");
    let path = dir.join("talk.wav");
    let mut mono = synthesize(&[], 500.0, Background::Hiss(StdRng::seed_from_u64(5)));
    mono.extend(synthesize(&tones, 500.0, Background::Hiss(StdRng::seed_from_u64(6))));
    write_wav(&path, &mono, 1, 16)?;

    let config = PipelineConfig {
        vad: VadConfig::for_mode(VadMode::Lsfm),
        ..PipelineConfig::default()
    };
    let output = align_wav(&path, config)?;
    if output.segments.len() != tones.len() {
        return Err(format!("expected {} segments, got {:?}", tones.len(), output.segments).into());
    }
    let duration_ms = output.silence.duration_ms();
    let ordered = output
        .segments
        .windows(2)
        .all(|w| w[0].interval.end_ms() <= w[1].interval.begin_ms());
    if !ordered || output.segments.iter().any(|s| s.interval.end_ms() > duration_ms) {
        return Err(format!("segments out of order: {:?}", output.segments).into());
    }
    Ok(())
}

fn subrip_round_trip() -> Result<(), Failed> {
    let tones = tone_lengths_ms(SCRIPT);
    let dir = scratch_dir("srt");
    let path = dir.join("talk.wav");
    write_wav(&path, &synthesize(&tones, 500.0, Background::Digital), 1, 16)?;

    let output = align_wav(&path, PipelineConfig::default())?;
    let track = SubtitleTrack::from_segments(&output.segments)?;
    let srt_path = dir.join("talk.srt");
    track.save(&srt_path)?;
    let loaded = SubtitleTrack::load(&srt_path)?;
    if loaded != track {
        return Err(format!("round trip changed track:\n{}", track.to_srt()).into());
    }
    let second = loaded.cue_at(LEAD_MS + tones[0] + GAP_MS + 1).map(|c| c.text.as_str());
    if second != Some("Then a second one follows!") {
        return Err(format!("unexpected cue {second:?}").into());
    }
    Ok(())
}

fn short_audio_is_malformed() -> Result<(), Failed> {
    let dir = scratch_dir("short");
    let path = dir.join("blip.wav");
    write_wav(&path, &vec![0.0; samples_for(200)], 1, 16)?;
    match align_wav(&path, PipelineConfig::default()) {
        Err(AlignmentError::MalformedAudio { .. }) => Ok(()),
        other => Err(format!("expected MalformedAudio, got {other:?}").into()),
    }
}
