use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use subalign::alignment::report::{build_report, ReportMeta};
use subalign::{
    BoundaryStrategy, PcmFormat, PcmSource, PipelineConfig, SampleSource, SubtitleAligner,
    SubtitleAlignerBuilder, SubtitleTrack, VadConfig, VadMode, WavSource,
};
use tracing_subscriber::EnvFilter;

#[path = "audio2subs/output_writers.rs"]
mod output_writers;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ModeChoice {
    #[value(name = "voice-band")]
    VoiceBand,
    Consensus,
    Lsfm,
}

impl ModeChoice {
    fn vad_mode(self) -> VadMode {
        match self {
            Self::VoiceBand => VadMode::VoiceBand,
            Self::Consensus => VadMode::Consensus,
            Self::Lsfm => VadMode::Lsfm,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "audio2subs")]
#[command(about = "Generate SubRip subtitles for a speech recording from its script")]
struct Args {
    /// Speech recording: a WAV file, or headerless PCM with --pcm-sample-rate.
    audio_path: PathBuf,
    /// Script text, or the path of a file holding it.
    text: String,
    /// Where to write subtitles; defaults to the audio path with an .srt extension.
    subtitles_path: Option<PathBuf>,
    #[arg(long, env = "AUDIO2SUBS_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "AUDIO2SUBS_MODE", value_enum)]
    mode: Option<ModeChoice>,
    /// Use the n+1 longest silences instead of the adaptive boundary search.
    #[arg(long, default_value_t = false)]
    legacy: bool,
    /// Also write a JSON alignment report here.
    #[arg(long, env = "AUDIO2SUBS_REPORT")]
    report: Option<PathBuf>,
    /// Print detected silence intervals to stdout.
    #[arg(long, default_value_t = false)]
    dump_silence: bool,
    #[arg(long)]
    pcm_sample_rate: Option<u32>,
    #[arg(long, default_value_t = 1)]
    pcm_channels: u16,
    #[arg(long, default_value_t = 2)]
    pcm_width: u16,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(message) = run() {
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = resolve_config(&args)?;
    let aligner = SubtitleAlignerBuilder::new(config)
        .build()
        .map_err(|err| format!("Failed to set up aligner: {err}"))?;

    let text = load_text(&args.text);
    let sentences = aligner.sentences(&text);
    if sentences.is_empty() {
        return Err("The script contains no sentences.".to_string());
    }

    let mut source = open_audio(&args)?;
    let silence = aligner
        .detect_silence(source.as_mut())
        .map_err(|err| format!("Failed to analyse '{}': {err}", args.audio_path.display()))?;
    if args.dump_silence {
        output_writers::write_silence_listing(&mut std::io::stdout().lock(), &silence)?;
    }

    let output = aligner
        .align_sentences(sentences, silence)
        .map_err(|err| format!("Failed to align script: {err}"))?;
    let track = SubtitleTrack::from_segments(&output.segments).map_err(|err| err.to_string())?;

    let subtitles_path = args
        .subtitles_path
        .clone()
        .unwrap_or_else(|| args.audio_path.with_extension("srt"));
    track
        .save(&subtitles_path)
        .map_err(|err| format!("Failed to write '{}': {err}", subtitles_path.display()))?;
    tracing::info!(
        path = %subtitles_path.display(),
        cues = track.len(),
        "wrote subtitles"
    );

    if let Some(report_path) = args.report.as_ref() {
        let report = build_report(&output, report_meta(&args, &aligner));
        output_writers::write_report_json(report_path, &report)?;
        println!("{}", report_path.display());
    }
    println!("{}", subtitles_path.display());
    Ok(())
}

fn resolve_config(args: &Args) -> Result<PipelineConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => PipelineConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(mode) = args.mode {
        if args.config.is_some() {
            config.vad.mode = mode.vad_mode();
        } else {
            config.vad = VadConfig::for_mode(mode.vad_mode());
        }
    }
    if args.legacy {
        config.aligner.strategy = BoundaryStrategy::LongestIntervals;
    }
    Ok(config)
}

fn load_text(arg: &str) -> String {
    match std::fs::read_to_string(arg) {
        Ok(text) => text,
        Err(err) => {
            tracing::info!(error = %err, "text argument is not a readable file; using it as the script");
            arg.to_string()
        }
    }
}

fn open_audio(args: &Args) -> Result<Box<dyn SampleSource>, String> {
    let Some(sample_rate_hz) = args.pcm_sample_rate else {
        let wav = WavSource::open(&args.audio_path)
            .map_err(|err| format!("Failed to open '{}': {err}", args.audio_path.display()))?;
        return Ok(Box::new(wav));
    };

    let format = PcmFormat {
        sample_rate_hz,
        channels: args.pcm_channels,
        sample_width_bytes: args.pcm_width,
    };
    let file = File::open(&args.audio_path)
        .map_err(|err| format!("Failed to open '{}': {err}", args.audio_path.display()))?;
    let bytes = file
        .metadata()
        .map_err(|err| format!("Failed to stat '{}': {err}", args.audio_path.display()))?
        .len();
    let frame_bytes = (format.channels as u64 * format.sample_width_bytes as u64).max(1);
    let pcm = PcmSource::new(BufReader::new(file), format, bytes / frame_bytes)
        .map_err(|err| format!("Failed to read '{}': {err}", args.audio_path.display()))?;
    Ok(Box::new(pcm))
}

fn report_meta(args: &Args, aligner: &SubtitleAligner) -> ReportMeta {
    ReportMeta {
        generated_at: Utc::now().to_rfc3339(),
        audio_path: display_path(&args.audio_path),
        detector: aligner.config().vad.mode.as_str().to_string(),
        aligner: aligner.aligner_name().to_string(),
    }
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
