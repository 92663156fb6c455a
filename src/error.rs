use thiserror::Error;

#[derive(Debug, Error)]
pub enum AlignmentError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("WAV decode error while {context}: {source}")]
    Wav {
        context: &'static str,
        #[source]
        source: hound::Error,
    },
    #[error("malformed audio: {message}")]
    MalformedAudio { message: String },
    #[error("interval order violation: {message}")]
    IntervalOrderViolation { message: String },
    #[error("not enough silence intervals: {required} required, {available} detected")]
    InsufficientIntervals { required: usize, available: usize },
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },
    #[error("subtitle parse error at line {line}: {message}")]
    SubtitleParse { line: usize, message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

impl AlignmentError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn wav(context: &'static str, source: hound::Error) -> Self {
        Self::Wav { context, source }
    }

    pub(crate) fn malformed_audio(message: impl Into<String>) -> Self {
        Self::MalformedAudio {
            message: message.into(),
        }
    }

    pub(crate) fn interval_order(message: impl Into<String>) -> Self {
        Self::IntervalOrderViolation {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn subtitle_parse(line: usize, message: impl Into<String>) -> Self {
        Self::SubtitleParse {
            line,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }
}
