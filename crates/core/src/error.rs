use thiserror::Error;

/// Invalid compressor or pipeline configuration.
///
/// Raised when settings are constructed or validated, so that a bad value
/// never reaches the signal path as NaN or infinity.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    #[error("threshold must be finite, got {0} dB")]
    InvalidThreshold(f64),

    #[error("ratio must be finite and greater than 0, got {0}")]
    InvalidRatio(f64),

    #[error("knee width must be finite and non-negative, got {0} dB")]
    InvalidKneeWidth(f64),

    #[error("attack time must be finite and non-negative, got {0} ms")]
    InvalidAttack(f64),

    #[error("release time must be finite and non-negative, got {0} ms")]
    InvalidRelease(f64),

    #[error("sample rate must be greater than 0 Hz")]
    InvalidSampleRate,

    #[error("stream must have at least one channel")]
    NoChannels,

    #[error("block size must be greater than 0 frames")]
    InvalidBlockSize,

    #[error("invalid compressor stage '{text}': {reason}")]
    InvalidStage { text: String, reason: String },

    #[error("unknown output format '{0}' (expected s16, s24 or f32)")]
    UnknownOutputFormat(String),
}
