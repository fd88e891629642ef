use crate::types::SampleFormat;
use drc_core::ConfigError;
use thiserror::Error;

/// Errors raised while building or pulling from a stream
#[derive(Debug, Error)]
pub enum StreamError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("buffer holds {actual} samples but the stream declares {expected}")]
    FormatMismatch {
        expected: SampleFormat,
        actual: SampleFormat,
    },

    #[error("{samples} samples is not a whole number of {channels}-channel frames")]
    PartialFrame { samples: usize, channels: u16 },

    #[error("source reported {frames} frames but filled {samples} samples ({channels} channels)")]
    FrameCountMismatch {
        frames: usize,
        samples: usize,
        channels: u16,
    },

    #[error("sink '{0}' is already finalized")]
    SinkClosed(&'static str),
}

pub type Result<T, E = StreamError> = std::result::Result<T, E>;
