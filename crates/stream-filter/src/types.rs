use dasp_sample::I24;
use serde::{Deserialize, Serialize};
use std::fmt;

/// In-memory sample representation of an interleaved PCM stream
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleFormat {
    /// 8-bit signed integer
    S8,
    /// 16-bit signed integer
    S16,
    /// 24-bit signed integer
    S24,
    /// 32-bit signed integer
    S32,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
}

impl SampleFormat {
    /// Get the bit depth
    pub fn bit_depth(&self) -> u8 {
        match self {
            SampleFormat::S8 => 8,
            SampleFormat::S16 => 16,
            SampleFormat::S24 => 24,
            SampleFormat::S32 | SampleFormat::F32 => 32,
            SampleFormat::F64 => 64,
        }
    }

    /// Check if this is a floating-point format
    pub fn is_float(&self) -> bool {
        matches!(self, SampleFormat::F64 | SampleFormat::F32)
    }

    /// Check if this is a signed integer format
    pub fn is_signed_integer(&self) -> bool {
        !self.is_float()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SampleFormat::S8 => "s8",
            SampleFormat::S16 => "s16",
            SampleFormat::S24 => "s24",
            SampleFormat::S32 => "s32",
            SampleFormat::F32 => "f32",
            SampleFormat::F64 => "f64",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<drc_core::OutputFormat> for SampleFormat {
    fn from(format: drc_core::OutputFormat) -> Self {
        match format {
            drc_core::OutputFormat::S16 => SampleFormat::S16,
            drc_core::OutputFormat::S24 => SampleFormat::S24,
            drc_core::OutputFormat::F32 => SampleFormat::F32,
        }
    }
}

/// Floating-point width a filter produces
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloatWidth {
    F32,
    F64,
}

impl FloatWidth {
    /// Pick the output width that preserves the upstream precision.
    ///
    /// 64-bit when the upstream depth exceeds 32 bits, or when it is a signed
    /// integer deeper than 24 bits; 32-bit otherwise.
    pub fn for_upstream(format: SampleFormat) -> Self {
        let bits = format.bit_depth();
        if bits > 32 || (format.is_signed_integer() && bits > 24) {
            FloatWidth::F64
        } else {
            FloatWidth::F32
        }
    }

    pub fn sample_format(&self) -> SampleFormat {
        match self {
            FloatWidth::F32 => SampleFormat::F32,
            FloatWidth::F64 => SampleFormat::F64,
        }
    }
}

/// Description of an interleaved PCM stream
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StreamFormat {
    /// Sample rate in Hz (e.g., 44100, 48000)
    pub sample_rate: u32,
    /// Number of interleaved channels
    pub channels: u16,
    /// Sample representation
    pub sample_format: SampleFormat,
}

impl StreamFormat {
    pub fn new(sample_rate: u32, channels: u16, sample_format: SampleFormat) -> Self {
        Self {
            sample_rate,
            channels,
            sample_format,
        }
    }

    /// Same rate and channel layout with a different sample representation
    pub fn with_sample_format(&self, sample_format: SampleFormat) -> Self {
        Self {
            sample_format,
            ..*self
        }
    }
}

impl fmt::Display for StreamFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Hz, {} ch, {}",
            self.sample_rate, self.channels, self.sample_format
        )
    }
}

/// Interleaved sample storage, one variant per [`SampleFormat`]
///
/// A source fills the buffer with whole frames only; after a read the
/// buffer holds exactly `frames * channels` samples.
#[derive(Clone, Debug, PartialEq)]
pub enum PcmBuffer {
    S8(Vec<i8>),
    S16(Vec<i16>),
    S24(Vec<I24>),
    S32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PcmBuffer {
    /// Create an empty buffer for the given format
    pub fn new(format: SampleFormat) -> Self {
        match format {
            SampleFormat::S8 => PcmBuffer::S8(Vec::new()),
            SampleFormat::S16 => PcmBuffer::S16(Vec::new()),
            SampleFormat::S24 => PcmBuffer::S24(Vec::new()),
            SampleFormat::S32 => PcmBuffer::S32(Vec::new()),
            SampleFormat::F32 => PcmBuffer::F32(Vec::new()),
            SampleFormat::F64 => PcmBuffer::F64(Vec::new()),
        }
    }

    pub fn sample_format(&self) -> SampleFormat {
        match self {
            PcmBuffer::S8(_) => SampleFormat::S8,
            PcmBuffer::S16(_) => SampleFormat::S16,
            PcmBuffer::S24(_) => SampleFormat::S24,
            PcmBuffer::S32(_) => SampleFormat::S32,
            PcmBuffer::F32(_) => SampleFormat::F32,
            PcmBuffer::F64(_) => SampleFormat::F64,
        }
    }

    /// Total number of samples across all channels
    pub fn len(&self) -> usize {
        match self {
            PcmBuffer::S8(v) => v.len(),
            PcmBuffer::S16(v) => v.len(),
            PcmBuffer::S24(v) => v.len(),
            PcmBuffer::S32(v) => v.len(),
            PcmBuffer::F32(v) => v.len(),
            PcmBuffer::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get the number of frames in this buffer
    pub fn num_frames(&self, channels: u16) -> usize {
        if channels == 0 {
            0
        } else {
            self.len() / channels as usize
        }
    }

    /// Switch to `format` (if needed) and size the buffer to `samples`
    /// zeroed samples, reusing the existing allocation when possible
    pub fn prepare(&mut self, format: SampleFormat, samples: usize) {
        if self.sample_format() != format {
            *self = PcmBuffer::new(format);
        }
        match self {
            PcmBuffer::S8(v) => v.resize(samples, 0),
            PcmBuffer::S16(v) => v.resize(samples, 0),
            PcmBuffer::S24(v) => v.resize(samples, I24::new_unchecked(0)),
            PcmBuffer::S32(v) => v.resize(samples, 0),
            PcmBuffer::F32(v) => v.resize(samples, 0.0),
            PcmBuffer::F64(v) => v.resize(samples, 0.0),
        }
    }

    /// Drop everything past the first `frames` frames
    pub fn truncate_frames(&mut self, frames: usize, channels: u16) {
        let samples = frames * channels as usize;
        match self {
            PcmBuffer::S8(v) => v.truncate(samples),
            PcmBuffer::S16(v) => v.truncate(samples),
            PcmBuffer::S24(v) => v.truncate(samples),
            PcmBuffer::S32(v) => v.truncate(samples),
            PcmBuffer::F32(v) => v.truncate(samples),
            PcmBuffer::F64(v) => v.truncate(samples),
        }
    }
}
