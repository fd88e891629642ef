use crate::error::{Result, StreamError};
use crate::source::AudioSource;
use crate::types::{PcmBuffer, SampleFormat, StreamFormat};
use drc_core::ConfigError;

/// Source that plays back interleaved samples held in memory
#[derive(Clone, Debug)]
pub struct MemorySource {
    format: StreamFormat,
    data: PcmBuffer,
    /// Next frame to read
    position: usize,
}

impl MemorySource {
    /// Create a source over `data`, which must match the declared sample
    /// format and hold a whole number of frames
    pub fn new(format: StreamFormat, data: PcmBuffer) -> Result<Self> {
        if format.channels == 0 {
            return Err(ConfigError::NoChannels.into());
        }
        if data.sample_format() != format.sample_format {
            return Err(StreamError::FormatMismatch {
                expected: format.sample_format,
                actual: data.sample_format(),
            });
        }
        if data.len() % format.channels as usize != 0 {
            return Err(StreamError::PartialFrame {
                samples: data.len(),
                channels: format.channels,
            });
        }

        Ok(Self {
            format,
            data,
            position: 0,
        })
    }

    /// Interleaved 32-bit float samples
    pub fn from_f32(sample_rate: u32, channels: u16, samples: Vec<f32>) -> Result<Self> {
        Self::new(
            StreamFormat::new(sample_rate, channels, SampleFormat::F32),
            PcmBuffer::F32(samples),
        )
    }

    /// Interleaved 64-bit float samples
    pub fn from_f64(sample_rate: u32, channels: u16, samples: Vec<f64>) -> Result<Self> {
        Self::new(
            StreamFormat::new(sample_rate, channels, SampleFormat::F64),
            PcmBuffer::F64(samples),
        )
    }

    pub fn total_frames(&self) -> usize {
        self.data.num_frames(self.format.channels)
    }

    pub fn remaining_frames(&self) -> usize {
        self.total_frames() - self.position
    }
}

impl AudioSource for MemorySource {
    fn format(&self) -> &StreamFormat {
        &self.format
    }

    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        let channels = self.format.channels as usize;
        let frames = max_frames.min(self.remaining_frames());
        let start = self.position * channels;
        let end = start + frames * channels;

        buffer.prepare(self.format.sample_format, 0);
        match (&self.data, buffer) {
            (PcmBuffer::S8(src), PcmBuffer::S8(dst)) => dst.extend_from_slice(&src[start..end]),
            (PcmBuffer::S16(src), PcmBuffer::S16(dst)) => dst.extend_from_slice(&src[start..end]),
            (PcmBuffer::S24(src), PcmBuffer::S24(dst)) => dst.extend_from_slice(&src[start..end]),
            (PcmBuffer::S32(src), PcmBuffer::S32(dst)) => dst.extend_from_slice(&src[start..end]),
            (PcmBuffer::F32(src), PcmBuffer::F32(dst)) => dst.extend_from_slice(&src[start..end]),
            (PcmBuffer::F64(src), PcmBuffer::F64(dst)) => dst.extend_from_slice(&src[start..end]),
            (src, dst) => {
                return Err(StreamError::FormatMismatch {
                    expected: src.sample_format(),
                    actual: dst.sample_format(),
                })
            }
        }

        self.position += frames;
        Ok(frames)
    }
}
