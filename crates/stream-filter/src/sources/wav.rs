use crate::error::{Result, StreamError};
use crate::source::AudioSource;
use crate::types::{PcmBuffer, SampleFormat, StreamFormat};
use dasp_sample::I24;
use hound::{WavReader, WavSpec};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// WAV file source backed by `hound`
///
/// Supports 8/16/24/32-bit integer and 32-bit float PCM.
pub struct WavSource<R: Read> {
    reader: WavReader<R>,
    format: StreamFormat,
}

impl WavSource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = Self::new(WavReader::open(path)?)?;
        debug!(
            "Opened {} ({}, {} frames)",
            path.display(),
            source.format,
            source.total_frames()
        );
        Ok(source)
    }
}

impl<R: Read> WavSource<R> {
    pub fn new(reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        let format = StreamFormat::new(spec.sample_rate, spec.channels, sample_format_for(&spec)?);
        Ok(Self { reader, format })
    }

    /// Frames in the file, as declared by its header
    pub fn total_frames(&self) -> u32 {
        self.reader.duration()
    }
}

fn sample_format_for(spec: &WavSpec) -> Result<SampleFormat> {
    match (spec.sample_format, spec.bits_per_sample) {
        (hound::SampleFormat::Int, 8) => Ok(SampleFormat::S8),
        (hound::SampleFormat::Int, 16) => Ok(SampleFormat::S16),
        (hound::SampleFormat::Int, 24) => Ok(SampleFormat::S24),
        (hound::SampleFormat::Int, 32) => Ok(SampleFormat::S32),
        (hound::SampleFormat::Float, 32) => Ok(SampleFormat::F32),
        (kind, bits) => Err(StreamError::UnsupportedFormat(format!(
            "{}-bit {:?} WAV",
            bits, kind
        ))),
    }
}

/// Pull up to `n` samples of type `S` and push them through `map`
fn read_samples<R, S, T>(
    reader: &mut WavReader<R>,
    out: &mut Vec<T>,
    n: usize,
    map: impl Fn(S) -> T,
) -> Result<()>
where
    R: Read,
    S: hound::Sample,
{
    for sample in reader.samples::<S>().take(n) {
        out.push(map(sample?));
    }
    Ok(())
}

impl<R: Read> AudioSource for WavSource<R> {
    fn format(&self) -> &StreamFormat {
        &self.format
    }

    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        let channels = self.format.channels;
        let n = max_frames * channels as usize;

        buffer.prepare(self.format.sample_format, 0);
        let reader = &mut self.reader;
        match buffer {
            PcmBuffer::S8(v) => read_samples(reader, v, n, |s: i8| s)?,
            PcmBuffer::S16(v) => read_samples(reader, v, n, |s: i16| s)?,
            PcmBuffer::S24(v) => read_samples(reader, v, n, |s: i32| I24::new_unchecked(s))?,
            PcmBuffer::S32(v) => read_samples(reader, v, n, |s: i32| s)?,
            PcmBuffer::F32(v) => read_samples(reader, v, n, |s: f32| s)?,
            PcmBuffer::F64(_) => {
                return Err(StreamError::UnsupportedFormat(
                    "64-bit float WAV".to_string(),
                ))
            }
        }

        // A truncated file may end mid-frame
        let frames = buffer.num_frames(channels);
        buffer.truncate_frames(frames, channels);
        Ok(frames)
    }
}
