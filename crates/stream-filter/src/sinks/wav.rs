use crate::convert::{buffer_to_float, convert_to_format};
use crate::error::{Result, StreamError};
use crate::sink::{AudioSink, SinkStats};
use crate::types::{PcmBuffer, SampleFormat, StreamFormat};
use hound::{WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::{debug, warn};

/// WAV file sink backed by `hound`
///
/// Every block is converted to the sample format chosen at creation time.
/// `hound` cannot write 64-bit float, so 64-bit streams are narrowed.
pub struct WavSink<W: Write + Seek> {
    writer: Option<WavWriter<W>>,
    format: StreamFormat,
    /// Normalized copy of the incoming block
    scratch: Vec<f64>,
    /// Incoming block converted to the file's sample format
    encoded: PcmBuffer,
    warned_narrowing: bool,
    stats: SinkStats,
}

impl WavSink<BufWriter<File>> {
    /// Create `path` for a stream with the rate and channel count of
    /// `stream`, stored as `sample_format`
    pub fn create(
        path: impl AsRef<Path>,
        stream: &StreamFormat,
        sample_format: SampleFormat,
    ) -> Result<Self> {
        let path = path.as_ref();
        let spec = wav_spec(stream, sample_format)?;
        let sink = Self::with_writer(WavWriter::create(path, spec)?, stream, sample_format);
        debug!("Writing {} as {}", path.display(), sink.format);
        Ok(sink)
    }
}

impl<W: Write + Seek> WavSink<W> {
    pub fn new(writer: W, stream: &StreamFormat, sample_format: SampleFormat) -> Result<Self> {
        let spec = wav_spec(stream, sample_format)?;
        Ok(Self::with_writer(
            WavWriter::new(writer, spec)?,
            stream,
            sample_format,
        ))
    }

    fn with_writer(writer: WavWriter<W>, stream: &StreamFormat, sample_format: SampleFormat) -> Self {
        Self {
            writer: Some(writer),
            format: stream.with_sample_format(sample_format),
            scratch: Vec::new(),
            encoded: PcmBuffer::new(sample_format),
            warned_narrowing: false,
            stats: SinkStats::default(),
        }
    }

    /// Format of the file being written
    pub fn format(&self) -> &StreamFormat {
        &self.format
    }

    pub fn stats(&self) -> &SinkStats {
        &self.stats
    }
}

fn wav_spec(stream: &StreamFormat, sample_format: SampleFormat) -> Result<WavSpec> {
    let hound_format = match sample_format {
        SampleFormat::S8 | SampleFormat::S16 | SampleFormat::S24 | SampleFormat::S32 => {
            hound::SampleFormat::Int
        }
        SampleFormat::F32 => hound::SampleFormat::Float,
        SampleFormat::F64 => {
            return Err(StreamError::UnsupportedFormat(
                "64-bit float WAV output".to_string(),
            ))
        }
    };

    Ok(WavSpec {
        channels: stream.channels,
        sample_rate: stream.sample_rate,
        bits_per_sample: sample_format.bit_depth() as u16,
        sample_format: hound_format,
    })
}

fn write_all<W, S>(writer: &mut WavWriter<W>, samples: impl IntoIterator<Item = S>) -> Result<()>
where
    W: Write + Seek,
    S: hound::Sample,
{
    for sample in samples {
        writer.write_sample(sample)?;
    }
    Ok(())
}

impl<W: Write + Seek> AudioSink for WavSink<W> {
    fn name(&self) -> &'static str {
        "wav"
    }

    fn write(&mut self, block: &PcmBuffer, format: &StreamFormat) -> Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or(StreamError::SinkClosed("wav"))?;

        if format.sample_rate != self.format.sample_rate || format.channels != self.format.channels {
            return Err(StreamError::UnsupportedFormat(format!(
                "{} block for a {} file",
                format, self.format
            )));
        }
        if block.len() % format.channels as usize != 0 {
            return Err(StreamError::PartialFrame {
                samples: block.len(),
                channels: format.channels,
            });
        }

        if block.sample_format() == SampleFormat::F64 && !self.warned_narrowing {
            warn!(
                "Narrowing 64-bit float stream to {} for WAV output",
                self.format.sample_format
            );
            self.warned_narrowing = true;
        }

        buffer_to_float(block, &mut self.scratch);
        convert_to_format(&self.scratch, self.format.sample_format, &mut self.encoded);

        match &self.encoded {
            PcmBuffer::S8(v) => write_all(writer, v.iter().copied())?,
            PcmBuffer::S16(v) => write_all(writer, v.iter().copied())?,
            PcmBuffer::S24(v) => write_all(writer, v.iter().map(|s| s.inner()))?,
            PcmBuffer::S32(v) => write_all(writer, v.iter().copied())?,
            PcmBuffer::F32(v) => write_all(writer, v.iter().copied())?,
            PcmBuffer::F64(_) => {
                return Err(StreamError::UnsupportedFormat(
                    "64-bit float WAV output".to_string(),
                ))
            }
        }

        self.stats.frames_written += block.num_frames(format.channels) as u64;
        self.stats.blocks_written += 1;
        Ok(())
    }

    fn finalize(&mut self) -> Result<()> {
        match self.writer.take() {
            Some(writer) => {
                writer.finalize()?;
                debug!(
                    "WAV sink finalized: {} frames in {} blocks",
                    self.stats.frames_written, self.stats.blocks_written
                );
                Ok(())
            }
            None => Err(StreamError::SinkClosed("wav")),
        }
    }
}
