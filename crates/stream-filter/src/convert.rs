use crate::error::{Result, StreamError};
use crate::source::AudioSource;
use crate::types::{FloatWidth, PcmBuffer, SampleFormat};
use dasp_sample::{FloatSample, FromSample, ToSample, I24};

/// Amplitude floor applied before taking the logarithm (-200 dB)
pub const MIN_AMPLITUDE: f64 = 1e-10;

/// Convert linear amplitude to dB (with floor)
#[inline]
pub fn scale_to_db(x: f64) -> f64 {
    20.0 * x.max(MIN_AMPLITUDE).log10()
}

/// Convert dB to linear amplitude
#[inline]
pub fn db_to_scale(db: f64) -> f64 {
    10.0_f64.powf(db / 20.0)
}

/// Peak absolute value over the channels of one frame
#[inline]
pub fn frame_peak<T: PcmFloat>(frame: &[T]) -> f64 {
    frame
        .iter()
        .fold(0.0, |peak: f64, &s| peak.max(s.to_sample::<f64>().abs()))
}

/// Floating-point sample type a filter can process at (`f32` or `f64`)
pub trait PcmFloat:
    FloatSample
    + FromSample<i8>
    + FromSample<i16>
    + FromSample<I24>
    + FromSample<i32>
    + ToSample<i8>
    + ToSample<i16>
    + ToSample<I24>
    + ToSample<i32>
{
    const WIDTH: FloatWidth;

    /// Borrow the samples of a buffer holding this type
    fn samples(buffer: &PcmBuffer) -> Option<&[Self]>;

    /// Mutably borrow the sample vector of a buffer holding this type
    fn samples_mut(buffer: &mut PcmBuffer) -> Option<&mut Vec<Self>>;
}

impl PcmFloat for f32 {
    const WIDTH: FloatWidth = FloatWidth::F32;

    fn samples(buffer: &PcmBuffer) -> Option<&[Self]> {
        match buffer {
            PcmBuffer::F32(v) => Some(v),
            _ => None,
        }
    }

    fn samples_mut(buffer: &mut PcmBuffer) -> Option<&mut Vec<Self>> {
        match buffer {
            PcmBuffer::F32(v) => Some(v),
            _ => None,
        }
    }
}

impl PcmFloat for f64 {
    const WIDTH: FloatWidth = FloatWidth::F64;

    fn samples(buffer: &PcmBuffer) -> Option<&[Self]> {
        match buffer {
            PcmBuffer::F64(v) => Some(v),
            _ => None,
        }
    }

    fn samples_mut(buffer: &mut PcmBuffer) -> Option<&mut Vec<Self>> {
        match buffer {
            PcmBuffer::F64(v) => Some(v),
            _ => None,
        }
    }
}

/// Pull up to `max_frames` frames from `source` into `pivot`, then convert
/// them into `out` as normalized floats
///
/// `out` is cleared first and holds exactly `frames * channels` samples on
/// return. Returns the number of frames read.
pub fn read_as_float<S, T>(
    source: &mut S,
    pivot: &mut PcmBuffer,
    out: &mut Vec<T>,
    max_frames: usize,
) -> Result<usize>
where
    S: AudioSource + ?Sized,
    T: PcmFloat,
{
    let format = *source.format();
    let frames = source.read(pivot, max_frames)?;

    if pivot.sample_format() != format.sample_format {
        return Err(StreamError::FormatMismatch {
            expected: format.sample_format,
            actual: pivot.sample_format(),
        });
    }

    if pivot.len() != frames * format.channels as usize {
        return Err(StreamError::FrameCountMismatch {
            frames,
            samples: pivot.len(),
            channels: format.channels,
        });
    }

    buffer_to_float(pivot, out);

    Ok(frames)
}

/// Convert every sample of `input` into `out` as normalized floats
///
/// `out` is cleared first.
pub fn buffer_to_float<T: PcmFloat>(input: &PcmBuffer, out: &mut Vec<T>) {
    out.clear();
    out.reserve(input.len());
    match input {
        PcmBuffer::S8(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
        PcmBuffer::S16(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
        PcmBuffer::S24(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
        PcmBuffer::S32(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
        PcmBuffer::F32(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
        PcmBuffer::F64(v) => out.extend(v.iter().map(|&s| T::from_sample(s))),
    }
}

/// Convert float samples to the target sample format
pub fn convert_to_format<T: PcmFloat>(input: &[T], target_format: SampleFormat, output: &mut PcmBuffer) {
    output.prepare(target_format, 0);

    match output {
        PcmBuffer::S8(v) => v.extend(input.iter().map(|&s| s.to_sample::<i8>())),
        PcmBuffer::S16(v) => v.extend(input.iter().map(|&s| s.to_sample::<i16>())),
        PcmBuffer::S24(v) => v.extend(input.iter().map(|&s| s.to_sample::<I24>())),
        PcmBuffer::S32(v) => v.extend(input.iter().map(|&s| s.to_sample::<i32>())),
        PcmBuffer::F32(v) => v.extend(input.iter().map(|&s| s.to_sample::<f32>())),
        PcmBuffer::F64(v) => v.extend(input.iter().map(|&s| s.to_sample::<f64>())),
    }
}
