//! Compressor - feed-forward dynamic range compression as a streaming filter
//!
//! Pulls frames from an upstream [`AudioSource`], measures the peak of each
//! frame across channels, runs it through the soft-knee gain computer and
//! the decoupled peak detector, and scales every sample of the frame by the
//! resulting gain. The compressor is itself an [`AudioSource`], so stages
//! can be chained.

use crate::convert::{self, db_to_scale, frame_peak, scale_to_db, PcmFloat};
use crate::dsp::envelope::{EnvelopeCoefficients, EnvelopeFollower};
use crate::dsp::gain_computer::GainComputer;
use crate::error::{Result, StreamError};
use crate::source::AudioSource;
use crate::types::{FloatWidth, PcmBuffer, StreamFormat};
use drc_core::{CompressorSettings, ConfigError};
use tracing::debug;

/// Running statistics for metering and logging
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CompressorStats {
    /// Frames processed since construction
    pub frames_processed: u64,
    /// Smoothed gain applied to the last frame (dB, 0 = no reduction)
    pub current_gain_db: f64,
    /// Largest gain reduction applied so far (dB, positive)
    pub max_reduction_db: f64,
}

pub struct Compressor<S: AudioSource> {
    source: S,
    settings: CompressorSettings,
    gain_computer: GainComputer,
    envelope: EnvelopeFollower,
    /// Output format: upstream rate and channels, float samples
    format: StreamFormat,
    width: FloatWidth,
    /// Scratch buffer for upstream samples, reused across reads
    pivot: PcmBuffer,
    exhausted: bool,
    stats: CompressorStats,
}

impl<S: AudioSource> Compressor<S> {
    /// Create a compressor pulling from `source`
    ///
    /// The output width is fixed here from the upstream format and never
    /// changes afterwards.
    pub fn new(source: S, settings: CompressorSettings) -> Result<Self> {
        let gain_computer = GainComputer::new(&settings)?;

        let upstream = *source.format();
        if upstream.sample_rate == 0 {
            return Err(ConfigError::InvalidSampleRate.into());
        }
        if upstream.channels == 0 {
            return Err(ConfigError::NoChannels.into());
        }

        let width = FloatWidth::for_upstream(upstream.sample_format);
        let format = upstream.with_sample_format(width.sample_format());

        debug!(
            "Compressor {} on {} -> {}{}",
            settings,
            upstream,
            format.sample_format,
            if gain_computer.is_hard_knee() { " (hard knee)" } else { "" }
        );

        Ok(Self {
            source,
            settings,
            gain_computer,
            envelope: EnvelopeFollower::new(),
            format,
            width,
            pivot: PcmBuffer::new(upstream.sample_format),
            exhausted: false,
            stats: CompressorStats::default(),
        })
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    pub fn gain_computer(&self) -> &GainComputer {
        &self.gain_computer
    }

    pub fn stats(&self) -> CompressorStats {
        self.stats
    }

    /// True once upstream has returned 0 frames
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Give back the upstream source
    pub fn into_inner(self) -> S {
        self.source
    }

    fn coefficients(&self) -> EnvelopeCoefficients {
        EnvelopeCoefficients::new(
            self.settings.attack_ms,
            self.settings.release_ms,
            self.format.sample_rate,
        )
    }

    fn read_as<T: PcmFloat>(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        // Sample rate is fixed for the stream, so one set per read is enough
        let coeffs = self.coefficients();

        let expected = T::WIDTH.sample_format();
        buffer.prepare(expected, 0);
        let actual = buffer.sample_format();
        let samples = T::samples_mut(buffer).ok_or(StreamError::FormatMismatch { expected, actual })?;

        let frames = convert::read_as_float(&mut self.source, &mut self.pivot, samples, max_frames)?;
        if frames == 0 {
            self.exhausted = true;
            debug!(
                "Compressor {} exhausted after {} frames, max reduction {:.2} dB",
                self.settings, self.stats.frames_processed, self.stats.max_reduction_db
            );
            return Ok(0);
        }

        let channels = self.format.channels as usize;
        for frame in samples.chunks_exact_mut(channels) {
            let x_l = frame_peak(frame);
            let x_g = scale_to_db(x_l);
            let y_g = self.gain_computer.compute_gain(x_g);
            let c_g = self.envelope.smooth(y_g, coeffs);
            let c_l = T::from_sample(db_to_scale(c_g));

            for sample in frame.iter_mut() {
                *sample = sample.mul_amp(c_l);
            }

            self.stats.current_gain_db = c_g;
            self.stats.max_reduction_db = self.stats.max_reduction_db.max(-c_g);
        }
        self.stats.frames_processed += frames as u64;

        Ok(frames)
    }
}

impl<S: AudioSource> AudioSource for Compressor<S> {
    fn format(&self) -> &StreamFormat {
        &self.format
    }

    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        // An empty request says nothing about the upstream
        if self.exhausted || max_frames == 0 {
            buffer.prepare(self.format.sample_format, 0);
            return Ok(0);
        }

        match self.width {
            FloatWidth::F32 => self.read_as::<f32>(buffer, max_frames),
            FloatWidth::F64 => self.read_as::<f64>(buffer, max_frames),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::MemorySource;
    use crate::types::SampleFormat;

    fn settings(threshold: f64, ratio: f64, knee: f64) -> CompressorSettings {
        CompressorSettings::new(threshold, ratio, knee, 10.0, 100.0)
    }

    fn mono_f32(samples: Vec<f32>) -> MemorySource {
        MemorySource::new(
            StreamFormat::new(44100, 1, SampleFormat::F32),
            PcmBuffer::F32(samples),
        )
        .unwrap()
    }

    struct FailingSource {
        format: StreamFormat,
    }

    impl AudioSource for FailingSource {
        fn format(&self) -> &StreamFormat {
            &self.format
        }

        fn read(&mut self, _buffer: &mut PcmBuffer, _max_frames: usize) -> Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated").into())
        }
    }

    #[test]
    fn test_output_format_follows_upstream_width() {
        let cases = [
            (SampleFormat::S8, SampleFormat::F32),
            (SampleFormat::S16, SampleFormat::F32),
            (SampleFormat::S24, SampleFormat::F32),
            (SampleFormat::S32, SampleFormat::F64),
            (SampleFormat::F32, SampleFormat::F32),
            (SampleFormat::F64, SampleFormat::F64),
        ];

        for (upstream, expected) in cases {
            let format = StreamFormat::new(48000, 2, upstream);
            let source = MemorySource::new(format, PcmBuffer::new(upstream)).unwrap();
            let compressor = Compressor::new(source, settings(-20.0, 4.0, 6.0)).unwrap();
            assert_eq!(compressor.format().sample_format, expected);
            assert_eq!(compressor.format().sample_rate, 48000);
            assert_eq!(compressor.format().channels, 2);
        }
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let result = Compressor::new(mono_f32(vec![]), settings(-20.0, 0.0, 6.0));
        assert!(matches!(
            result,
            Err(StreamError::Config(ConfigError::InvalidRatio(_)))
        ));

        let result = Compressor::new(mono_f32(vec![]), settings(-20.0, 4.0, -3.0));
        assert!(matches!(
            result,
            Err(StreamError::Config(ConfigError::InvalidKneeWidth(_)))
        ));
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        let source = FailingSource {
            format: StreamFormat::new(0, 2, SampleFormat::F32),
        };
        assert!(matches!(
            Compressor::new(source, settings(-20.0, 4.0, 6.0)),
            Err(StreamError::Config(ConfigError::InvalidSampleRate))
        ));
    }

    #[test]
    fn test_silence_passes_through() {
        let mut compressor =
            Compressor::new(mono_f32(vec![0.0; 1000]), settings(-60.0, 20.0, 0.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::F32);

        assert_eq!(compressor.read(&mut buffer, 1000).unwrap(), 1000);
        assert_eq!(buffer, PcmBuffer::F32(vec![0.0; 1000]));

        let stats = compressor.stats();
        assert_eq!(stats.frames_processed, 1000);
        assert_eq!(stats.current_gain_db, 0.0);
        assert_eq!(stats.max_reduction_db, 0.0);
    }

    #[test]
    fn test_unity_ratio_is_bit_exact() {
        let input: Vec<f32> = (0..2000).map(|i| ((i as f32) * 0.01).sin() * 0.9).collect();
        let mut compressor =
            Compressor::new(mono_f32(input.clone()), settings(-40.0, 1.0, 6.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::F32);

        assert_eq!(compressor.read(&mut buffer, 4096).unwrap(), 2000);
        assert_eq!(buffer, PcmBuffer::F32(input));
    }

    #[test]
    fn test_gain_applied_uniformly_from_peak_channel() {
        // Left is loud, right is quiet: both get the same gain
        let format = StreamFormat::new(44100, 2, SampleFormat::F32);
        let mut samples = Vec::new();
        for _ in 0..4410 {
            samples.push(0.5f32);
            samples.push(0.05f32);
        }
        let source = MemorySource::new(format, PcmBuffer::F32(samples)).unwrap();
        let mut compressor = Compressor::new(source, settings(-20.0, 4.0, 0.0)).unwrap();

        let mut buffer = PcmBuffer::new(SampleFormat::F32);
        compressor.read(&mut buffer, 4410).unwrap();
        let out = f32::samples(&buffer).unwrap();

        let (left, right) = (out[out.len() - 2], out[out.len() - 1]);
        assert!(left < 0.5 * 0.7);
        assert!((left / right - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_short_reads_propagate_and_exhaust() {
        let mut compressor =
            Compressor::new(mono_f32(vec![0.25; 150]), settings(-20.0, 4.0, 6.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::F32);

        assert_eq!(compressor.read(&mut buffer, 100).unwrap(), 100);
        assert_eq!(buffer.len(), 100);
        assert!(!compressor.is_exhausted());

        assert_eq!(compressor.read(&mut buffer, 100).unwrap(), 50);
        assert_eq!(buffer.len(), 50);

        assert_eq!(compressor.read(&mut buffer, 100).unwrap(), 0);
        assert!(buffer.is_empty());
        assert!(compressor.is_exhausted());

        assert_eq!(compressor.read(&mut buffer, 100).unwrap(), 0);
        assert_eq!(compressor.stats().frames_processed, 150);
        assert_eq!(compressor.into_inner().remaining_frames(), 0);
    }

    #[test]
    fn test_zero_frame_request_does_not_exhaust() {
        let mut compressor =
            Compressor::new(mono_f32(vec![0.5; 100]), settings(-20.0, 4.0, 6.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::S16);

        assert_eq!(compressor.read(&mut buffer, 0).unwrap(), 0);
        assert_eq!(buffer, PcmBuffer::F32(vec![]));
        assert!(!compressor.is_exhausted());
        assert_eq!(compressor.source().remaining_frames(), 100);

        assert_eq!(compressor.read(&mut buffer, 50).unwrap(), 50);
        assert_eq!(buffer.len(), 50);
        assert_eq!(compressor.stats().frames_processed, 50);
        assert_eq!(compressor.source().remaining_frames(), 50);
    }

    /// Reports fewer frames than it writes into the buffer
    struct OverfillingSource {
        format: StreamFormat,
    }

    impl AudioSource for OverfillingSource {
        fn format(&self) -> &StreamFormat {
            &self.format
        }

        fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
            let channels = self.format.channels as usize;
            buffer.prepare(self.format.sample_format, (max_frames + 1) * channels);
            Ok(max_frames)
        }
    }

    #[test]
    fn test_overfilled_upstream_block_rejected() {
        let source = OverfillingSource {
            format: StreamFormat::new(44100, 2, SampleFormat::S16),
        };
        let mut compressor = Compressor::new(source, settings(-20.0, 4.0, 6.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::F32);

        let err = compressor.read(&mut buffer, 8).unwrap_err();
        assert!(matches!(
            err,
            StreamError::FrameCountMismatch {
                frames: 8,
                samples: 18,
                channels: 2
            }
        ));
        assert!(!compressor.is_exhausted());
        assert_eq!(compressor.stats().frames_processed, 0);
    }

    #[test]
    fn test_upstream_errors_propagate() {
        let source = FailingSource {
            format: StreamFormat::new(44100, 2, SampleFormat::S16),
        };
        let mut compressor = Compressor::new(source, settings(-20.0, 4.0, 6.0)).unwrap();
        let mut buffer = PcmBuffer::new(SampleFormat::F32);

        let err = compressor.read(&mut buffer, 64).unwrap_err();
        assert!(matches!(err, StreamError::Io(_)));
        assert!(!compressor.is_exhausted());
    }

    #[test]
    fn test_64_bit_processing() {
        let format = StreamFormat::new(48000, 1, SampleFormat::S32);
        let data = PcmBuffer::S32(vec![i32::MAX / 2; 48000]);
        let source = MemorySource::new(format, data).unwrap();
        let mut compressor = Compressor::new(source, settings(-20.0, 4.0, 0.0)).unwrap();

        let mut buffer = PcmBuffer::new(SampleFormat::F32);
        assert_eq!(compressor.read(&mut buffer, 48000).unwrap(), 48000);
        assert_eq!(buffer.sample_format(), SampleFormat::F64);

        // 0.5 is about -6 dB: 14 dB over, settles near -10.5 dB of gain
        let expected = -0.75 * (scale_to_db(0.5) + 20.0);
        let out = f64::samples(&buffer).unwrap();
        let gain_db = scale_to_db(out[47999] / 0.5);
        assert!((gain_db - expected).abs() < 0.01);
        assert!((compressor.stats().max_reduction_db + expected).abs() < 0.01);
    }

    #[test]
    fn test_state_carries_across_reads() {
        let input = vec![0.5f32; 2000];
        let mut whole = Compressor::new(mono_f32(input.clone()), settings(-20.0, 4.0, 6.0)).unwrap();
        let mut split = Compressor::new(mono_f32(input), settings(-20.0, 4.0, 6.0)).unwrap();

        let mut buffer = PcmBuffer::new(SampleFormat::F32);
        whole.read(&mut buffer, 2000).unwrap();
        let expected = f32::samples(&buffer).unwrap().to_vec();

        let mut collected = Vec::new();
        while split.read(&mut buffer, 137).unwrap() > 0 {
            collected.extend_from_slice(f32::samples(&buffer).unwrap());
        }
        assert_eq!(collected, expected);
    }

    #[test]
    fn test_chained_compressors() {
        let first = Compressor::new(mono_f32(vec![0.9; 44100]), settings(-20.0, 2.0, 0.0)).unwrap();
        let mut second = Compressor::new(first, settings(-20.0, 2.0, 0.0)).unwrap();
        assert_eq!(second.format().sample_format, SampleFormat::F32);

        let mut buffer = PcmBuffer::new(SampleFormat::F32);
        assert_eq!(second.read(&mut buffer, 44100).unwrap(), 44100);

        // Each 2:1 stage halves the overshoot above -20 dB
        let level = scale_to_db(f32::samples(&buffer).unwrap()[44099] as f64);
        let input_level = scale_to_db(0.9f32 as f64);
        let expected = -20.0 + (input_level + 20.0) / 4.0;
        assert!((level - expected).abs() < 0.05);
        assert_eq!(second.source().stats().frames_processed, 44100);
    }
}
