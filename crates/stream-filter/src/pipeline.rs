use crate::dsp::Compressor;
use crate::error::Result;
use crate::sink::AudioSink;
use crate::source::AudioSource;
use crate::types::PcmBuffer;
use drc_core::{CompressorSettings, ConfigError};
use tracing::debug;

/// Totals reported by [`pump`]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Frames moved from source to sink
    pub frames: u64,
    /// Non-empty blocks written
    pub blocks: u64,
}

/// Wrap `source` in one compressor per entry of `stages`, in order
///
/// With no stages the source is returned unchanged.
pub fn build_chain<'a, S>(source: S, stages: &[CompressorSettings]) -> Result<Box<dyn AudioSource + 'a>>
where
    S: AudioSource + 'a,
{
    let mut chain: Box<dyn AudioSource + 'a> = Box::new(source);
    for (index, settings) in stages.iter().enumerate() {
        chain = Box::new(Compressor::new(chain, *settings)?);
        debug!("Stage {}: {} -> {}", index + 1, settings, chain.format());
    }
    Ok(chain)
}

/// Pull blocks of up to `block_frames` frames from `source` and write them
/// to `sink` until the source is exhausted, then finalize the sink
pub fn pump<S, K>(mut source: S, mut sink: K, block_frames: usize) -> Result<PumpStats>
where
    S: AudioSource,
    K: AudioSink,
{
    if block_frames == 0 {
        return Err(ConfigError::InvalidBlockSize.into());
    }

    let format = *source.format();
    let mut buffer = PcmBuffer::new(format.sample_format);
    let mut stats = PumpStats::default();

    loop {
        let frames = source.read(&mut buffer, block_frames)?;
        if frames == 0 {
            break;
        }
        sink.write(&buffer, &format)?;
        stats.frames += frames as u64;
        stats.blocks += 1;
    }

    sink.finalize()?;
    debug!(
        "Pumped {} frames in {} blocks to {} sink",
        stats.frames,
        stats.blocks,
        sink.name()
    );
    Ok(stats)
}
