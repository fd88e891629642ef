use crate::error::Result;
use crate::types::{PcmBuffer, StreamFormat};

/// Trait for audio output sinks (WAV file, memory, etc.)
pub trait AudioSink {
    /// Get the name of this sink implementation
    fn name(&self) -> &'static str;

    /// Write one block of interleaved frames described by `format`
    fn write(&mut self, block: &PcmBuffer, format: &StreamFormat) -> Result<()>;

    /// Flush and close the sink; later writes fail
    fn finalize(&mut self) -> Result<()>;
}

impl<K: AudioSink + ?Sized> AudioSink for &mut K {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn write(&mut self, block: &PcmBuffer, format: &StreamFormat) -> Result<()> {
        (**self).write(block, format)
    }

    fn finalize(&mut self) -> Result<()> {
        (**self).finalize()
    }
}

/// Statistics for monitoring output sink activity
#[derive(Clone, Debug, Default)]
pub struct SinkStats {
    /// Total frames written
    pub frames_written: u64,
    /// Number of blocks written
    pub blocks_written: u64,
}
