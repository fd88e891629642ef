use crate::error::Result;
use crate::types::{PcmBuffer, StreamFormat};

/// Pull-based audio source (file reader, in-memory data, or another filter)
///
/// Filters implement this trait too, so they compose into chains: each one
/// pulls from its upstream and is pulled by its downstream.
pub trait AudioSource {
    /// Get the format of the frames this source produces.
    /// Never changes after construction.
    fn format(&self) -> &StreamFormat;

    /// Read up to `max_frames` frames into `buffer`
    ///
    /// The buffer is switched to this source's sample format and holds
    /// exactly `frames * channels` samples afterwards. Returns the number of
    /// frames read, which may be short near the end of the stream; 0 means
    /// the source is exhausted.
    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize>;
}

impl<S: AudioSource + ?Sized> AudioSource for &mut S {
    fn format(&self) -> &StreamFormat {
        (**self).format()
    }

    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        (**self).read(buffer, max_frames)
    }
}

impl<S: AudioSource + ?Sized> AudioSource for Box<S> {
    fn format(&self) -> &StreamFormat {
        (**self).format()
    }

    fn read(&mut self, buffer: &mut PcmBuffer, max_frames: usize) -> Result<usize> {
        (**self).read(buffer, max_frames)
    }
}
