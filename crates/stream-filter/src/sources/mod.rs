/// Upstream audio sources
///
/// - Memory: interleaved samples held in a buffer (tests, generated signals)
/// - WAV: PCM files decoded with hound
pub mod memory;
pub mod wav;

pub use memory::MemorySource;
pub use wav::WavSource;
