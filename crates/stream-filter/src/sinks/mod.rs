pub mod wav;

pub use wav::WavSink;
