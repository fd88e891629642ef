pub mod convert;
pub mod dsp;
pub mod error;
pub mod pipeline;
pub mod sink;
pub mod sinks;
pub mod source;
pub mod sources;
pub mod types;

pub use convert::*;
pub use dsp::{Compressor, CompressorStats, GainComputer};
pub use error::{Result, StreamError};
pub use pipeline::*;
pub use sink::*;
pub use sinks::WavSink;
pub use source::*;
pub use sources::{MemorySource, WavSource};
pub use types::*;
