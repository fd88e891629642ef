/// DSP (Digital Signal Processing) modules
///
/// Feed-forward dynamic range compression:
/// - Gain computer: static soft-knee curve in the dB domain
/// - Envelope: decoupled peak detector smoothing the target gain
/// - Compressor: streaming filter tying both to an upstream source
pub mod compressor;
pub mod envelope;
pub mod gain_computer;

// Re-export commonly used types for convenience
pub use compressor::{Compressor, CompressorStats};
pub use envelope::{EnvelopeCoefficients, EnvelopeFollower};
pub use gain_computer::GainComputer;
