pub mod config;
pub mod dsp_settings;
pub mod error;

pub use config::*;
pub use dsp_settings::*;
pub use error::*;
