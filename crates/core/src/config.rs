use crate::dsp_settings::CompressorSettings;
use crate::error::ConfigError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Default number of frames pulled through the chain per read
pub const DEFAULT_BLOCK_FRAMES: usize = 4096;

/// Sample format written to the output file
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 16-bit signed integer
    S16,
    /// 24-bit signed integer
    S24,
    /// 32-bit float
    #[default]
    F32,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::S16 => "s16",
            OutputFormat::S24 => "s24",
            OutputFormat::F32 => "f32",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "s16" => Ok(OutputFormat::S16),
            "s24" => Ok(OutputFormat::S24),
            "f32" => Ok(OutputFormat::F32),
            _ => Err(ConfigError::UnknownOutputFormat(s.to_string())),
        }
    }
}

/// Pipeline configuration, usually loaded from a TOML file
///
/// ```toml
/// block_frames = 2048
/// output_format = "s24"
///
/// [[compressor]]
/// threshold_db = -20.0
/// ratio = 4.0
/// knee_db = 6.0
/// attack_ms = 10.0
/// release_ms = 100.0
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Frames requested from the chain per read
    pub block_frames: usize,
    /// Output file sample format
    pub output_format: OutputFormat,
    /// Compressor stages, applied in order
    #[serde(rename = "compressor")]
    pub compressors: Vec<CompressorSettings>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            block_frames: DEFAULT_BLOCK_FRAMES,
            output_format: OutputFormat::default(),
            compressors: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: PipelineConfig =
            toml::from_str(text).context("Failed to parse pipeline config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        tracing::debug!(
            "Loaded config from {}: {} compressor stage(s), {} frames per block",
            path.display(),
            config.compressors.len(),
            config.block_frames
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.block_frames == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        self.compressors.iter().try_for_each(CompressorSettings::validate)
    }

    /// Compressor stages to build, falling back to a single default stage
    pub fn stages(&self) -> Vec<CompressorSettings> {
        if self.compressors.is_empty() {
            vec![CompressorSettings::default()]
        } else {
            self.compressors.clone()
        }
    }
}
