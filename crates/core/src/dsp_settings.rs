use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Compressor settings for one filter stage
///
/// Stores the static gain curve (threshold, ratio, knee width) and the
/// envelope timing (attack, release). Settings are immutable once a filter
/// has been built from them.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressorSettings {
    /// Level in dB above which compression begins
    pub threshold_db: f64,
    /// Input change / output change above the threshold (4.0 = 4:1)
    pub ratio: f64,
    /// Width of the soft knee in dB centred on the threshold (0 = hard knee)
    pub knee_db: f64,
    /// Attack time in milliseconds (0 = instant)
    pub attack_ms: f64,
    /// Release time in milliseconds (0 = instant)
    pub release_ms: f64,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            threshold_db: -20.0,
            ratio: 4.0,
            knee_db: 6.0,
            attack_ms: 10.0,
            release_ms: 100.0,
        }
    }
}

impl CompressorSettings {
    /// Create compressor settings with custom values
    pub fn new(threshold_db: f64, ratio: f64, knee_db: f64, attack_ms: f64, release_ms: f64) -> Self {
        Self {
            threshold_db,
            ratio,
            knee_db,
            attack_ms,
            release_ms,
        }
    }

    /// Gain slope above the knee, `(1 - ratio) / ratio`
    pub fn slope(&self) -> f64 {
        (1.0 - self.ratio) / self.ratio
    }

    /// Check every field, rejecting values that would produce a non-finite
    /// gain curve or time constant
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.threshold_db.is_finite() {
            return Err(ConfigError::InvalidThreshold(self.threshold_db));
        }
        if !self.ratio.is_finite() || self.ratio <= 0.0 || !self.slope().is_finite() {
            return Err(ConfigError::InvalidRatio(self.ratio));
        }
        if !self.knee_db.is_finite() || self.knee_db < 0.0 {
            return Err(ConfigError::InvalidKneeWidth(self.knee_db));
        }
        if !self.attack_ms.is_finite() || self.attack_ms < 0.0 {
            return Err(ConfigError::InvalidAttack(self.attack_ms));
        }
        if !self.release_ms.is_finite() || self.release_ms < 0.0 {
            return Err(ConfigError::InvalidRelease(self.release_ms));
        }
        Ok(())
    }
}

/// Parses `threshold:ratio:knee:attack:release`, e.g. `-20:4:6:10:100`
impl FromStr for CompressorSettings {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ConfigError::InvalidStage {
            text: s.to_string(),
            reason,
        };

        let fields: Vec<&str> = s.split(':').map(str::trim).collect();
        if fields.len() != 5 {
            return Err(invalid(format!(
                "expected 5 colon-separated values, got {}",
                fields.len()
            )));
        }

        const NAMES: [&str; 5] = ["threshold", "ratio", "knee", "attack", "release"];
        let mut values = [0.0f64; 5];
        for (i, field) in fields.iter().enumerate() {
            values[i] = field
                .parse()
                .map_err(|_| invalid(format!("{} '{}' is not a number", NAMES[i], field)))?;
        }

        let settings = Self::new(values[0], values[1], values[2], values[3], values[4]);
        settings.validate()?;
        Ok(settings)
    }
}

impl fmt::Display for CompressorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}",
            self.threshold_db, self.ratio, self.knee_db, self.attack_ms, self.release_ms
        )
    }
}
