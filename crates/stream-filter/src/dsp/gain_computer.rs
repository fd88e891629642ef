use drc_core::{CompressorSettings, ConfigError};

/// Static soft-knee gain curve, works in the log (dB) domain
///
/// Maps an input level to the gain change the compressor should apply:
/// no change below the knee, `slope * (x - threshold)` above it, and a
/// quadratic blend inside the knee that meets both lines with matching
/// value and slope.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GainComputer {
    threshold_db: f64,
    slope: f64,
    /// Lower knee bound, `threshold - knee / 2`
    knee_low_db: f64,
    /// Upper knee bound, `threshold + knee / 2`
    knee_high_db: f64,
    /// `slope / (2 * knee)`; `None` for a hard knee
    knee_factor: Option<f64>,
}

impl GainComputer {
    pub fn new(settings: &CompressorSettings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let slope = settings.slope();
        let half_knee = settings.knee_db / 2.0;
        let knee_factor = if settings.knee_db > 0.0 {
            Some(slope / (settings.knee_db * 2.0))
        } else {
            None
        };

        Ok(Self {
            threshold_db: settings.threshold_db,
            slope,
            knee_low_db: settings.threshold_db - half_knee,
            knee_high_db: settings.threshold_db + half_knee,
            knee_factor,
        })
    }

    /// Gain in dB for an input level in dB (0 or negative when compressing)
    #[inline]
    pub fn compute_gain(&self, x: f64) -> f64 {
        if x < self.knee_low_db {
            0.0
        } else if x > self.knee_high_db {
            self.slope * (x - self.threshold_db)
        } else {
            match self.knee_factor {
                Some(knee_factor) => {
                    let delta = x - self.knee_low_db;
                    delta * delta * knee_factor
                }
                // Hard knee: only reachable at exactly the threshold
                None => 0.0,
            }
        }
    }

    pub fn threshold_db(&self) -> f64 {
        self.threshold_db
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn knee_low_db(&self) -> f64 {
        self.knee_low_db
    }

    pub fn knee_high_db(&self) -> f64 {
        self.knee_high_db
    }

    pub fn is_hard_knee(&self) -> bool {
        self.knee_factor.is_none()
    }
}
