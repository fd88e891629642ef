//! Smooth, level-corrected decoupled peak detector
//!
//! Works in the log domain on the target gain from the gain computer. The
//! release stage tracks a decaying ceiling that snaps down immediately when
//! more reduction is asked for, and the attack stage smooths the output
//! towards that ceiling, which gives the fast-attack / slow-release shape.

/// Accumulator magnitudes below this are flushed to zero (denormal guard)
const DENORMAL_FLOOR: f64 = 1e-30;

/// Largest smoothing coefficient; keeps every coefficient strictly below 1
const MAX_COEFF: f64 = 1.0 - f64::EPSILON;

/// One-pole smoothing coefficients for the attack and release stages
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EnvelopeCoefficients {
    pub attack: f64,
    pub release: f64,
}

impl EnvelopeCoefficients {
    pub fn new(attack_ms: f64, release_ms: f64, sample_rate: u32) -> Self {
        Self {
            attack: Self::time_constant_to_coeff(attack_ms, sample_rate),
            release: Self::time_constant_to_coeff(release_ms, sample_rate),
        }
    }

    /// Convert time constant in ms to exponential smoothing coefficient.
    /// A zero time constant gives 0 (no smoothing).
    pub fn time_constant_to_coeff(time_ms: f64, sample_rate: u32) -> f64 {
        let seconds = time_ms / 1000.0;
        if seconds > 0.0 && sample_rate > 0 {
            (-1.0 / (seconds * sample_rate as f64)).exp().min(MAX_COEFF)
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvelopeFollower {
    /// Release-stage smoothed level (dB)
    release_db: f64,
    /// Attack-stage smoothed output gain (dB)
    attack_db: f64,
}

impl EnvelopeFollower {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one target gain and return the smoothed gain (dB)
    #[inline]
    pub fn smooth(&mut self, x: f64, coeffs: EnvelopeCoefficients) -> f64 {
        let released = coeffs.release * self.release_db + (1.0 - coeffs.release) * x;
        self.release_db = flush_denormal(x.min(released));
        self.attack_db = flush_denormal(
            coeffs.attack * self.attack_db + (1.0 - coeffs.attack) * self.release_db,
        );
        self.attack_db
    }

    /// Last smoothed gain returned by [`smooth`](Self::smooth)
    pub fn gain_db(&self) -> f64 {
        self.attack_db
    }

    pub fn release_stage_db(&self) -> f64 {
        self.release_db
    }

    /// Reset both stages to 0 dB
    pub fn reset(&mut self) {
        self.release_db = 0.0;
        self.attack_db = 0.0;
    }
}

#[inline]
fn flush_denormal(x: f64) -> f64 {
    if x.abs() < DENORMAL_FLOOR {
        0.0
    } else {
        x
    }
}
