use smallvec::SmallVec;

use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::clamp01;

/// Static description of one ribbon.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RibbonSpec {
    /// Identifier used in logs.
    pub id: String,
    /// Delay after flowing starts before this ribbon begins to advance.
    #[serde(default)]
    pub start_delay_ms: f64,
    /// Peak displacement as a fraction of canvas height.
    pub amplitude: f64,
    /// Spatial frequencies in cycles per path length. At least two, pairwise distinct.
    pub frequencies: SmallVec<[f64; 4]>,
    /// Phase offset in radians.
    #[serde(default)]
    pub phase: f64,
    /// Temporal wave speed in radians per second.
    pub wave_speed: f64,
    /// Nominal stroke width in pixels.
    pub stroke_width: f64,
    /// Visible window length as a fraction of the path, in `(0, 1]`.
    pub length_fraction: f64,
    /// Vertical baseline as a fraction of canvas height.
    pub baseline: f64,
    /// Rise of the flow line from left to right, as a fraction of canvas height.
    #[serde(default)]
    pub tilt: f64,
    /// Shift applied to path parameters before palette lookup.
    #[serde(default)]
    pub palette_offset: f64,
    /// Whether this ribbon detaches and homes onto the anchor.
    #[serde(default)]
    pub homing: bool,
}

impl RibbonSpec {
    /// Check waveform and geometry parameters.
    pub fn validate(&self) -> SilkflowResult<()> {
        let bad = |msg: &str| SilkflowError::validation(format!("ribbon '{}': {msg}", self.id));
        if self.frequencies.len() < 2 {
            return Err(bad("needs at least two spatial frequencies"));
        }
        if self.frequencies.iter().any(|f| !f.is_finite()) {
            return Err(bad("frequencies must be finite"));
        }
        for (i, a) in self.frequencies.iter().enumerate() {
            if self.frequencies[i + 1..].contains(a) {
                return Err(bad("frequencies must differ"));
            }
        }
        if !(self.length_fraction > 0.0 && self.length_fraction <= 1.0) {
            return Err(bad("length_fraction must be within (0, 1]"));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width > 0.0) {
            return Err(bad("stroke_width must be > 0"));
        }
        if !self.amplitude.is_finite() || self.amplitude < 0.0 {
            return Err(bad("amplitude must be >= 0"));
        }
        if !self.start_delay_ms.is_finite() || self.start_delay_ms < 0.0 {
            return Err(bad("start_delay_ms must be >= 0"));
        }
        for v in [
            self.phase,
            self.wave_speed,
            self.baseline,
            self.tilt,
            self.palette_offset,
        ] {
            if !v.is_finite() {
                return Err(bad("waveform parameters must be finite"));
            }
        }
        Ok(())
    }
}

/// Flow state captured when a later phase begins.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrozenFlow {
    /// Progress at the freeze.
    pub progress: f64,
    /// Wave time (seconds) at the phase boundary.
    pub time_s: f64,
}

/// Per-ribbon scalars carried between ticks. Geometry is re-derived from these every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RibbonState {
    progress: f64,
    frozen: Option<FrozenFlow>,
}

impl RibbonState {
    /// Flow progress in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Freeze snapshot, once a later phase began.
    pub fn frozen(&self) -> Option<FrozenFlow> {
        self.frozen
    }

    /// Raise progress to `candidate` (clamped). Ignored once frozen; never lowers it.
    pub fn advance_to(&mut self, candidate: f64) {
        if self.frozen.is_some() {
            return;
        }
        let c = clamp01(candidate);
        if c > self.progress {
            self.progress = c;
        }
    }

    /// Stop further progress. The first call wins.
    pub fn freeze(&mut self, boundary_time_s: f64) {
        if self.frozen.is_none() {
            self.frozen = Some(FrozenFlow {
                progress: self.progress,
                time_s: boundary_time_s,
            });
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/ribbon.rs"]
mod tests;
