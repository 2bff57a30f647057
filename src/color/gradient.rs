use smallvec::SmallVec;

use crate::foundation::core::{Rgb8, Rgba8};
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::{clamp01, lerp};

/// One gradient stop: an RGB color pinned at `position` in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ColorStop {
    /// Stop position in `[0, 1]`.
    pub position: f64,
    /// Color at the stop.
    pub color: Rgb8,
}

impl ColorStop {
    /// Convenience constructor.
    pub const fn new(position: f64, color: Rgb8) -> Self {
        Self { position, color }
    }
}

/// Piecewise-linear palette over `[0, 1]`.
///
/// Built from at least two stops with strictly increasing positions. Lookups clamp their input,
/// never allocate, and return the stop color exactly when evaluated at a stop position.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<ColorStop>", into = "Vec<ColorStop>")]
pub struct Gradient {
    stops: SmallVec<[ColorStop; 8]>,
}

impl Gradient {
    /// Validate and build a gradient.
    pub fn new(stops: impl IntoIterator<Item = ColorStop>) -> SilkflowResult<Self> {
        let stops: SmallVec<[ColorStop; 8]> = stops.into_iter().collect();
        if stops.len() < 2 {
            return Err(SilkflowError::validation(
                "gradient needs at least two color stops",
            ));
        }
        for s in &stops {
            if !s.position.is_finite() || !(0.0..=1.0).contains(&s.position) {
                return Err(SilkflowError::validation(format!(
                    "gradient stop position {} is outside [0, 1]",
                    s.position
                )));
            }
        }
        if stops.windows(2).any(|w| w[1].position <= w[0].position) {
            return Err(SilkflowError::validation(
                "gradient stop positions must be strictly increasing",
            ));
        }
        Ok(Self { stops })
    }

    /// Built-in palettes whose stops are known to be valid.
    pub(crate) fn from_valid_stops(stops: &[ColorStop]) -> Self {
        debug_assert!(stops.windows(2).all(|w| w[0].position < w[1].position));
        Self {
            stops: stops.iter().copied().collect(),
        }
    }

    /// Stops in ascending position order.
    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Interpolated color at `progress` with straight `alpha` applied.
    pub fn color_at(&self, progress: f64, alpha: f64) -> Rgba8 {
        self.rgb_at(progress).with_alpha(alpha)
    }

    /// Interpolated RGB at `progress` (clamped to `[0, 1]`).
    pub fn rgb_at(&self, progress: f64) -> Rgb8 {
        let p = clamp01(progress);
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if p <= first.position {
            return first.color;
        }
        if p >= last.position {
            return last.color;
        }

        // First stop strictly after `p`; `first.position < p < last.position` keeps it in 1..len.
        let hi_idx = self.stops.partition_point(|s| s.position <= p);
        let lo = self.stops[hi_idx - 1];
        let hi = self.stops[hi_idx];
        let f = (p - lo.position) / (hi.position - lo.position);

        let channel = |a: u8, b: u8| -> u8 {
            lerp(f64::from(a), f64::from(b), f).round().clamp(0.0, 255.0) as u8
        };
        Rgb8::new(
            channel(lo.color.r, hi.color.r),
            channel(lo.color.g, hi.color.g),
            channel(lo.color.b, hi.color.b),
        )
    }
}

impl TryFrom<Vec<ColorStop>> for Gradient {
    type Error = SilkflowError;

    fn try_from(stops: Vec<ColorStop>) -> SilkflowResult<Self> {
        Self::new(stops)
    }
}

impl From<Gradient> for Vec<ColorStop> {
    fn from(g: Gradient) -> Self {
        g.stops.into_vec()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/color/gradient.rs"]
mod tests;
