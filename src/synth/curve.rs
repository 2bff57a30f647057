use std::f64::consts::{PI, TAU};

use crate::animation::ease::Ease;
use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::{RandomSource, clamp01};
use crate::particles::system::ParticleSystem;
use crate::synth::layout::FlowLine;
use crate::synth::ribbon::RibbonSpec;

/// Spiral parameters for the homing ribbon.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HomingConfig {
    /// Orbit radius in pixels at homing progress 0.
    pub orbit_radius: f64,
    /// Spiral turns along the trail.
    pub turns: f64,
    /// Angular speed of the orbit in radians per second.
    pub spin_rate: f64,
    /// Points per homing frame.
    pub samples: usize,
    /// Easing of the reference point's travel toward the anchor. Linear by default.
    pub travel_ease: Ease,
}

impl Default for HomingConfig {
    fn default() -> Self {
        Self {
            orbit_radius: 90.0,
            turns: 1.25,
            spin_rate: 5.0,
            samples: 64,
            travel_ease: Ease::Linear,
        }
    }
}

/// Curve sampling parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Samples across the full path; a window gets a proportional share.
    pub samples_per_path: usize,
    /// How far beyond each canvas edge the flow line starts and ends, in pixels.
    pub overscan: f64,
    /// Easing applied to each ribbon's raw flow progress.
    pub flow_ease: Ease,
    /// Homing spiral.
    pub homing: HomingConfig,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            samples_per_path: 240,
            overscan: 80.0,
            flow_ease: Ease::OutQuad,
            homing: HomingConfig::default(),
        }
    }
}

/// Upper bound on any per-frame sample count.
pub const MAX_SAMPLES: usize = 4096;

impl SynthConfig {
    /// Reject sampling densities that cannot produce a curve or would allocate without bound.
    pub fn validate(&self) -> SilkflowResult<()> {
        let counts = [self.samples_per_path, self.homing.samples];
        if counts.iter().any(|&n| !(2..=MAX_SAMPLES).contains(&n)) {
            return Err(SilkflowError::validation(format!(
                "curve sample counts must be in 2..={MAX_SAMPLES}"
            )));
        }
        if !self.overscan.is_finite() || self.overscan < 0.0 {
            return Err(SilkflowError::validation("overscan must be >= 0"));
        }
        let h = &self.homing;
        if !(h.orbit_radius.is_finite() && h.orbit_radius >= 0.0)
            || !h.turns.is_finite()
            || !h.spin_rate.is_finite()
        {
            return Err(SilkflowError::validation(
                "homing spiral parameters must be finite with orbit_radius >= 0",
            ));
        }
        Ok(())
    }
}

/// Visible parameter range of a flowing ribbon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowWindow {
    /// `max(0, progress - length_fraction)`.
    pub start: f64,
    /// `progress`.
    pub end: f64,
}

impl FlowWindow {
    /// Window for `progress` and `length_fraction`, or `None` when it has zero width.
    pub fn new(progress: f64, length_fraction: f64) -> Option<Self> {
        let end = clamp01(progress);
        let start = (end - length_fraction).max(0.0);
        (end > start).then_some(Self { start, end })
    }

    /// Parameter span covered.
    pub fn span(&self) -> f64 {
        self.end - self.start
    }
}

/// How a ribbon frame was produced.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RibbonMode {
    /// Sliding window along the flow line.
    Flowing {
        /// Window emitted this frame, `None` when empty.
        window: Option<FlowWindow>,
    },
    /// Spiral converging on the anchor.
    Homing {
        /// Secondary progress in `[0, 1]`.
        progress: f64,
        /// Orbit radius this frame.
        orbit_radius: f64,
        /// Moving reference point.
        reference: Point,
    },
}

/// One ribbon's geometry for the current frame. Rebuilt every tick.
#[derive(Clone, Debug, PartialEq)]
pub struct RibbonFrame {
    /// Index into the configured ribbons.
    pub ribbon: usize,
    /// Ordered points; empty means "draw nothing".
    pub points: Vec<Point>,
    /// Palette parameter per point, same length as `points`.
    pub params: Vec<f64>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Nominal stroke width in pixels.
    pub stroke_width: f64,
    /// Production mode.
    pub mode: RibbonMode,
}

impl RibbonFrame {
    /// `true` when the renderer has something to stroke.
    pub fn is_drawable(&self) -> bool {
        self.points.len() >= 2 && self.opacity > 0.0
    }
}

/// Computes ribbon point sequences and sheds particles from them.
#[derive(Clone, Debug)]
pub struct CurveSynthesizer {
    config: SynthConfig,
}

impl CurveSynthesizer {
    /// Build a synthesizer.
    pub fn new(config: SynthConfig) -> Self {
        Self { config }
    }

    /// Sampling parameters.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Eased flow progress for a ribbon `flow_elapsed_ms` after flowing began.
    ///
    /// Delayed ribbons compress their travel so every ribbon reaches 1 at the end of flowing.
    pub fn flow_progress(&self, spec: &RibbonSpec, flow_elapsed_ms: f64, flow_ms: f64) -> f64 {
        let travel = (flow_ms - spec.start_delay_ms).max(f64::EPSILON);
        let raw = clamp01((flow_elapsed_ms - spec.start_delay_ms) / travel);
        self.config.flow_ease.apply(raw)
    }

    /// Normalized vertical displacement at `t`: the sinusoid mix times the `sin(pi t)` envelope.
    pub fn displacement(spec: &RibbonSpec, t: f64, time_s: f64) -> f64 {
        let envelope = (PI * t).sin();
        let n = spec.frequencies.len() as f64;
        let wave: f64 = spec
            .frequencies
            .iter()
            .enumerate()
            .map(|(k, f)| {
                // Higher harmonics drift a little faster so the mix never looks rigid.
                let speed = spec.wave_speed * (1.0 + 0.35 * k as f64);
                (TAU * f * t + spec.phase + speed * time_s).sin()
            })
            .sum();
        envelope * wave / n
    }

    /// Displaced point on the ribbon's path.
    pub fn point_at(spec: &RibbonSpec, line: &FlowLine, t: f64, time_s: f64) -> Point {
        let base = line.at(t);
        Point::new(
            base.x,
            base.y + line.amplitude_px * Self::displacement(spec, t, time_s),
        )
    }

    /// Flowing frame: points for `t` in `[max(0, progress - L), progress]`.
    pub fn flowing(
        &self,
        ribbon: usize,
        spec: &RibbonSpec,
        line: &FlowLine,
        progress: f64,
        time_s: f64,
        opacity: f64,
    ) -> RibbonFrame {
        let window = FlowWindow::new(progress, spec.length_fraction);
        let (points, params): (Vec<Point>, Vec<f64>) = match window {
            Some(w) => {
                let n = ((w.span() * self.config.samples_per_path as f64).ceil() as usize).max(1) + 1;
                (0..n)
                    .map(|i| {
                        let t = if i + 1 == n {
                            w.end
                        } else {
                            w.start + w.span() * i as f64 / (n - 1) as f64
                        };
                        (
                            Self::point_at(spec, line, t, time_s),
                            t + spec.palette_offset,
                        )
                    })
                    .unzip()
            }
            None => (Vec::new(), Vec::new()),
        };
        RibbonFrame {
            ribbon,
            points,
            params,
            opacity: clamp01(opacity),
            stroke_width: spec.stroke_width,
            mode: RibbonMode::Flowing { window },
        }
    }

    /// Homing frame: a spiral around a reference travelling from `from` to `anchor`.
    ///
    /// Orbit radius and opacity are both `1 - progress` scaled, so they hit zero together and the
    /// final frame is empty.
    pub fn homing(
        &self,
        ribbon: usize,
        spec: &RibbonSpec,
        from: Point,
        anchor: Point,
        progress: f64,
        time_s: f64,
    ) -> RibbonFrame {
        let h = &self.config.homing;
        let progress = clamp01(progress);
        let reference = from.lerp(anchor, h.travel_ease.apply(progress));
        let remaining = 1.0 - progress;
        let orbit_radius = h.orbit_radius * remaining;
        let opacity = remaining;

        let (points, params): (Vec<Point>, Vec<f64>) = if orbit_radius > 0.0 && opacity > 0.0 {
            let n = h.samples;
            let spin = h.spin_rate * time_s;
            (0..n)
                .map(|i| {
                    // s = 0 is the tail at the reference, s = 1 the head on the orbit.
                    let s = i as f64 / (n - 1) as f64;
                    let angle = spin + h.turns * TAU * s;
                    let p = reference + Vec2::from_angle(angle) * (orbit_radius * s);
                    (p, s + spec.palette_offset)
                })
                .unzip()
        } else {
            (Vec::new(), Vec::new())
        };

        RibbonFrame {
            ribbon,
            points,
            params,
            opacity,
            stroke_width: spec.stroke_width,
            mode: RibbonMode::Homing {
                progress,
                orbit_radius,
                reference,
            },
        }
    }

    /// Give every point of `frame` an independent chance to shed a spark.
    ///
    /// Returns the number of spawn calls made.
    pub fn emit(
        frame: &RibbonFrame,
        probability: f64,
        particles: &mut ParticleSystem,
        rng: &mut dyn RandomSource,
    ) -> usize {
        if !frame.is_drawable() {
            return 0;
        }
        let p = probability * frame.opacity;
        let mut calls = 0;
        for (point, param) in frame.points.iter().zip(&frame.params) {
            if rng.chance(p) {
                particles.spawn(*point, *param, rng);
                calls += 1;
            }
        }
        calls
    }
}

#[cfg(test)]
#[path = "../../tests/unit/synth/curve.rs"]
mod tests;
