use std::path::Path;

use anyhow::Context;
use smallvec::smallvec;

use crate::color::gradient::Gradient;
use crate::color::palette;
use crate::foundation::core::Coord;
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::particles::system::ParticleConfig;
use crate::playback::gate::DEFAULT_STORAGE_KEY;
use crate::render::renderer::RenderStyle;
use crate::synth::curve::SynthConfig;
use crate::synth::ribbon::RibbonSpec;
use crate::timeline::controller::TimelineConfig;

/// Homing target, one [`Coord`] per axis.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Anchor {
    /// Horizontal position.
    pub x: Coord,
    /// Vertical position.
    pub y: Coord,
}

impl Default for Anchor {
    fn default() -> Self {
        // Where the header logo sits.
        Self {
            x: Coord::Px(75.0),
            y: Coord::Px(56.0),
        }
    }
}

/// Complete description of one hero choreography.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ChoreographyConfig {
    /// Phase durations and reveal point.
    pub timeline: TimelineConfig,
    /// Ribbons in draw order. At most one may home.
    pub ribbons: Vec<RibbonSpec>,
    /// Palette for ribbons and sparks.
    pub palette: Gradient,
    /// Spark and mote emission.
    pub particles: ParticleConfig,
    /// Curve sampling and homing spiral.
    pub synth: SynthConfig,
    /// Stroke and particle styling.
    pub style: RenderStyle,
    /// Homing target.
    pub anchor: Anchor,
    /// Session storage key of the played flag.
    pub storage_key: String,
    /// Seed for the default random source.
    pub seed: u64,
    /// Nominal frame duration; particle motion is scaled by actual frame time over this.
    pub frame_ms: f64,
}

impl Default for ChoreographyConfig {
    fn default() -> Self {
        Self {
            timeline: TimelineConfig::default(),
            ribbons: default_ribbons(),
            palette: palette::autumn_silk(),
            particles: ParticleConfig::default(),
            synth: SynthConfig::default(),
            style: RenderStyle::default(),
            anchor: Anchor::default(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            seed: 0x5EED_0F_5115,
            frame_ms: 1000.0 / 60.0,
        }
    }
}

impl ChoreographyConfig {
    /// Parse a JSON document; missing fields take their defaults. The result is validated.
    pub fn from_json_str(json: &str) -> SilkflowResult<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| SilkflowError::serde(format!("choreography json: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON config file.
    ///
    /// I/O failures surface as [`SilkflowError::Other`] with the path attached.
    pub fn from_json_path(path: impl AsRef<Path>) -> SilkflowResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read choreography config from '{}'", path.display()))
            .map_err(SilkflowError::from)?;
        Self::from_json_str(&json)
    }

    /// Serialize to pretty JSON.
    pub fn to_json_string(&self) -> SilkflowResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SilkflowError::serde(e.to_string()))
    }

    /// Check every section and the cross-ribbon rules.
    pub fn validate(&self) -> SilkflowResult<()> {
        self.timeline.validate()?;
        self.particles.validate()?;
        self.synth.validate()?;
        self.style.validate()?;

        for r in &self.ribbons {
            r.validate()?;
            if r.start_delay_ms >= self.timeline.flow_ms {
                return Err(SilkflowError::validation(format!(
                    "ribbon '{}': start_delay_ms must be shorter than flow_ms",
                    r.id
                )));
            }
        }
        if self.ribbons.iter().filter(|r| r.homing).count() > 1 {
            return Err(SilkflowError::validation(
                "at most one ribbon may be homing",
            ));
        }
        if self.storage_key.is_empty() {
            return Err(SilkflowError::validation("storage_key must not be empty"));
        }
        if !(self.frame_ms.is_finite() && self.frame_ms > 0.0) {
            return Err(SilkflowError::validation("frame_ms must be > 0"));
        }
        for c in [self.anchor.x, self.anchor.y] {
            let v = match c {
                Coord::Px(v) | Coord::Fraction(v) => v,
            };
            if !v.is_finite() {
                return Err(SilkflowError::validation("anchor must be finite"));
            }
        }
        Ok(())
    }

    /// Index of the homing ribbon, if any.
    pub fn homing_ribbon(&self) -> Option<usize> {
        self.ribbons.iter().position(|r| r.homing)
    }
}

fn default_ribbons() -> Vec<RibbonSpec> {
    let ribbon = |id: &str, delay: f64, baseline: f64, tilt: f64, homing: bool| RibbonSpec {
        id: id.to_string(),
        start_delay_ms: delay,
        amplitude: 0.09,
        frequencies: smallvec![1.1, 2.3, 0.55],
        phase: baseline * 7.0,
        wave_speed: 1.4,
        stroke_width: 3.0,
        length_fraction: 0.45,
        baseline,
        tilt,
        palette_offset: baseline - 0.5,
        homing,
    };
    vec![
        RibbonSpec {
            amplitude: 0.12,
            stroke_width: 4.0,
            ..ribbon("lead", 0.0, 0.46, 0.18, true)
        },
        ribbon("upper", 180.0, 0.34, 0.12, false),
        RibbonSpec {
            frequencies: smallvec![0.9, 1.9, 3.1],
            wave_speed: 1.1,
            ..ribbon("lower", 320.0, 0.6, 0.22, false)
        },
        RibbonSpec {
            stroke_width: 2.0,
            length_fraction: 0.3,
            ..ribbon("thread", 460.0, 0.52, 0.08, false)
        },
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/engine/config.rs"]
mod tests;
