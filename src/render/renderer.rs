use crate::color::gradient::Gradient;
use crate::foundation::core::{BezPath, Point, Rgb8, Vec2};
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::foundation::math::lerp;
use crate::particles::system::Particle;
use crate::render::surface::{StrokeStyle, Surface};
use crate::synth::curve::RibbonFrame;
use crate::timeline::controller::Phase;

/// Stroke and particle styling.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RenderStyle {
    /// Glow width as a multiple of the ribbon's stroke width.
    pub glow_width_scale: f64,
    /// Glow alpha before ribbon opacity.
    pub glow_alpha: f64,
    /// Glow blur radius in pixels.
    pub glow_blur: f64,
    /// Definition pass alpha before ribbon opacity.
    pub definition_alpha: f64,
    /// Draw the thin highlight pass.
    pub sheen: bool,
    /// Sheen width as a multiple of the stroke width.
    pub sheen_width_scale: f64,
    /// Upward sheen offset as a multiple of the stroke width.
    pub sheen_offset: f64,
    /// Sheen alpha before ribbon opacity.
    pub sheen_alpha: f64,
    /// Number of palette segments a ribbon is split into.
    pub color_segments: usize,
    /// Particle halo radius as a multiple of the core radius.
    pub halo_scale: f64,
    /// Halo alpha before particle opacity.
    pub halo_alpha: f64,
    /// Core alpha before particle opacity.
    pub core_alpha: f64,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            glow_width_scale: 3.5,
            glow_alpha: 0.35,
            glow_blur: 6.0,
            definition_alpha: 0.9,
            sheen: true,
            sheen_width_scale: 0.3,
            sheen_offset: 0.3,
            sheen_alpha: 0.45,
            color_segments: 12,
            halo_scale: 3.0,
            halo_alpha: 0.18,
            core_alpha: 0.85,
        }
    }
}

impl RenderStyle {
    /// Reject styles that cannot be drawn.
    pub fn validate(&self) -> SilkflowResult<()> {
        if self.color_segments == 0 {
            return Err(SilkflowError::validation("color_segments must be >= 1"));
        }
        for v in [
            self.glow_width_scale,
            self.glow_alpha,
            self.glow_blur,
            self.definition_alpha,
            self.sheen_width_scale,
            self.sheen_alpha,
            self.halo_scale,
            self.halo_alpha,
            self.core_alpha,
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(SilkflowError::validation(
                    "render style values must be finite and >= 0",
                ));
            }
        }
        if !self.sheen_offset.is_finite() {
            return Err(SilkflowError::validation("sheen_offset must be finite"));
        }
        Ok(())
    }
}

/// Immutable view of one tick's state handed to the renderer.
#[derive(Clone, Copy, Debug)]
pub struct FrameSnapshot<'a> {
    /// Phase at this tick.
    pub phase: Phase,
    /// Elapsed time at this tick.
    pub elapsed_ms: f64,
    /// Ribbon geometry for this tick.
    pub ribbons: &'a [RibbonFrame],
    /// Live particles.
    pub particles: &'a [Particle],
}

/// Counters from one [`Renderer::draw`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Ribbons that produced at least one stroke.
    pub ribbons_drawn: u32,
    /// Particles that produced fills.
    pub particles_drawn: u32,
    /// Stroke calls issued.
    pub strokes: u32,
    /// Circle fills issued.
    pub fills: u32,
}

/// Paints ribbons and particles onto a [`Surface`].
#[derive(Clone, Debug)]
pub struct Renderer {
    style: RenderStyle,
    palette: Gradient,
}

impl Renderer {
    /// Build a renderer coloring with `palette`.
    pub fn new(style: RenderStyle, palette: Gradient) -> Self {
        Self { style, palette }
    }

    /// Styling in use.
    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Smoothed path through `points`: a chain of quadratics whose control points are the samples
    /// and whose end points are the midpoints between neighbours.
    pub fn smooth_path(points: &[Point]) -> BezPath {
        let mut path = BezPath::new();
        let [first, .., last] = points else {
            return path;
        };
        path.move_to(*first);
        for pair in points[1..].windows(2) {
            path.quad_to(pair[0], pair[0].midpoint(pair[1]));
        }
        path.line_to(*last);
        path
    }

    /// Clear `surface` and draw one frame.
    pub fn draw<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        frame: &FrameSnapshot<'_>,
    ) -> RenderStats {
        let mut stats = RenderStats::default();
        surface.clear();

        for ribbon in frame.ribbons.iter().filter(|r| r.is_drawable()) {
            self.draw_ribbon(surface, ribbon, &mut stats);
            stats.ribbons_drawn += 1;
        }

        for particle in frame.particles {
            if self.draw_particle(surface, particle, &mut stats) {
                stats.particles_drawn += 1;
            }
        }

        if let Err(err) = surface.present() {
            tracing::warn!(error = %err, "present failed; frame dropped");
        }
        stats
    }

    fn draw_ribbon<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        ribbon: &RibbonFrame,
        stats: &mut RenderStats,
    ) {
        let s = &self.style;
        let width = ribbon.stroke_width;
        let chunk = ribbon.points.len().div_ceil(s.color_segments).max(1);

        // Consecutive chunks share their boundary point so the strokes join up.
        let mut segments = Vec::with_capacity(s.color_segments);
        let mut start = 0;
        while start + 1 < ribbon.points.len() {
            let end = (start + chunk).min(ribbon.points.len() - 1);
            let params = &ribbon.params[start..=end];
            let mid = params.iter().sum::<f64>() / params.len() as f64;
            segments.push((
                Self::smooth_path(&ribbon.points[start..=end]),
                self.palette.rgb_at(mid),
            ));
            start = end;
        }

        for (path, rgb) in &segments {
            surface.stroke_path(
                path,
                &StrokeStyle {
                    width: width * s.glow_width_scale,
                    color: rgb.with_alpha(s.glow_alpha * ribbon.opacity),
                    blur: s.glow_blur,
                },
            );
            stats.strokes += 1;
        }

        for (path, rgb) in &segments {
            surface.stroke_path(
                path,
                &StrokeStyle {
                    width,
                    color: rgb.with_alpha(s.definition_alpha * ribbon.opacity),
                    blur: 0.0,
                },
            );
            stats.strokes += 1;
        }

        if s.sheen {
            let offset = Vec2::new(0.0, -width * s.sheen_offset);
            let shifted: Vec<Point> = ribbon.points.iter().map(|p| *p + offset).collect();
            let mean = ribbon.params.iter().sum::<f64>() / ribbon.params.len() as f64;
            surface.stroke_path(
                &Self::smooth_path(&shifted),
                &StrokeStyle {
                    width: (width * s.sheen_width_scale).max(0.5),
                    color: toward_white(self.palette.rgb_at(mean), 0.6)
                        .with_alpha(s.sheen_alpha * ribbon.opacity),
                    blur: 0.0,
                },
            );
            stats.strokes += 1;
        }
    }

    fn draw_particle<S: Surface + ?Sized>(
        &self,
        surface: &mut S,
        particle: &Particle,
        stats: &mut RenderStats,
    ) -> bool {
        let s = &self.style;
        let radius = particle.life_scaled_radius();
        let opacity = particle.opacity();
        if radius <= 0.0 || opacity <= 0.0 {
            return false;
        }
        surface.fill_circle(
            particle.position,
            radius * s.halo_scale,
            particle.color.scale_alpha(s.halo_alpha * opacity),
        );
        surface.fill_circle(
            particle.position,
            radius,
            particle.color.scale_alpha(s.core_alpha * opacity),
        );
        stats.fills += 2;
        true
    }
}

fn toward_white(c: Rgb8, amount: f64) -> Rgb8 {
    let mix = |v: u8| lerp(f64::from(v), 255.0, amount).round().clamp(0.0, 255.0) as u8;
    Rgb8::new(mix(c.r), mix(c.g), mix(c.b))
}

#[cfg(test)]
#[path = "../../tests/unit/render/renderer.rs"]
mod tests;
