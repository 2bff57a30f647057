use crate::foundation::core::{Canvas, Coord, Point};
use crate::synth::ribbon::RibbonSpec;

/// Off-screen to off-screen segment a flowing ribbon travels along.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowLine {
    /// Point at `t = 0`, left of the canvas.
    pub start: Point,
    /// Point at `t = 1`, right of the canvas.
    pub end: Point,
    /// Peak displacement in pixels.
    pub amplitude_px: f64,
}

impl FlowLine {
    /// Undisplaced point at path parameter `t`.
    pub fn at(&self, t: f64) -> Point {
        self.start.lerp(self.end, t)
    }
}

/// Everything derived from the canvas size. Rebuilt on every resize.
#[derive(Clone, Debug, PartialEq)]
pub struct Layout {
    /// Surface dimensions this layout was computed for.
    pub canvas: Canvas,
    /// Homing target in canvas pixels.
    pub anchor: Point,
    /// One flow line per ribbon, in ribbon order.
    pub lines: Vec<FlowLine>,
}

impl Layout {
    /// Resolve anchor and flow lines for `canvas`.
    pub fn compute(
        canvas: Canvas,
        anchor: (Coord, Coord),
        ribbons: &[RibbonSpec],
        overscan: f64,
    ) -> Self {
        let (w, h) = (canvas.w(), canvas.h());
        let lines = ribbons
            .iter()
            .map(|r| {
                let y = r.baseline * h;
                let rise = r.tilt * h * 0.5;
                FlowLine {
                    start: Point::new(-overscan, y + rise),
                    end: Point::new(w + overscan, y - rise),
                    amplitude_px: r.amplitude * h,
                }
            })
            .collect();
        Self {
            canvas,
            anchor: Point::new(anchor.0.resolve(w), anchor.1.resolve(h)),
            lines,
        }
    }
}
