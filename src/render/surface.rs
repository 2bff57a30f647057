use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::SilkflowResult;

/// Stroke parameters for one path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Line width in pixels.
    pub width: f64,
    /// Straight-alpha color.
    pub color: Rgba8,
    /// Gaussian blur radius in pixels; `0` draws a sharp stroke.
    pub blur: f64,
}

/// A 2D drawing target the renderer paints into.
///
/// Operations are infallible fire-and-forget draws; only sizing and presenting can fail. Round caps
/// and joins are expected for strokes.
pub trait Surface {
    /// Current dimensions.
    fn size(&self) -> Canvas;

    /// Reallocate for new dimensions.
    fn resize(&mut self, canvas: Canvas) -> SilkflowResult<()>;

    /// Clear every pixel to transparent.
    fn clear(&mut self);

    /// Stroke `path`.
    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle);

    /// Fill a circle.
    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8);

    /// Flush pending draws for this frame.
    fn present(&mut self) -> SilkflowResult<()> {
        Ok(())
    }
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn size(&self) -> Canvas {
        (**self).size()
    }

    fn resize(&mut self, canvas: Canvas) -> SilkflowResult<()> {
        (**self).resize(canvas)
    }

    fn clear(&mut self) {
        (**self).clear()
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        (**self).stroke_path(path, style)
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        (**self).fill_circle(center, radius, color)
    }

    fn present(&mut self) -> SilkflowResult<()> {
        (**self).present()
    }
}
