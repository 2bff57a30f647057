use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::SilkflowResult;
use crate::render::surface::{StrokeStyle, Surface};

/// One recorded surface call.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// [`Surface::clear`].
    Clear,
    /// [`Surface::stroke_path`].
    Stroke {
        /// Path as drawn.
        path: BezPath,
        /// Style as drawn.
        style: StrokeStyle,
    },
    /// [`Surface::fill_circle`].
    FillCircle {
        /// Circle center.
        center: Point,
        /// Circle radius.
        radius: f64,
        /// Fill color.
        color: Rgba8,
    },
    /// [`Surface::present`].
    Present,
}

/// Surface that records calls instead of rasterizing.
///
/// Hosts can replay the list onto a platform canvas; it also makes frames easy to inspect.
#[derive(Clone, Debug)]
pub struct RecordingSurface {
    canvas: Canvas,
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    /// Empty recording for `canvas`.
    pub fn new(canvas: Canvas) -> Self {
        Self {
            canvas,
            commands: Vec::new(),
        }
    }

    /// Calls recorded since the last [`Surface::clear`].
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Recorded strokes.
    pub fn strokes(&self) -> impl Iterator<Item = (&BezPath, &StrokeStyle)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Stroke { path, style } => Some((path, style)),
            _ => None,
        })
    }

    /// Recorded circle fills as `(center, radius, color)`.
    pub fn fills(&self) -> impl Iterator<Item = (Point, f64, Rgba8)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::FillCircle {
                center,
                radius,
                color,
            } => Some((*center, *radius, *color)),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn size(&self) -> Canvas {
        self.canvas
    }

    fn resize(&mut self, canvas: Canvas) -> SilkflowResult<()> {
        self.canvas = canvas;
        Ok(())
    }

    fn clear(&mut self) {
        // A clear wipes everything before it, so the log restarts.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear);
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        self.commands.push(DrawCommand::Stroke {
            path: path.clone(),
            style: *style,
        });
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn present(&mut self) -> SilkflowResult<()> {
        self.commands.push(DrawCommand::Present);
        Ok(())
    }
}
