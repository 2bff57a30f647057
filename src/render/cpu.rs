use crate::foundation::core::{BezPath, Canvas, Point, Rgba8};
use crate::foundation::error::{SilkflowError, SilkflowResult};
use crate::render::blur::{gaussian_blur_premul, radius_and_sigma};
use crate::render::composite::over_in_place;
use crate::render::surface::{StrokeStyle, Surface};

/// A rendered frame as RGBA8 bytes, row-major.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes.
    pub data: Vec<u8>,
    /// Whether color channels are premultiplied by alpha.
    pub premultiplied: bool,
}

/// Software [`Surface`] backed by `vello_cpu`.
///
/// Blurred strokes go to a separate glow layer that is blurred at [`Surface::present`] and laid
/// under the sharp layer.
pub struct CpuSurface {
    width: u16,
    height: u16,
    pixmap: vello_cpu::Pixmap,
    scratch: vello_cpu::Pixmap,
    glow: vello_cpu::RenderContext,
    sharp: vello_cpu::RenderContext,
    glow_blur: f64,
    glow_dirty: bool,
    sharp_dirty: bool,
}

impl std::fmt::Debug for CpuSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpuSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("glow_blur", &self.glow_blur)
            .finish_non_exhaustive()
    }
}

impl CpuSurface {
    /// Allocate a transparent surface. Dimensions must fit in `u16`.
    pub fn new(canvas: Canvas) -> SilkflowResult<Self> {
        let (width, height) = dims_u16(canvas)?;
        Ok(Self {
            width,
            height,
            pixmap: vello_cpu::Pixmap::new(width, height),
            scratch: vello_cpu::Pixmap::new(width, height),
            glow: vello_cpu::RenderContext::new(width, height),
            sharp: vello_cpu::RenderContext::new(width, height),
            glow_blur: 0.0,
            glow_dirty: false,
            sharp_dirty: false,
        })
    }

    /// Copy of the last presented frame, premultiplied.
    pub fn frame_rgba8(&self) -> FrameRGBA {
        FrameRGBA {
            width: u32::from(self.width),
            height: u32::from(self.height),
            data: self.pixmap.data_as_u8_slice().to_vec(),
            premultiplied: true,
        }
    }

    /// Drop recorded commands; contexts and buffers are reused until the next resize.
    fn reset_layers(&mut self) {
        self.glow.reset();
        self.sharp.reset();
        self.glow_blur = 0.0;
        self.glow_dirty = false;
        self.sharp_dirty = false;
    }

    fn composite_layer(
        ctx: &mut vello_cpu::RenderContext,
        scratch: &mut vello_cpu::Pixmap,
        target: &mut vello_cpu::Pixmap,
        width: u16,
        height: u16,
        blur_px: f64,
    ) -> SilkflowResult<()> {
        scratch.data_as_u8_slice_mut().fill(0);
        ctx.flush();
        ctx.render_to_pixmap(scratch);

        let (radius, sigma) = radius_and_sigma(blur_px);
        if radius == 0 {
            return over_in_place(target.data_as_u8_slice_mut(), scratch.data_as_u8_slice());
        }
        let blurred = gaussian_blur_premul(
            scratch.data_as_u8_slice(),
            u32::from(width),
            u32::from(height),
            radius,
            sigma,
        )?;
        over_in_place(target.data_as_u8_slice_mut(), &blurred)
    }
}

impl Surface for CpuSurface {
    fn size(&self) -> Canvas {
        Canvas {
            width: u32::from(self.width),
            height: u32::from(self.height),
        }
    }

    fn resize(&mut self, canvas: Canvas) -> SilkflowResult<()> {
        let (width, height) = dims_u16(canvas)?;
        self.width = width;
        self.height = height;
        self.pixmap = vello_cpu::Pixmap::new(width, height);
        self.scratch = vello_cpu::Pixmap::new(width, height);
        self.glow = vello_cpu::RenderContext::new(width, height);
        self.sharp = vello_cpu::RenderContext::new(width, height);
        self.reset_layers();
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.data_as_u8_slice_mut().fill(0);
        self.reset_layers();
    }

    fn stroke_path(&mut self, path: &BezPath, style: &StrokeStyle) {
        if style.color.a == 0 || !(style.width > 0.0) {
            return;
        }
        let ctx = if style.blur > 0.0 {
            self.glow_blur = self.glow_blur.max(style.blur);
            self.glow_dirty = true;
            &mut self.glow
        } else {
            self.sharp_dirty = true;
            &mut self.sharp
        };
        ctx.set_paint(color_to_cpu(style.color));
        ctx.set_stroke(
            vello_cpu::kurbo::Stroke::new(style.width)
                .with_caps(vello_cpu::kurbo::Cap::Round)
                .with_join(vello_cpu::kurbo::Join::Round),
        );
        ctx.stroke_path(&bezpath_to_cpu(path));
    }

    fn fill_circle(&mut self, center: Point, radius: f64, color: Rgba8) {
        if color.a == 0 || !(radius > 0.0) {
            return;
        }
        let circle = kurbo::Circle::new(center, radius);
        let mut path = BezPath::new();
        for el in kurbo::Shape::path_elements(&circle, 0.1) {
            path.push(el);
        }
        self.sharp_dirty = true;
        self.sharp.set_paint(color_to_cpu(color));
        self.sharp.fill_path(&bezpath_to_cpu(&path));
    }

    fn present(&mut self) -> SilkflowResult<()> {
        let (w, h) = (self.width, self.height);
        if self.glow_dirty {
            Self::composite_layer(
                &mut self.glow,
                &mut self.scratch,
                &mut self.pixmap,
                w,
                h,
                self.glow_blur,
            )?;
        }
        if self.sharp_dirty {
            Self::composite_layer(&mut self.sharp, &mut self.scratch, &mut self.pixmap, w, h, 0.0)?;
        }
        self.reset_layers();
        Ok(())
    }
}

fn dims_u16(canvas: Canvas) -> SilkflowResult<(u16, u16)> {
    let width: u16 = canvas
        .width
        .try_into()
        .map_err(|_| SilkflowError::surface("surface width exceeds u16"))?;
    let height: u16 = canvas
        .height
        .try_into()
        .map_err(|_| SilkflowError::surface("surface height exceeds u16"))?;
    if width == 0 || height == 0 {
        return Err(SilkflowError::surface("surface dimensions must be non-zero"));
    }
    Ok((width, height))
}

fn color_to_cpu(c: Rgba8) -> vello_cpu::peniko::Color {
    vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/cpu.rs"]
mod tests;
