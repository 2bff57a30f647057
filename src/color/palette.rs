use crate::color::gradient::{ColorStop, Gradient};
use crate::foundation::core::Rgb8;

const AUTUMN_SILK: [ColorStop; 10] = [
    ColorStop::new(0.0, Rgb8::new(0xFF, 0xF8, 0xDC)),
    ColorStop::new(0.1, Rgb8::new(0xFF, 0xE4, 0x88)),
    ColorStop::new(0.2, Rgb8::new(0xFF, 0xC8, 0x44)),
    ColorStop::new(0.3, Rgb8::new(0xFF, 0x9E, 0x18)),
    ColorStop::new(0.4, Rgb8::new(0xFF, 0x70, 0x10)),
    ColorStop::new(0.5, Rgb8::new(0xE0, 0x44, 0x20)),
    ColorStop::new(0.6, Rgb8::new(0xD0, 0x34, 0x28)),
    ColorStop::new(0.7, Rgb8::new(0xB8, 0x28, 0x28)),
    ColorStop::new(0.85, Rgb8::new(0x8B, 0x23, 0x23)),
    ColorStop::new(1.0, Rgb8::new(0x7A, 0x1F, 0x1F)),
];

const TWILIGHT: [ColorStop; 4] = [
    ColorStop::new(0.0, Rgb8::new(125, 211, 252)),
    ColorStop::new(0.35, Rgb8::new(99, 102, 241)),
    ColorStop::new(0.7, Rgb8::new(168, 85, 247)),
    ColorStop::new(1.0, Rgb8::new(139, 35, 35)),
];

/// Pale gold through amber and vermilion down to lacquer red.
pub fn autumn_silk() -> Gradient {
    Gradient::from_valid_stops(&AUTUMN_SILK)
}

/// Indigo, violet and sky blue with a vermilion tail.
pub fn twilight() -> Gradient {
    Gradient::from_valid_stops(&TWILIGHT)
}

#[cfg(test)]
#[path = "../../tests/unit/color/palette.rs"]
mod tests;
