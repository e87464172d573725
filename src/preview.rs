//! # Preview Canvas
//!
//! An in-memory RGB565 frame buffer implementing embedded-graphics'
//! `DrawTarget`. The binary uses it to print frames as ASCII art in
//! development mode (`--stdout`), and the tests use it as a full-size target
//! that, unlike `MockDisplay`, is not limited to 64×64 pixels.

use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
};
use std::convert::Infallible;

/// Luminance ramp from dark to bright
const RAMP: &[u8] = b" .:-=+*#%@";

/// Frame buffer that remembers which pixels were written
pub struct PreviewCanvas {
    size: Size,
    pixels: Vec<Option<Rgb565>>,
}

impl PreviewCanvas {
    pub fn new(size: Size) -> Self {
        Self {
            size,
            pixels: vec![None; (size.width * size.height) as usize],
        }
    }

    fn index(&self, point: Point) -> Option<usize> {
        let inside = point.x >= 0
            && point.y >= 0
            && (point.x as u32) < self.size.width
            && (point.y as u32) < self.size.height;
        inside.then(|| (point.y as u32 * self.size.width + point.x as u32) as usize)
    }

    /// Colour at `point`, `None` if never drawn or out of bounds
    pub fn pixel(&self, point: Point) -> Option<Rgb565> {
        self.index(point).and_then(|i| self.pixels[i])
    }

    /// Every point that has been written at least once
    pub fn drawn_points(&self) -> Vec<Point> {
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_some())
            .map(|(i, _)| {
                let i = i as u32;
                Point::new((i % self.size.width) as i32, (i / self.size.width) as i32)
            })
            .collect()
    }

    /// Whether any pixel inside `area` has exactly `color`
    pub fn any_in(&self, area: &embedded_graphics::primitives::Rectangle, color: Rgb565) -> bool {
        area.points().any(|p| self.pixel(p) == Some(color))
    }

    /// Render the buffer as text, one character per `cell_w`×`cell_h` block.
    ///
    /// Each block shows its brightest pixel so that thin strokes survive the
    /// downsampling.
    pub fn to_ascii(&self, cell_w: u32, cell_h: u32) -> String {
        let cell_w = cell_w.max(1);
        let cell_h = cell_h.max(1);
        let mut out = String::new();

        for row in 0..self.size.height.div_ceil(cell_h) {
            for col in 0..self.size.width.div_ceil(cell_w) {
                let mut brightest = 0u32;
                for y in row * cell_h..((row + 1) * cell_h).min(self.size.height) {
                    for x in col * cell_w..((col + 1) * cell_w).min(self.size.width) {
                        if let Some(c) = self.pixel(Point::new(x as i32, y as i32)) {
                            brightest = brightest.max(luma(c));
                        }
                    }
                }
                let idx = (brightest as usize * (RAMP.len() - 1)) / 255;
                out.push(RAMP[idx] as char);
            }
            out.push('\n');
        }
        out
    }
}

/// Approximate perceived brightness on a 0..=255 scale
fn luma(c: Rgb565) -> u32 {
    let r = c.r() as u32 * 255 / Rgb565::MAX_R as u32;
    let g = c.g() as u32 * 255 / Rgb565::MAX_G as u32;
    let b = c.b() as u32 * 255 / Rgb565::MAX_B as u32;
    (r * 299 + g * 587 + b * 114) / 1000
}

impl OriginDimensions for PreviewCanvas {
    fn size(&self) -> Size {
        self.size
    }
}

impl DrawTarget for PreviewCanvas {
    type Color = Rgb565;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let Some(i) = self.index(point) {
                self.pixels[i] = Some(color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_out_of_bounds_pixels_are_dropped() {
        let mut canvas = PreviewCanvas::new(Size::new(4, 4));
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(Rgb565::WHITE))
            .draw(&mut canvas)
            .unwrap();

        assert_eq!(canvas.drawn_points().len(), 4);
        assert_eq!(canvas.pixel(Point::new(1, 1)), Some(Rgb565::WHITE));
        assert_eq!(canvas.pixel(Point::new(2, 2)), None);
    }

    #[test]
    fn test_ascii_downsampling() {
        let mut canvas = PreviewCanvas::new(Size::new(4, 4));
        canvas.clear(Rgb565::BLACK).unwrap();
        Pixel(Point::new(3, 3), Rgb565::WHITE).draw(&mut canvas).unwrap();

        assert_eq!(canvas.to_ascii(2, 2), "  \n @\n");
    }
}
