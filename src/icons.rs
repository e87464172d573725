//! # Weather Icons
//!
//! Icons are drawn from embedded-graphics primitives into a square box rather
//! than decoded from image resources, so "decoding" an icon is just choosing
//! the glyph and its size. That keeps the listener callback cheap and the icon
//! is ready before the next draw.

use embedded_graphics::{
    pixelcolor::Rgb565,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle, RoundedRectangle, Triangle},
};

const SUN: Rgb565 = Rgb565::new(31, 50, 0);
const CLOUD: Rgb565 = Rgb565::new(28, 57, 28);
const DARK_CLOUD: Rgb565 = Rgb565::new(16, 33, 18);
const DROP: Rgb565 = Rgb565::new(6, 30, 31);
const BOLT: Rgb565 = Rgb565::new(31, 58, 4);

/// Largest icon box; keeps the 24-unit grid arithmetic in range
pub const MAX_ICON_SIZE: u32 = 1024;

/// Glyphs the face can show next to the temperatures
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WeatherIcon {
    Clear,
    LightClouds,
    Clouds,
    Fog,
    LightRain,
    Rain,
    Snow,
    Storm,
    /// Application icon, shown when the condition code is zero or unknown
    Launcher,
}

/// A decoded icon: glyph plus pixel size
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconBitmap {
    pub icon: WeatherIcon,
    pub size: u32,
}

impl IconBitmap {
    /// Sizes above [`MAX_ICON_SIZE`] are clamped
    pub fn decode(icon: WeatherIcon, size: u32) -> Self {
        Self {
            icon,
            size: size.min(MAX_ICON_SIZE),
        }
    }

    fn side(&self) -> u32 {
        self.size.min(MAX_ICON_SIZE)
    }

    pub fn width(&self) -> i32 {
        self.side() as i32
    }

    pub fn height(&self) -> i32 {
        self.side() as i32
    }

    /// Draw the icon with its top-left corner at `origin`
    pub fn draw_at<D>(&self, target: &mut D, origin: Point) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = Rgb565>,
    {
        let size = self.side();
        let s = size as i32;
        let at = |x: i32, y: i32| origin + Point::new(x * s / 24, y * s / 24);
        let len = |v: u32| (v * size / 24).max(1);
        let fill = PrimitiveStyle::with_fill;
        let stroke = |color: Rgb565| PrimitiveStyle::with_stroke(color, len(2));

        match self.icon {
            WeatherIcon::Clear => {
                Circle::new(at(6, 6), len(12))
                    .into_styled(fill(SUN))
                    .draw(target)?;
                for (from, to) in [
                    ((12, 0), (12, 4)),
                    ((12, 20), (12, 24)),
                    ((0, 12), (4, 12)),
                    ((20, 12), (24, 12)),
                ] {
                    Line::new(at(from.0, from.1), at(to.0, to.1))
                        .into_styled(stroke(SUN))
                        .draw(target)?;
                }
            }
            WeatherIcon::LightClouds => {
                Circle::new(at(10, 2), len(12))
                    .into_styled(fill(SUN))
                    .draw(target)?;
                cloud(target, at(0, 8), self.size, CLOUD)?;
            }
            WeatherIcon::Clouds => {
                cloud(target, at(0, 4), self.size, CLOUD)?;
            }
            WeatherIcon::Fog => {
                for y in [6, 12, 18] {
                    Line::new(at(2, y), at(22, y))
                        .into_styled(stroke(CLOUD))
                        .draw(target)?;
                }
            }
            WeatherIcon::LightRain => {
                cloud(target, at(0, 0), self.size, CLOUD)?;
                for x in [8, 16] {
                    Line::new(at(x, 16), at(x - 2, 22))
                        .into_styled(stroke(DROP))
                        .draw(target)?;
                }
            }
            WeatherIcon::Rain => {
                cloud(target, at(0, 0), self.size, DARK_CLOUD)?;
                for x in [5, 10, 15, 20] {
                    Line::new(at(x, 16), at(x - 2, 23))
                        .into_styled(stroke(DROP))
                        .draw(target)?;
                }
            }
            WeatherIcon::Snow => {
                cloud(target, at(0, 0), self.size, CLOUD)?;
                for (x, y) in [(6, 17), (12, 21), (18, 17)] {
                    Circle::new(at(x - 1, y - 1), len(3))
                        .into_styled(fill(Rgb565::WHITE))
                        .draw(target)?;
                }
            }
            WeatherIcon::Storm => {
                cloud(target, at(0, 0), self.size, DARK_CLOUD)?;
                Triangle::new(at(13, 13), at(8, 20), at(12, 20))
                    .into_styled(fill(BOLT))
                    .draw(target)?;
                Triangle::new(at(12, 18), at(16, 18), at(10, 24))
                    .into_styled(fill(BOLT))
                    .draw(target)?;
            }
            WeatherIcon::Launcher => {
                RoundedRectangle::with_equal_corners(
                    Rectangle::new(origin, Size::new(self.size, self.size)),
                    Size::new(len(6), len(6)),
                )
                .into_styled(fill(DROP))
                .draw(target)?;
                Circle::new(at(7, 7), len(10))
                    .into_styled(fill(SUN))
                    .draw(target)?;
            }
        }
        Ok(())
    }
}

/// Cloud body filling the top part of an icon box
fn cloud<D>(target: &mut D, origin: Point, size: u32, color: Rgb565) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let size = size.min(MAX_ICON_SIZE);
    let s = size as i32;
    let at = |x: i32, y: i32| origin + Point::new(x * s / 24, y * s / 24);
    let len = |v: u32| (v * size / 24).max(1);
    let style = PrimitiveStyle::with_fill(color);

    Circle::new(at(2, 6), len(10)).into_styled(style).draw(target)?;
    Circle::new(at(8, 2), len(12)).into_styled(style).draw(target)?;
    Circle::new(at(13, 6), len(10)).into_styled(style).draw(target)?;
    Rectangle::new(at(6, 10), Size::new(len(12), len(6)))
        .into_styled(style)
        .draw(target)?;
    Ok(())
}
