//! # Watch Face Rendering
//!
//! Drawing is split in two steps. [`compose`] is a pure function of the
//! render state, the weather snapshot and the viewport: it lays the face out
//! and returns a [`Frame`], a flat list of draw commands. [`Frame::render`]
//! then rasterises those commands onto any embedded-graphics `DrawTarget`.
//!
//! Keeping layout separate from rasterisation lets tests check positions and
//! strings directly instead of probing pixels.
//!
//! ## Layout
//!
//! ```text
//!            09:05            <- time_y (hour bold, colon, minute light)
//!      SUN, MAR 03 2024       <- date_y
//!          --------           <- line_y, 8 × spacing wide
//!       [icon] 75°  50°       <- weather_y, high/low jointly centred
//! ```

use crate::clock::Calendar;
use crate::config::LayoutConfig;
use crate::icons::IconBitmap;
use crate::style::{FaceStyles, TextStyle};
use crate::weather::WeatherSnapshot;
use chrono::{DateTime, FixedOffset, Timelike};
use embedded_graphics::{
    pixelcolor::{Rgb565, RgbColor},
    prelude::*,
    primitives::{Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

/// Vertical positions and spacing, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub time_y: i32,
    pub date_y: i32,
    pub weather_y: i32,
    pub line_y: i32,
    pub spacing: i32,
}

impl From<&LayoutConfig> for Layout {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            time_y: config.time_y_offset,
            date_y: config.date_y_offset,
            weather_y: config.weather_y_offset,
            line_y: config.line_y_offset,
            spacing: config.spacing,
        }
    }
}

/// Everything the draw routine reads besides the weather
#[derive(Clone, Debug)]
pub struct RenderState {
    pub ambient: bool,
    /// Display has fewer bits per colour channel in ambient mode
    pub low_bit_ambient: bool,
    pub burn_in_protection: bool,
    pub calendar: Calendar,
    pub layout: Layout,
    pub styles: FaceStyles,
}

/// One drawing operation, in viewport coordinates
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    /// Fill the whole target
    Clear(Rgb565),
    FillRect { area: Rectangle, color: Rgb565 },
    /// Text with its alphabetic baseline at `origin.y`
    Text {
        text: String,
        origin: Point,
        style: TextStyle,
    },
    Line { from: Point, to: Point, color: Rgb565 },
    /// Icon with its top-left corner at `origin`
    Icon { icon: IconBitmap, origin: Point },
}

/// A composed face, ready to rasterise
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Frame {
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    /// All text strings in draw order
    pub fn texts(&self) -> Vec<&str> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Origin of the first text command showing `needle`
    pub fn text_origin(&self, needle: &str) -> Option<Point> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Text { text, origin, .. } if text == needle => Some(*origin),
            _ => None,
        })
    }

    pub fn icon(&self) -> Option<(IconBitmap, Point)> {
        self.commands.iter().find_map(|c| match c {
            DrawCommand::Icon { icon, origin } => Some((*icon, *origin)),
            _ => None,
        })
    }

    /// Rasterise onto `target`.
    ///
    /// A failing command does not stop the rest of the frame.
    pub fn render<D>(&self, target: &mut D)
    where
        D: DrawTarget<Color = Rgb565>,
    {
        for command in &self.commands {
            match command {
                DrawCommand::Clear(color) => {
                    target.clear(*color).ok();
                }
                DrawCommand::FillRect { area, color } => {
                    area.into_styled(PrimitiveStyle::with_fill(*color))
                        .draw(target)
                        .ok();
                }
                DrawCommand::Text {
                    text,
                    origin,
                    style,
                } => {
                    let character_style = style.mono_style();
                    Text::with_baseline(text, *origin, character_style, Baseline::Alphabetic)
                        .draw(target)
                        .ok();
                    if style.face().faux_bold {
                        let shifted = *origin + Point::new(1, 0);
                        Text::with_baseline(text, shifted, character_style, Baseline::Alphabetic)
                            .draw(target)
                            .ok();
                    }
                }
                DrawCommand::Line { from, to, color } => {
                    Line::new(*from, *to)
                        .into_styled(PrimitiveStyle::with_stroke(*color, 1))
                        .draw(target)
                        .ok();
                }
                DrawCommand::Icon { icon, origin } => {
                    icon.draw_at(target, *origin).ok();
                }
            }
        }
    }
}

/// Zero-padded two-digit field
pub fn two_digits(value: u32) -> String {
    format!("{:02}", value)
}

/// "HH:MM" as shown in ambient mode
pub fn ambient_time(hours: u32, minutes: u32) -> String {
    format!("{:02}:{:02}", hours, minutes)
}

/// "SUN, MAR 03 2024": fixed US English format, upper-cased
pub fn date_line(time: &DateTime<FixedOffset>) -> String {
    time.format("%a, %b %d %Y").to_string().to_uppercase()
}

/// Lay out one frame.
///
/// The weather block is drawn only when the snapshot has both temperatures and
/// an icon; otherwise nothing of it appears.
pub fn compose(state: &RenderState, weather: Option<&WeatherSnapshot>, bounds: Rectangle) -> Frame {
    let styles = &state.styles;
    let layout = &state.layout;
    let now = state.calendar.local();
    let center_x = bounds.top_left.x + bounds.size.width as i32 / 2;
    let mut commands = Vec::with_capacity(10);

    if state.ambient {
        commands.push(DrawCommand::Clear(Rgb565::BLACK));
    } else {
        commands.push(DrawCommand::FillRect {
            area: bounds,
            color: styles.background,
        });
    }

    let hours = now.hour();
    let minutes = now.minute();

    if state.ambient {
        let time = ambient_time(hours, minutes);
        let x = center_x - styles.time.measure(&time) / 2;
        commands.push(text(time, x, layout.time_y, styles.time));
    } else {
        // Hour and minute use different weights, so they are placed around
        // the centre separately instead of centring one string.
        let hour = two_digits(hours);
        let minute = two_digits(minutes);
        let hour_x = center_x - styles.hour.measure(&hour);
        let minute_x = center_x + styles.minute.measure(":");
        commands.push(text(hour, hour_x, layout.time_y, styles.hour));
        commands.push(text(":".to_string(), center_x, layout.time_y, styles.hour));
        commands.push(text(minute, minute_x, layout.time_y, styles.minute));
    }

    let date = date_line(&now);
    let date_x = center_x - styles.date.measure(&date) / 2;
    commands.push(text(date, date_x, layout.date_y, styles.date));

    commands.push(DrawCommand::Line {
        from: Point::new(center_x - 4 * layout.spacing, layout.line_y),
        to: Point::new(center_x + 4 * layout.spacing, layout.line_y),
        color: styles.line,
    });

    if let Some((high, low, icon)) = weather.and_then(WeatherSnapshot::drawable) {
        let high_w = styles.max_temp.measure(high);
        let low_w = styles.min_temp.measure(low);
        let high_x = center_x - (high_w + low_w + layout.spacing) / 2;
        let low_x = high_x + high_w + layout.spacing;

        if !state.ambient {
            let text_h = styles.max_temp.text_height();
            let origin = Point::new(
                high_x - icon.width() - 2 * layout.spacing,
                layout.weather_y - text_h / 2 - icon.height() / 2,
            );
            commands.push(DrawCommand::Icon { icon, origin });
        }

        commands.push(text(high.to_string(), high_x, layout.weather_y, styles.max_temp));
        commands.push(text(low.to_string(), low_x, layout.weather_y, styles.min_temp));
    }

    Frame { commands }
}

fn text(text: String, x: i32, y: i32, style: TextStyle) -> DrawCommand {
    DrawCommand::Text {
        text,
        origin: Point::new(x, y),
        style,
    }
}
