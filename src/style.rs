//! # Drawing Styles
//!
//! One [`TextStyle`] per text role on the face: colour, typeface weight, pixel
//! size and an anti-alias flag. Styles pick an embedded-graphics mono font for
//! their size and measure text the way the renderer will lay it out, so that
//! centring arithmetic in [`crate::render`] matches what ends up on screen.
//!
//! Fonts come from the ISO-8859-1 set so that the degree sign in temperature
//! strings renders as a glyph rather than a replacement character.

use crate::config::{PaletteConfig, TextSizes};
use embedded_graphics::{
    mono_font::{
        iso_8859_1::{
            FONT_10X20, FONT_6X13, FONT_6X13_BOLD, FONT_7X14, FONT_7X14_BOLD, FONT_9X15,
            FONT_9X15_BOLD, FONT_9X18, FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::{Rgb565, RgbColor},
};

/// Size a style starts with before the first inset change applies real sizes
pub const DEFAULT_TEXT_SIZE: u32 = 13;

/// Font weight of a text role
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Typeface {
    Normal,
    Bold,
}

/// A concrete font plus whether bold has to be simulated by double striking
#[derive(Clone, Copy, Debug)]
pub struct FontFace {
    pub font: &'static MonoFont<'static>,
    pub faux_bold: bool,
}

/// Available faces as (max pixel size, normal, bold).
/// The largest size has no bold cut, which is what `faux_bold` covers.
const FACES: [(u32, &MonoFont<'static>, Option<&MonoFont<'static>>); 5] = [
    (13, &FONT_6X13, Some(&FONT_6X13_BOLD)),
    (14, &FONT_7X14, Some(&FONT_7X14_BOLD)),
    (15, &FONT_9X15, Some(&FONT_9X15_BOLD)),
    (19, &FONT_9X18, Some(&FONT_9X18_BOLD)),
    (u32::MAX, &FONT_10X20, None),
];

/// Colour, weight and size for one text role.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    pub color: Rgb565,
    pub typeface: Typeface,
    pub size: u32,
    pub anti_alias: bool,
}

impl TextStyle {
    /// Create an anti-aliased style at the default size
    pub fn new(color: Rgb565, typeface: Typeface) -> Self {
        Self {
            color,
            typeface,
            size: DEFAULT_TEXT_SIZE,
            anti_alias: true,
        }
    }

    /// Font used to draw this style
    pub fn face(&self) -> FontFace {
        let (_, normal, bold) = FACES
            .iter()
            .find(|(max, _, _)| self.size <= *max)
            .copied()
            .unwrap_or(FACES[FACES.len() - 1]);

        match (self.typeface, bold) {
            (Typeface::Normal, _) => FontFace {
                font: normal,
                faux_bold: false,
            },
            (Typeface::Bold, Some(bold)) => FontFace {
                font: bold,
                faux_bold: false,
            },
            (Typeface::Bold, None) => FontFace {
                font: normal,
                faux_bold: true,
            },
        }
    }

    /// Horizontal advance of `text` in pixels
    pub fn measure(&self, text: &str) -> i32 {
        let face = self.face();
        let chars = text.chars().count() as i32;
        if chars == 0 {
            return 0;
        }
        let advance = (face.font.character_size.width + face.font.character_spacing) as i32;
        chars * advance + i32::from(face.faux_bold)
    }

    /// Height of digit glyphs above the baseline
    pub fn text_height(&self) -> i32 {
        self.face().font.baseline as i32
    }

    /// Colour as it should reach the display.
    ///
    /// Without anti-aliasing each channel is snapped fully on or off, matching
    /// what a low-bit ambient panel can show.
    pub fn render_color(&self) -> Rgb565 {
        if self.anti_alias {
            self.color
        } else {
            quantize(self.color)
        }
    }

    /// embedded-graphics character style for this role
    pub fn mono_style(&self) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyle::new(self.face().font, self.render_color())
    }
}

fn quantize(color: Rgb565) -> Rgb565 {
    let snap = |value: u8, max: u8| if value > max / 2 { max } else { 0 };
    Rgb565::new(
        snap(color.r(), Rgb565::MAX_R),
        snap(color.g(), Rgb565::MAX_G),
        snap(color.b(), Rgb565::MAX_B),
    )
}

/// Every style the face draws with
#[derive(Clone, Debug, PartialEq)]
pub struct FaceStyles {
    pub background: Rgb565,
    /// Ambient "HH:MM"
    pub time: TextStyle,
    pub hour: TextStyle,
    pub minute: TextStyle,
    pub date: TextStyle,
    pub max_temp: TextStyle,
    pub min_temp: TextStyle,
    /// Divider line under the date
    pub line: Rgb565,
}

impl FaceStyles {
    /// Build the style set from the theme palette
    pub fn from_palette(palette: &PaletteConfig) -> Self {
        let text = palette.text();
        let light = palette.text_light();
        Self {
            background: palette.background(),
            time: TextStyle::new(text, Typeface::Normal),
            hour: TextStyle::new(text, Typeface::Bold),
            minute: TextStyle::new(light, Typeface::Normal),
            date: TextStyle::new(light, Typeface::Normal),
            max_temp: TextStyle::new(text, Typeface::Bold),
            min_temp: TextStyle::new(light, Typeface::Normal),
            line: light,
        }
    }

    fn text_styles_mut(&mut self) -> [&mut TextStyle; 6] {
        [
            &mut self.time,
            &mut self.hour,
            &mut self.minute,
            &mut self.date,
            &mut self.max_temp,
            &mut self.min_temp,
        ]
    }

    /// Toggle anti-aliasing on every text style
    pub fn set_anti_alias(&mut self, anti_alias: bool) {
        for style in self.text_styles_mut() {
            style.anti_alias = anti_alias;
        }
    }

    /// Apply per-role sizes for the current screen shape
    pub fn apply_sizes(&mut self, sizes: TextSizes) {
        self.time.size = sizes.time;
        self.hour.size = sizes.time;
        self.minute.size = sizes.time;
        self.date.size = sizes.date;
        self.max_temp.size = sizes.temp;
        self.min_temp.size = sizes.temp;
    }

    /// Burn-in protection draws the hour with the normal weight
    pub fn set_burn_in_protection(&mut self, enabled: bool) {
        self.hour.typeface = if enabled {
            Typeface::Normal
        } else {
            Typeface::Bold
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    fn styles() -> FaceStyles {
        FaceStyles::from_palette(&Config::default().palette)
    }

    #[test]
    fn test_face_selection_by_size() {
        let mut style = TextStyle::new(Rgb565::WHITE, Typeface::Normal);
        style.size = 14;
        assert_eq!(style.face().font.character_size.width, 7);
        style.size = 18;
        assert_eq!(style.face().font.character_size.width, 9);
        style.size = 40;
        assert_eq!(style.face().font.character_size.width, 10);
    }

    #[test]
    fn test_bold_without_bold_cut_is_faux() {
        let mut style = TextStyle::new(Rgb565::WHITE, Typeface::Bold);
        style.size = 20;
        let face = style.face();
        assert!(face.faux_bold);

        style.size = 15;
        assert!(!style.face().faux_bold);
    }

    #[test]
    fn test_measure_counts_characters_not_bytes() {
        let mut style = TextStyle::new(Rgb565::WHITE, Typeface::Normal);
        style.size = 15;
        // "75°" is four bytes but three glyphs
        assert_eq!(style.measure("75°"), 27);
        assert_eq!(style.measure(""), 0);

        style.typeface = Typeface::Bold;
        style.size = 20;
        assert_eq!(style.measure("09"), 21);
    }

    #[test]
    fn test_anti_alias_off_quantizes_colour() {
        let mut style = TextStyle::new(Rgb565::new(20, 10, 3), Typeface::Normal);
        assert_eq!(style.render_color(), Rgb565::new(20, 10, 3));
        style.anti_alias = false;
        assert_eq!(style.render_color(), Rgb565::new(31, 0, 0));
    }

    #[test]
    fn test_set_anti_alias_applies_to_all_text_styles() {
        let mut styles = styles();
        styles.set_anti_alias(false);
        for style in styles.text_styles_mut() {
            assert!(!style.anti_alias);
        }
        styles.set_anti_alias(true);
        assert!(styles.max_temp.anti_alias);
    }

    #[test]
    fn test_apply_sizes() {
        let mut styles = styles();
        styles.apply_sizes(TextSizes {
            time: 20,
            date: 14,
            temp: 18,
        });
        assert_eq!(styles.time.size, 20);
        assert_eq!(styles.hour.size, 20);
        assert_eq!(styles.minute.size, 20);
        assert_eq!(styles.date.size, 14);
        assert_eq!(styles.max_temp.size, 18);
        assert_eq!(styles.min_temp.size, 18);
    }

    #[test]
    fn test_burn_in_protection_toggles_hour_weight() {
        let mut styles = styles();
        assert_eq!(styles.hour.typeface, Typeface::Bold);
        styles.set_burn_in_protection(true);
        assert_eq!(styles.hour.typeface, Typeface::Normal);
        styles.set_burn_in_protection(false);
        assert_eq!(styles.hour.typeface, Typeface::Bold);
    }
}
