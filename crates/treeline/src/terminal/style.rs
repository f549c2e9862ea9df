use std::fmt::Display;

use crossterm::style::{Attribute, Color, ContentStyle, StyledContent};

/// Parse a colour name (`blue`, `bright-blue`) or a `#rrggbb` value.
pub fn parse_color(input: &str) -> Option<Color> {
    let value = input.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }
    let (bright, name) = match value
        .strip_prefix("bright-")
        .or_else(|| value.strip_prefix("bright_"))
    {
        Some(name) => (true, name),
        None => (false, value.as_str()),
    };
    let color = match (name, bright) {
        ("black", false) => Color::Black,
        ("black", true) => Color::DarkGrey,
        ("red", false) => Color::DarkRed,
        ("red", true) => Color::Red,
        ("green", false) => Color::DarkGreen,
        ("green", true) => Color::Green,
        ("yellow", false) => Color::DarkYellow,
        ("yellow", true) => Color::Yellow,
        ("blue", false) => Color::DarkBlue,
        ("blue", true) => Color::Blue,
        ("magenta", false) => Color::DarkMagenta,
        ("magenta", true) => Color::Magenta,
        ("cyan", false) => Color::DarkCyan,
        ("cyan", true) => Color::Cyan,
        ("white", false) | ("grey", true) | ("gray", true) => Color::Grey,
        ("white", true) => Color::White,
        ("grey", false) | ("gray", false) => Color::DarkGrey,
        ("default", false) => Color::Reset,
        _ => return None,
    };
    Some(color)
}

fn parse_hex(hex: &str) -> Option<Color> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(hex.get(0..2)?, 16).ok()?;
    let g = u8::from_str_radix(hex.get(2..4)?, 16).ok()?;
    let b = u8::from_str_radix(hex.get(4..6)?, 16).ok()?;
    Some(Color::Rgb { r, g, b })
}

pub fn default_prompt_style() -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(Color::Green);
    style.attributes.set(Attribute::Bold);
    style
}

/// Colours used when listing completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub candidate: ContentStyle,
    pub hint: ContentStyle,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            candidate: foreground(Color::Blue),
            hint: foreground(Color::Cyan),
        }
    }
}

impl Palette {
    pub fn from_colors(candidate: Option<Color>, hint: Option<Color>) -> Self {
        let defaults = Self::default();
        Self {
            candidate: candidate.map(foreground).unwrap_or(defaults.candidate),
            hint: hint.map(foreground).unwrap_or(defaults.hint),
        }
    }
}

fn foreground(color: Color) -> ContentStyle {
    let mut style = ContentStyle::new();
    style.foreground_color = Some(color);
    style
}

pub fn styled<D: Display>(style: ContentStyle, content: D) -> StyledContent<D> {
    StyledContent::new(style, content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_and_bright_colors() {
        assert_eq!(parse_color("blue"), Some(Color::DarkBlue));
        assert_eq!(parse_color("Bright-Blue"), Some(Color::Blue));
        assert_eq!(parse_color("bright_cyan"), Some(Color::Cyan));
        assert_eq!(parse_color("default"), Some(Color::Reset));
        assert_eq!(parse_color("purple"), None);
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(
            parse_color("#1a2B3c"),
            Some(Color::Rgb {
                r: 0x1a,
                g: 0x2b,
                b: 0x3c
            })
        );
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn palette_falls_back_per_field() {
        let palette = Palette::from_colors(Some(Color::Red), None);
        assert_eq!(palette.candidate.foreground_color, Some(Color::Red));
        assert_eq!(palette.hint, Palette::default().hint);
    }
}
