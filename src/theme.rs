//! Colours: btop-style `theme[key]="value"` files and the built-in palettes.

use crate::Palette;
use panelrise::config::MAX_COLORS;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const PANEL_COUNT: usize = MAX_COLORS as usize;

/// Panel colours plus the few UI colours the board view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Panel colours by colour index: heart, star, club, diamond, circle.
    pub panels: [Color; PANEL_COUNT],
    /// Well background.
    pub bg: Color,
    /// Well border and dim rows.
    pub div_line: Color,
    /// Sidebar text.
    pub main_fg: Color,
    pub title: Color,
    /// Cursor brackets.
    pub cursor: Color,
    /// Border while the stack is in danger, and the game-over countdown.
    pub danger: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark()
    }
}

impl Theme {
    /// One Dark colours.
    pub fn onedark() -> Self {
        Self {
            panels: [
                Color::Rgb(0xE0, 0x6C, 0x75), // red
                Color::Rgb(0xE5, 0xC0, 0x7B), // yellow
                Color::Rgb(0x98, 0xC3, 0x79), // green
                Color::Rgb(0x61, 0xAF, 0xEF), // blue
                Color::Rgb(0xC6, 0x78, 0xDD), // magenta
            ],
            bg: Color::Rgb(0x28, 0x2C, 0x34),
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),
            title: Color::Rgb(0xE5, 0xC0, 0x7B),
            cursor: Color::Rgb(0xFF, 0xFF, 0xFF),
            danger: Color::Rgb(0xBE, 0x50, 0x46),
        }
    }

    /// Theme from `path` when given, One Dark otherwise; then the palette override.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(path) => Self::from_map(&parse_theme_file(&std::fs::read_to_string(path)?)),
            None => Self::onedark(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.panels = [
                    Color::Rgb(0xFF, 0x00, 0x00),
                    Color::Rgb(0xFF, 0xFF, 0x00),
                    Color::Rgb(0x00, 0xFF, 0x00),
                    Color::Rgb(0x00, 0x88, 0xFF),
                    Color::Rgb(0xFF, 0x00, 0xFF),
                ];
                self.cursor = Color::Rgb(0xFF, 0xFF, 0xFF);
            }
            Palette::Colorblind => {
                // Tol's bright scheme; symbols still tell panels apart
                self.panels = [
                    Color::Rgb(0xEE, 0x66, 0x77),
                    Color::Rgb(0xCC, 0xBB, 0x44),
                    Color::Rgb(0x22, 0x88, 0x33),
                    Color::Rgb(0x44, 0x77, 0xAA),
                    Color::Rgb(0xAA, 0x33, 0x77),
                ];
            }
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()));
        let fallback = Self::onedark();
        Self {
            panels: [
                get(&["cpu_end", "temp_end"]).unwrap_or(fallback.panels[0]),
                get(&["title", "cpu_mid"]).unwrap_or(fallback.panels[1]),
                get(&["mem_box", "cpu_start"]).unwrap_or(fallback.panels[2]),
                get(&["cpu_box"]).unwrap_or(fallback.panels[3]),
                get(&["net_box"]).unwrap_or(fallback.panels[4]),
            ],
            bg: get(&["main_bg", "meter_bg"]).unwrap_or(fallback.bg),
            div_line: get(&["div_line"]).unwrap_or(fallback.div_line),
            main_fg: get(&["main_fg"]).unwrap_or(fallback.main_fg),
            title: get(&["title"]).unwrap_or(fallback.title),
            cursor: get(&["hi_fg", "selected_fg"]).unwrap_or(fallback.cursor),
            danger: get(&["temp_end", "cpu_end"]).unwrap_or(fallback.danger),
        }
    }

    #[inline]
    pub fn panel_color(&self, index: u8) -> Color {
        self.panels[index as usize % PANEL_COUNT]
    }
}

/// Parse a btop-style theme file into a key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some((key, rest)) = stripped.split_once(']') else {
            continue;
        };
        let Some((_, value)) = rest.split_once('=') else {
            continue;
        };
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if !value.is_empty() {
            map.insert(key.trim().to_string(), value.to_string());
        }
    }
    map
}

/// Parse "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        hex.get(range)
            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
            .ok_or_else(invalid)
    };
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
