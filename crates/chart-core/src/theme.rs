// File: crates/chart-core/src/theme.rs
// Summary: Named color palettes for axes, gutters, grid and the crosshair.

use crate::scene::Color;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub background: Color,
    pub gutter: Color,
    pub grid: Color,
    pub axis_line: Color,
    pub axis_label: Color,
    pub crosshair: Color,
    pub crosshair_label_bg: Color,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: Color::rgb(18, 18, 20),
            gutter: Color::rgb(26, 26, 30),
            grid: Color::rgb(40, 40, 45),
            axis_line: Color::rgb(180, 180, 190),
            axis_label: Color::rgb(235, 235, 245),
            crosshair: Color::rgb(255, 230, 70),
            crosshair_label_bg: Color::rgb(60, 60, 70),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: Color::rgb(250, 250, 252),
            gutter: Color::rgb(240, 240, 244),
            grid: Color::rgb(230, 230, 235),
            axis_line: Color::rgb(60, 60, 70),
            axis_label: Color::rgb(20, 20, 30),
            crosshair: Color::rgb(30, 120, 240),
            crosshair_label_bg: Color::rgb(210, 214, 224),
        }
    }

    pub fn solarized_dark() -> Self {
        Self {
            name: "solarized-dark",
            background: Color::from_hex(0x002b36),
            gutter: Color::from_hex(0x073642),
            grid: Color::from_hex(0x073642),
            axis_line: Color::from_hex(0x93a1a1),
            axis_label: Color::from_hex(0xeee8d5),
            crosshair: Color::from_hex(0xb58900),
            crosshair_label_bg: Color::from_hex(0x586e75),
        }
    }

    pub fn high_contrast_dark() -> Self {
        Self {
            name: "high-contrast-dark",
            background: Color::BLACK,
            gutter: Color::from_hex(0x111111),
            grid: Color::from_hex(0x222222),
            axis_line: Color::WHITE,
            axis_label: Color::WHITE,
            crosshair: Color::from_hex(0xffff00),
            crosshair_label_bg: Color::from_hex(0x333333),
        }
    }
}

impl Default for Theme {
    fn default() -> Self { Self::dark() }
}

/// Built-in presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light(), Theme::solarized_dark(), Theme::high_contrast_dark()]
}

/// Find a theme by name, falling back to dark.
pub fn find(name: &str) -> Theme {
    presets()
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(Theme::dark)
}
