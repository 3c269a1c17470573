//! Color theme system for redline.
//!
//! A `Theme` holds the colours of the chrome around the pages: borders, the
//! sidebar, the status bar. Diff status colours are not part of a theme; they
//! come from `redline_core::style` so the overlay and the sidebar always agree.
//!
//! Two built-in themes are provided:
//!
//! - `dark` — ANSI 16 colours for the chrome, works on any terminal.
//! - `catppuccin_mocha` — Catppuccin Mocha palette in RGB; requires truecolor.
//!
//! The page paper is always an RGB value because highlight fills are blended
//! onto it.

use ratatui::style::Color;
use redline_core::style::Rgb;

/// Converts a backend-independent colour into a ratatui colour.
pub fn rgb(c: Rgb) -> Color {
    Color::Rgb(c.0, c.1, c.2)
}

/// All color values used across redline's UI surfaces.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Border color for the currently focused panel.
    pub border_active: Color,
    /// Border color for unfocused panels.
    pub border_inactive: Color,

    /// Page background that highlight fills are blended onto.
    pub page_paper: Rgb,
    /// Placeholder text drawn on the page (page number, loading notice).
    pub page_text: Color,

    pub text: Color,
    /// Secondary text: hints, counts, empty-list notices.
    pub muted: Color,
    /// Background of the selected sidebar row.
    pub selection_bg: Color,

    pub status_bar_bg: Color,
    pub status_bar_fg: Color,
    /// Mode indicator color.
    pub status_mode: Color,
}

impl Theme {
    /// Returns the built-in dark theme using ANSI 16 colors for the chrome.
    pub fn dark() -> Self {
        Self {
            border_active: Color::Cyan,
            border_inactive: Color::DarkGray,

            page_paper: Rgb(0xf5, 0xf5, 0xf0),
            page_text: Color::DarkGray,

            text: Color::Reset,
            muted: Color::DarkGray,
            selection_bg: Color::DarkGray,

            status_bar_bg: Color::DarkGray,
            status_bar_fg: Color::White,
            status_mode: Color::Cyan,
        }
    }

    /// Returns the Catppuccin Mocha theme using RGB truecolor values.
    ///
    /// Palette source: <https://github.com/catppuccin/catppuccin> Mocha variant.
    pub fn catppuccin_mocha() -> Self {
        let lavender = Color::Rgb(180, 190, 254); // #b4befe
        let overlay1 = Color::Rgb(127, 132, 156); // #7f849c
        let surface1 = Color::Rgb(69, 71, 90); // #45475a
        let surface0 = Color::Rgb(49, 50, 68); // #313244
        let text = Color::Rgb(205, 214, 244); // #cdd6f4

        Self {
            border_active: lavender,
            border_inactive: overlay1,

            page_paper: Rgb(0xef, 0xf1, 0xf5), // latte base
            page_text: Color::Rgb(0x9c, 0xa0, 0xb0),

            text,
            muted: overlay1,
            selection_bg: surface0,

            status_bar_bg: surface1,
            status_bar_fg: text,
            status_mode: lavender,
        }
    }

    /// Resolves a theme name string to the corresponding built-in theme.
    ///
    /// Unknown names fall back to `dark()` so a typo in config never prevents
    /// startup.
    ///
    /// # Arguments
    ///
    /// * `name` — theme name from config or `--theme`, e.g. `"dark"` or `"catppuccin-mocha"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "catppuccin-mocha" | "catppuccin_mocha" => Self::catppuccin_mocha(),
            "dark" => Self::dark(),
            other => {
                tracing::warn!(theme = other, "unknown theme, falling back to 'dark'");
                Self::dark()
            }
        }
    }
}
