// Theme support for the TUI
//
// Built-in palettes selected by name from config. "Terminal" uses the
// terminal's ANSI palette; the named themes use true color (RGB).

use crate::notify::NoticeLevel;
use crate::table::Tone;
use ratatui::style::Color;

/// Color palette for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    // Cell tones
    pub text: Color,
    pub muted: Color,
    pub success: Color,
    pub danger: Color,
    pub accent: Color,

    // UI element colors
    pub title: Color,
    pub border: Color,
    pub border_focused: Color,
    pub header: Color,
    pub selection_bg: Color,
    pub skeleton: Color,
    pub status_bar: Color,
    pub info: Color,
}

impl Theme {
    pub const NAMES: [&'static str; 3] = ["Storedesk Dark", "Storedesk Light", "Terminal"];

    /// Load theme by name (case-insensitive); unknown names get the default
    pub fn by_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "storedesk light" | "light" => Self::light(),
            "terminal" | "auto" => Self::terminal(),
            _ => Self::dark(),
        }
    }

    pub fn dark() -> Self {
        Self {
            name: "Storedesk Dark",
            text: Color::Rgb(0xe6, 0xe6, 0xe6),
            muted: Color::Rgb(0x7a, 0x80, 0x8a),
            success: Color::Rgb(0x4c, 0xc3, 0x8a),
            danger: Color::Rgb(0xef, 0x5b, 0x5b),
            accent: Color::Rgb(0x5c, 0xa8, 0xff),
            title: Color::Rgb(0xff, 0xb8, 0x4d),
            border: Color::Rgb(0x44, 0x4a, 0x55),
            border_focused: Color::Rgb(0xff, 0xb8, 0x4d),
            header: Color::Rgb(0xff, 0xb8, 0x4d),
            selection_bg: Color::Rgb(0x2b, 0x33, 0x40),
            skeleton: Color::Rgb(0x3a, 0x40, 0x4a),
            status_bar: Color::Rgb(0x4c, 0xc3, 0x8a),
            info: Color::Rgb(0x5c, 0xa8, 0xff),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "Storedesk Light",
            text: Color::Rgb(0x1f, 0x23, 0x28),
            muted: Color::Rgb(0x8a, 0x8f, 0x98),
            success: Color::Rgb(0x1a, 0x7f, 0x37),
            danger: Color::Rgb(0xcf, 0x22, 0x2e),
            accent: Color::Rgb(0x09, 0x69, 0xda),
            title: Color::Rgb(0xbc, 0x4c, 0x00),
            border: Color::Rgb(0xd0, 0xd7, 0xde),
            border_focused: Color::Rgb(0xbc, 0x4c, 0x00),
            header: Color::Rgb(0xbc, 0x4c, 0x00),
            selection_bg: Color::Rgb(0xdd, 0xf4, 0xff),
            skeleton: Color::Rgb(0xea, 0xee, 0xf2),
            status_bar: Color::Rgb(0x1a, 0x7f, 0x37),
            info: Color::Rgb(0x09, 0x69, 0xda),
        }
    }

    /// Uses the terminal's own ANSI colors
    pub fn terminal() -> Self {
        Self {
            name: "Terminal",
            text: Color::Reset,
            muted: Color::DarkGray,
            success: Color::Green,
            danger: Color::Red,
            accent: Color::Cyan,
            title: Color::Yellow,
            border: Color::Gray,
            border_focused: Color::Yellow,
            header: Color::Yellow,
            selection_bg: Color::DarkGray,
            skeleton: Color::DarkGray,
            status_bar: Color::Green,
            info: Color::Blue,
        }
    }

    /// Color for a formatted cell's tone
    pub fn tone(&self, tone: Tone) -> Color {
        match tone {
            Tone::Plain => self.text,
            Tone::Muted => self.muted,
            Tone::Success => self.success,
            Tone::Danger => self.danger,
            Tone::Accent => self.accent,
        }
    }

    pub fn notice(&self, level: NoticeLevel) -> Color {
        match level {
            NoticeLevel::Info => self.info,
            NoticeLevel::Success => self.success,
            NoticeLevel::Error => self.danger,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}
