use ratatui::style::Color;
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    #[default]
    Dark,
}

impl ThemeMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn palette(self) -> Palette {
        Palette::for_mode(self)
    }
}

/// Colors for one theme. Widgets receive this by value; nothing reads a global.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub card: Color,
    pub container_bg: Color,
    pub text: Color,
    pub accent: Color,
    pub muted: Color,
    pub input_bg: Color,
    pub subtle: Color,
    pub down: Color,
}

const fn hex(rgb: u32) -> Color {
    Color::Rgb((rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8)
}

impl Palette {
    pub fn for_mode(mode: ThemeMode) -> Self {
        match mode {
            ThemeMode::Light => Self {
                card: hex(0xffffff),
                container_bg: hex(0xf2f6f8),
                text: hex(0x0b1220),
                accent: hex(0x0ea5a4),
                muted: hex(0x6b7280),
                input_bg: hex(0xf3faf9),
                subtle: hex(0xeef2f7),
                down: hex(0xfb7185),
            },
            ThemeMode::Dark => Self {
                card: hex(0x071022),
                container_bg: hex(0x071022),
                text: hex(0xe6eef3),
                accent: hex(0x34d399),
                muted: hex(0x94a3b8),
                input_bg: hex(0x0b1220),
                subtle: hex(0x0b1724),
                down: hex(0xfb7185),
            },
        }
    }

    /// Stroke color for the sparkline given its trend.
    pub fn trend(&self, up: bool) -> Color {
        if up {
            self.accent
        } else {
            self.down
        }
    }
}
