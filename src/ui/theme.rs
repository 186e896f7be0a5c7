use ratatui::style::Color;
use std::fs;

/// Terminal palette. Backgrounds stay transparent so the terminal's own shows through.
#[derive(Debug, Clone)]
pub struct Palette {
    pub bg: Color,

    pub fg_primary: Color,
    pub fg_secondary: Color,
    pub fg_muted: Color,

    pub accent: Color,
    pub accent_alt: Color,
    pub highlight: Color,

    pub success: Color,
    pub warning: Color,
    pub error: Color,

    pub border: Color,
    pub border_focused: Color,
}

impl Palette {
    /// For light terminal backgrounds
    pub fn light() -> Self {
        Self {
            bg: Color::Reset,
            fg_primary: Color::Rgb(20, 20, 28),
            fg_secondary: Color::Rgb(52, 58, 74),
            fg_muted: Color::Rgb(110, 116, 130),
            accent: Color::Rgb(36, 84, 150),
            accent_alt: Color::Rgb(120, 60, 150),
            highlight: Color::Rgb(170, 96, 20),
            success: Color::Rgb(24, 110, 60),
            warning: Color::Rgb(170, 96, 20),
            error: Color::Rgb(170, 30, 40),
            border: Color::Rgb(190, 196, 210),
            border_focused: Color::Rgb(36, 84, 150),
        }
    }

    /// For dark terminal backgrounds
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg_primary: Color::Rgb(240, 240, 245),
            fg_secondary: Color::Rgb(196, 200, 214),
            fg_muted: Color::Rgb(96, 102, 120),
            accent: Color::Rgb(120, 180, 255),
            accent_alt: Color::Rgb(200, 150, 255),
            highlight: Color::Rgb(255, 200, 110),
            success: Color::Rgb(110, 230, 150),
            warning: Color::Rgb(255, 200, 110),
            error: Color::Rgb(255, 110, 120),
            border: Color::Rgb(62, 68, 88),
            border_focused: Color::Rgb(120, 180, 255),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        if detect_light_background() {
            Self::light()
        } else {
            Self::dark()
        }
    }
}

/// Guess the terminal background. `COLORFGBG` ("fg;bg") wins, then the
/// Alacritty theme marker file. Dark when nothing says otherwise.
fn detect_light_background() -> bool {
    if let Ok(value) = std::env::var("COLORFGBG") {
        if let Some(light) = colorfgbg_is_light(&value) {
            return light;
        }
    }

    if let Some(home) = dirs::home_dir() {
        let marker = home.join(".config/alacritty/.current-theme");
        if let Ok(theme) = fs::read_to_string(marker) {
            return theme.trim().to_lowercase().contains("light");
        }
    }

    false
}

fn colorfgbg_is_light(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    // xterm palette: 7 and 9..=15 are the light backgrounds
    Some(bg == 7 || bg >= 9)
}

pub fn palette() -> Palette {
    Palette::default()
}
