use ratatui::style::{Color, Modifier, Style};

/// Catppuccin Mocha color palette.
///
/// Values are hex RGB strings in the `#RRGGBB` format.
pub mod colors {
    // Accent colors
    pub const MAUVE: &str = "#cba6f7";
    pub const RED: &str = "#f38ba8";
    pub const PEACH: &str = "#fab387";
    pub const GREEN: &str = "#a6e3a1";
    pub const SAPPHIRE: &str = "#74c7ec";
    pub const BLUE: &str = "#89b4fa";

    // Surface colors
    pub const SURFACE0: &str = "#313244";
    pub const SURFACE1: &str = "#45475a";

    // Overlay colors
    pub const OVERLAY0: &str = "#6c7086";

    // Text colors
    pub const SUBTEXT0: &str = "#a6adc8";
    pub const TEXT: &str = "#cdd6f4";

    // Background
    pub const CRUST: &str = "#11111b";
}

fn parse_hex_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

/// Convert a `#RRGGBB` palette entry into a terminal color.
/// Malformed values fall back to the terminal default.
pub fn color(hex: &str) -> Color {
    match parse_hex_rgb(hex) {
        Some((r, g, b)) => Color::Rgb(r, g, b),
        None => Color::Reset,
    }
}

pub fn fg(hex: &str) -> Style {
    Style::default().fg(color(hex))
}

/// Border style for a pane, highlighted when it has focus.
pub fn border(focused: bool) -> Style {
    if focused {
        fg(colors::MAUVE)
    } else {
        fg(colors::SURFACE1)
    }
}

pub fn title() -> Style {
    fg(colors::BLUE).add_modifier(Modifier::BOLD)
}

pub fn error() -> Style {
    fg(colors::RED)
}

pub fn muted() -> Style {
    fg(colors::OVERLAY0)
}

pub fn key_hint() -> Style {
    fg(colors::SAPPHIRE).add_modifier(Modifier::BOLD)
}

pub fn selected_row() -> Style {
    Style::default()
        .bg(color(colors::SURFACE0))
        .fg(color(colors::TEXT))
        .add_modifier(Modifier::BOLD)
}

pub fn button(active: bool) -> Style {
    if active {
        Style::default()
            .bg(color(colors::GREEN))
            .fg(color(colors::CRUST))
            .add_modifier(Modifier::BOLD)
    } else {
        fg(colors::GREEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_palette_entries() {
        assert_eq!(color(colors::BLUE), Color::Rgb(0x89, 0xb4, 0xfa));
        assert_eq!(color(colors::CRUST), Color::Rgb(0x11, 0x11, 0x1b));
    }

    #[test]
    fn malformed_hex_falls_back() {
        assert_eq!(color("#12345"), Color::Reset);
        assert_eq!(color("zzzzzz"), Color::Reset);
    }
}
