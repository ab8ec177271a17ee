//! Midnight theme and color utilities.

use fidus_core::ClientStatus;
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct MidnightTheme {
    pub bg: Color,
    pub primary: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl MidnightTheme {
    pub fn midnight() -> Self {
        Self {
            bg: Color::Rgb(13, 17, 23),
            primary: Color::Rgb(88, 166, 255),
            secondary: Color::Rgb(163, 113, 247),
            success: Color::Rgb(63, 185, 80),
            warning: Color::Rgb(210, 153, 34),
            error: Color::Rgb(248, 81, 73),
            info: Color::Rgb(88, 166, 255),
            text: Color::Rgb(230, 237, 243),
            text_dim: Color::Rgb(139, 148, 158),
            border: Color::Rgb(48, 54, 61),
            border_focus: Color::Rgb(88, 166, 255),
        }
    }
}

pub fn client_status_color(status: ClientStatus, theme: &MidnightTheme) -> Color {
    match status {
        ClientStatus::Active => theme.success,
        ClientStatus::Inactive => theme.text_dim,
    }
}
