use ratatui::style::{Color, Modifier, Style};

/// Application theme colors
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub background: Color,
    pub accent: Color,
    pub text: Color,
    pub text_muted: Color,
    pub border: Color,
    pub success: Color,
    pub error: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark blue background with a purple accent.
    pub fn dark() -> Self {
        Self {
            background: Color::Rgb(42, 54, 66),
            accent: Color::Rgb(122, 95, 240),
            text: Color::White,
            text_muted: Color::Rgb(170, 170, 170),
            border: Color::Rgb(110, 110, 110),
            success: Color::Green,
            error: Color::Red,
            selection_bg: Color::Rgb(60, 74, 90),
        }
    }

    /// Terminal default background, same accent.
    pub fn light() -> Self {
        Self {
            background: Color::Reset,
            text: Color::Reset,
            text_muted: Color::DarkGray,
            border: Color::Gray,
            selection_bg: Color::Rgb(225, 222, 245),
            ..Self::dark()
        }
    }

    /// Theme named in `[display] theme`; unknown names fall back to dark.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.text).bg(self.background)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused { self.accent } else { self.border })
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.accent).add_modifier(Modifier::BOLD)
    }

    pub fn button_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.text_muted)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn selected_style(&self) -> Style {
        Style::default().bg(self.selection_bg)
    }

    pub fn completed_style(&self) -> Style {
        Style::default()
            .fg(self.text_muted)
            .add_modifier(Modifier::CROSSED_OUT)
    }
}
