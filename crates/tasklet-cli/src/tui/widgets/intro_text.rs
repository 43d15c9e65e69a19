use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::tui::theme::Theme;

/// Shown in place of the task list while it is empty.
pub struct IntroTextWidget<'a> {
    theme: &'a Theme,
    synced: bool,
}

impl<'a> IntroTextWidget<'a> {
    pub fn new(theme: &'a Theme, synced: bool) -> Self {
        Self { theme, synced }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let storage = if self.synced {
            "Tasks are stored on this device and tied to your account."
        } else {
            "Tasks are stored on this device only."
        };

        let content = vec![
            Line::from(""),
            Line::from(Span::styled("Welcome to tasklet!", self.theme.title_style())),
            Line::from(""),
            Line::from("Start adding a task with the form above. Each change is saved as soon as you make it."),
            Line::from(""),
            Line::from("Toggle a task with Enter or Space, or remove it with x."),
            Line::from(""),
            Line::from(Span::styled(storage, self.theme.muted_style())),
        ];

        let intro = Paragraph::new(content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.border_style(false)),
            );
        frame.render_widget(intro, area);
    }
}
