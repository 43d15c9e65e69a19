use ratatui::{
    Frame,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use tui_input::Input;

use crate::tui::theme::Theme;

const PLACEHOLDER: &str = "Enter new task description";

/// Single-line form for a new task.
pub struct AddTaskWidget<'a> {
    input: &'a Input,
    active: bool,
    theme: &'a Theme,
}

impl<'a> AddTaskWidget<'a> {
    pub fn new(input: &'a Input, active: bool, theme: &'a Theme) -> Self {
        Self {
            input,
            active,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled("+ ", self.theme.title_style())];
        if self.active {
            spans.push(Span::raw(self.input.value()));
            spans.push(Span::styled("|", self.theme.title_style()));
        } else {
            spans.push(Span::styled(PLACEHOLDER, self.theme.muted_style()));
            spans.push(Span::styled("  (a)", self.theme.muted_style()));
        }

        let form = Paragraph::new(Line::from(spans)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(self.active)),
        );
        frame.render_widget(form, area);
    }
}
