use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use tasklet_core::Task;

use crate::tui::theme::Theme;

pub struct TaskListWidget<'a> {
    tasks: &'a [Task],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> TaskListWidget<'a> {
    pub fn new(tasks: &'a [Task], selected: usize, theme: &'a Theme) -> Self {
        Self {
            tasks,
            selected,
            theme,
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let items: Vec<ListItem> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let is_selected = i == self.selected;
                let selector = if is_selected { "▸ " } else { "  " };

                let (status, status_style) = if task.is_complete {
                    ("[x]", Style::default().fg(self.theme.success))
                } else {
                    ("[ ]", Style::default().fg(self.theme.text))
                };

                let description_style = if task.is_complete {
                    self.theme.completed_style()
                } else {
                    Style::default().fg(self.theme.text)
                };

                let line = Line::from(vec![
                    Span::styled(selector, self.theme.title_style()),
                    Span::styled(status, status_style),
                    Span::raw(" "),
                    Span::styled(task.description.as_str(), description_style),
                ]);

                let item = ListItem::new(line);
                if is_selected {
                    item.style(self.theme.selected_style())
                } else {
                    item
                }
            })
            .collect();

        let remaining = self.tasks.iter().filter(|t| !t.is_complete).count();
        let list = List::new(items).block(
            Block::default()
                .title(Span::styled(
                    format!(" Tasks ({} left) ", remaining),
                    self.theme.title_style(),
                ))
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(false)),
        );

        // Keeps the selection scrolled into view
        let mut state = ListState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }
}
