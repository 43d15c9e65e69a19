//! Login screen: email/password form with Login and Register actions.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use tasklet_core::AuthState;
use tui_input::Input;

use crate::tui::theme::Theme;

pub const LOGIN_ERROR: &str = "There was an error logging in, please try again";
pub const REGISTER_ERROR: &str = "There was an error registering, please try again";
pub const PLEASE_WAIT: &str = "Please wait...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Form contents. Credentials exist only here until submitted.
#[derive(Default)]
pub struct LoginForm {
    pub email: Input,
    pub password: Input,
    pub focus: LoginField,
}

impl LoginForm {
    pub fn focused_mut(&mut self) -> &mut Input {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    /// Email (trimmed) and password as typed.
    pub fn credentials(&self) -> (String, String) {
        (
            self.email.value().trim().to_string(),
            self.password.value().to_string(),
        )
    }

    pub fn reset(&mut self) {
        self.email.reset();
        self.password.reset();
        self.focus = LoginField::Email;
    }
}

pub struct LoginWidget<'a> {
    form: &'a LoginForm,
    auth_state: AuthState,
    theme: &'a Theme,
    can_go_back: bool,
}

impl<'a> LoginWidget<'a> {
    pub fn new(form: &'a LoginForm, auth_state: AuthState, theme: &'a Theme) -> Self {
        Self {
            form,
            auth_state,
            theme,
            can_go_back: false,
        }
    }

    /// Show the "back to tasks" hint.
    pub fn can_go_back(mut self, can_go_back: bool) -> Self {
        self.can_go_back = can_go_back;
        self
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(self.theme.base_style()), area);

        let block = Block::default()
            .title(Span::styled(" Log in ", self.theme.title_style()))
            .borders(Borders::ALL)
            .border_style(self.theme.border_style(true))
            .style(self.theme.base_style());
        let card = centered(56, 14, area);
        let inner = block.inner(card);
        frame.render_widget(block, card);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints([
                Constraint::Length(3), // Email
                Constraint::Length(3), // Password
                Constraint::Length(1), // Status
                Constraint::Length(1), // Actions
                Constraint::Min(0),
            ])
            .split(inner);

        self.render_field(
            frame,
            chunks[0],
            "Email",
            self.form.email.value().to_string(),
            self.form.focus == LoginField::Email,
        );
        self.render_field(
            frame,
            chunks[1],
            "Password",
            "*".repeat(self.form.password.value().chars().count()),
            self.form.focus == LoginField::Password,
        );

        let status = match self.auth_state {
            AuthState::LoginError => Some(LOGIN_ERROR),
            AuthState::RegisterError => Some(REGISTER_ERROR),
            AuthState::None | AuthState::Loading => None,
        };
        if let Some(message) = status {
            frame.render_widget(
                Paragraph::new(Span::styled(message, self.theme.error_style()))
                    .alignment(Alignment::Center),
                chunks[2],
            );
        }

        let actions = if self.auth_state == AuthState::Loading {
            Line::from(Span::raw(PLEASE_WAIT))
        } else {
            let mut spans = vec![
                Span::styled(" Login ", self.theme.button_style()),
                Span::raw(" Enter   "),
                Span::styled(" Register ", self.theme.button_style()),
                Span::raw(" Ctrl+R"),
            ];
            if self.can_go_back {
                spans.push(Span::styled("   Esc: back", self.theme.muted_style()));
            }
            Line::from(spans)
        };
        frame.render_widget(
            Paragraph::new(actions).alignment(Alignment::Center),
            chunks[3],
        );
    }

    fn render_field(&self, frame: &mut Frame, area: Rect, label: &str, value: String, active: bool) {
        let cursor = if active { "|" } else { "" };
        let label_style = if active {
            self.theme.title_style()
        } else {
            self.theme.muted_style()
        };

        let field = Paragraph::new(format!("{}{}", value, cursor)).block(
            Block::default()
                .title(Span::styled(format!(" {} ", label), label_style))
                .borders(Borders::ALL)
                .border_style(self.theme.border_style(active)),
        );
        frame.render_widget(field, area);
    }
}

/// A `width` x `height` rect centered in `area`, clamped to fit.
fn centered(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
