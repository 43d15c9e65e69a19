use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Paragraph},
};
use tasklet_core::{AppProps, AuthService, Screen};

use super::app::{App, Mode};
use super::widgets::{AddTaskWidget, IntroTextWidget, LoginWidget, TaskListWidget};

/// Main UI rendering function
pub fn render<A: AuthService>(app: &App<A>, frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Block::default().style(app.theme.base_style()), area);

    match app.wrapper.screen() {
        // Nothing to show until the anonymous login resolves
        Screen::Placeholder => {}
        Screen::Login { .. } => {
            LoginWidget::new(&app.login_form, app.display_auth_state(), &app.theme)
                .can_go_back(app.wrapper.user().is_some())
                .render(frame, area);
        }
        Screen::Tasks(props) => render_tasks(app, &props, frame, area),
    }
}

fn render_tasks<A: AuthService>(app: &App<A>, props: &AppProps, frame: &mut Frame, area: Rect) {
    let account_height = if props.sync_enabled() { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),              // Title
            Constraint::Length(3),              // Add-task form
            Constraint::Min(5),                 // Task list
            Constraint::Length(account_height), // Account
            Constraint::Length(1),              // Status
            Constraint::Length(1),              // Help line
        ])
        .split(area);

    let title = Paragraph::new(Line::from(vec![
        Span::styled(" tasklet", app.theme.title_style()),
        Span::styled(
            if props.sync_enabled() { "  (synced)" } else { "  (local)" },
            app.theme.muted_style(),
        ),
    ]));
    frame.render_widget(title, chunks[0]);

    AddTaskWidget::new(&app.input, app.mode == Mode::Adding, &app.theme).render(frame, chunks[1]);

    let tasks = app.tasks();
    if tasks.is_empty() {
        IntroTextWidget::new(&app.theme, props.sync_enabled()).render(frame, chunks[2]);
    } else {
        TaskListWidget::new(tasks, app.selected, &app.theme).render(frame, chunks[2]);
    }

    if props.sync_enabled() {
        render_account(app, props, frame, chunks[3]);
    }
    render_status(app, frame, chunks[4]);
    render_help(app, props, frame, chunks[5]);
}

fn render_account<A: AuthService>(app: &App<A>, props: &AppProps, frame: &mut Frame, area: Rect) {
    let mut spans = Vec::new();
    if props.show_login() {
        spans.push(Span::styled(" Login ", app.theme.button_style()));
        spans.push(Span::raw(" l  "));
    }
    if props.show_logout() {
        spans.push(Span::styled(" Logout ", app.theme.button_style()));
        spans.push(Span::raw(" o  "));
    }
    if let Some(name) = props.current_user_name() {
        spans.push(Span::styled(
            format!("Logged in as {}", name),
            app.theme.muted_style(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status<A: AuthService>(app: &App<A>, frame: &mut Frame, area: Rect) {
    let status_text = app.status_message.as_deref().unwrap_or("");
    let status_style = if status_text.starts_with('✓') {
        Style::default().fg(app.theme.success)
    } else if status_text.starts_with('✗') {
        app.theme.error_style()
    } else {
        app.theme.muted_style()
    };

    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", status_text), status_style)),
        area,
    );
}

fn render_help<A: AuthService>(app: &App<A>, props: &AppProps, frame: &mut Frame, area: Rect) {
    let help_text = match app.mode {
        Mode::Adding => "Enter:add  Esc:cancel",
        Mode::Normal if props.show_login() => {
            "j/k:nav  a:add  Enter/Space:toggle  x:delete  l:login  q:quit"
        }
        Mode::Normal if props.show_logout() => {
            "j/k:nav  a:add  Enter/Space:toggle  x:delete  o:logout  q:quit"
        }
        Mode::Normal => "j/k:nav  a:add  Enter/Space:toggle  x:delete  q:quit",
    };

    frame.render_widget(
        Paragraph::new(Span::styled(format!(" {}", help_text), app.theme.muted_style())),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Theme;
    use crate::tui::widgets::test_support::render_to_string;
    use tasklet_core::{AppWrapper, LocalDb, RemoteApp};

    async fn offline_app() -> App<RemoteApp> {
        let db = LocalDb::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let mut app = App::with_parts(AppWrapper::offline(), db, Theme::dark());
        app.sync_screen().await.unwrap();
        app
    }

    fn draw(app: &App<RemoteApp>) -> String {
        render_to_string(100, 24, |frame| render(app, frame))
    }

    #[tokio::test]
    async fn test_empty_list_shows_intro() {
        let app = offline_app().await;
        let screen = draw(&app);

        assert!(screen.contains("Welcome to tasklet!"));
        assert!(screen.contains("(local)"));
        assert!(!screen.contains("Logged in as"));
    }

    #[tokio::test]
    async fn test_tasks_replace_intro() {
        let mut app = offline_app().await;
        app.task_app.as_ref().unwrap().add("Walk the dog").await.unwrap();
        app.sync_screen().await.unwrap();

        let screen = draw(&app);
        assert!(screen.contains("[ ] Walk the dog"));
        assert!(!screen.contains("Welcome to tasklet!"));
    }

    #[tokio::test]
    async fn test_synced_footer() {
        let props = AppProps::SyncEnabled {
            show_login: true,
            show_logout: false,
            current_user_id: "anon-1".to_string(),
            current_user_name: "Anonymous".to_string(),
        };
        let app = offline_app().await;

        let screen = render_to_string(100, 1, |frame| {
            let area = frame.area();
            render_account(&app, &props, frame, area)
        });
        assert!(screen.contains(" Login "));
        assert!(!screen.contains("Logout"));
        assert!(screen.contains("Logged in as Anonymous"));
    }
}
