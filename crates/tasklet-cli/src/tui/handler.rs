use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use tasklet_core::{AppProps, AuthService, Screen};
use tui_input::backend::crossterm::EventHandler as InputHandler;

use super::app::{App, Mode};

/// Handle key events and update app state
pub async fn handle_key_event<A: AuthService>(app: &mut App<A>, key: KeyEvent) -> Result<()> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Ok(());
    }

    // Clear status message on any key press
    app.status_message = None;

    match app.wrapper.screen() {
        Screen::Placeholder => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.quit();
            }
        }
        Screen::Login { .. } => handle_login_screen(app, key),
        Screen::Tasks(props) => match app.mode {
            Mode::Normal => handle_tasks_view(app, key, &props).await?,
            Mode::Adding => handle_adding_mode(app, key).await?,
        },
    }

    Ok(())
}

fn handle_login_screen<A: AuthService>(app: &mut App<A>, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            if app.wrapper.user().is_some() {
                app.hide_login();
            } else {
                app.quit();
            }
        }
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
            app.login_form.next_field();
        }
        KeyCode::Enter => app.request_login(),
        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.request_register();
        }
        _ => {
            // Fields are frozen while a request is in flight
            if app.pending.is_none() {
                app.login_form.focused_mut().handle_event(&Event::Key(key));
            }
        }
    }
}

async fn handle_tasks_view<A: AuthService>(
    app: &mut App<A>,
    key: KeyEvent,
    props: &AppProps,
) -> Result<()> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('k') | KeyCode::Up => app.select_previous(),
        KeyCode::Char('g') => app.selected = 0,
        KeyCode::Char('G') => app.select_last(),

        // Actions
        KeyCode::Char('a') => {
            app.mode = Mode::Adding;
            app.input.reset();
        }
        KeyCode::Enter | KeyCode::Char(' ') => app.toggle_selected().await?,
        KeyCode::Char('x') | KeyCode::Delete => app.delete_selected().await?,

        // Account
        KeyCode::Char('l') if props.show_login() => app.show_login(),
        KeyCode::Char('o') if props.show_logout() => app.request_logout(),

        _ => {}
    }
    Ok(())
}

async fn handle_adding_mode<A: AuthService>(app: &mut App<A>, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            app.input.reset();
        }
        KeyCode::Enter => app.submit_task().await?,
        _ => {
            app.input.handle_event(&Event::Key(key));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::theme::Theme;
    use std::sync::Mutex;
    use tasklet_core::{
        AppWrapper, AuthState, Credentials, LocalDb, ProviderType, RemoteApp, TaskletError, User,
    };

    /// Accepts one email/password pair; anonymous login always works.
    struct FakeAuth {
        current: Mutex<Option<User>>,
    }

    impl FakeAuth {
        fn new() -> Self {
            Self {
                current: Mutex::new(None),
            }
        }
    }

    impl AuthService for FakeAuth {
        fn current_user(&self) -> Option<User> {
            self.current.lock().unwrap().clone()
        }

        async fn log_in(&self, credentials: &Credentials) -> tasklet_core::Result<User> {
            let user = match credentials {
                Credentials::Anonymous => User {
                    id: "anon-1".to_string(),
                    provider_type: ProviderType::AnonUser,
                    email: None,
                    access_token: String::new(),
                    refresh_token: String::new(),
                },
                Credentials::EmailPassword { email, password }
                    if email == "ada@example.com" && password.as_str() == "secret" =>
                {
                    User {
                        id: "user-ada".to_string(),
                        provider_type: ProviderType::LocalUserpass,
                        email: Some(email.clone()),
                        access_token: String::new(),
                        refresh_token: String::new(),
                    }
                }
                Credentials::EmailPassword { .. } => {
                    return Err(TaskletError::Auth("invalid username/password".to_string()));
                }
            };
            *self.current.lock().unwrap() = Some(user.clone());
            Ok(user)
        }

        async fn register_user(&self, _email: &str, _password: &str) -> tasklet_core::Result<()> {
            Err(TaskletError::Auth("name already in use".to_string()))
        }

        async fn log_out(&self) -> tasklet_core::Result<()> {
            *self.current.lock().unwrap() = None;
            Ok(())
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press<A: AuthService>(app: &mut App<A>, code: KeyCode) {
        handle_key_event(app, key(code)).await.unwrap();
        app.sync_screen().await.unwrap();
    }

    async fn type_text<A: AuthService>(app: &mut App<A>, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c)).await;
        }
    }

    async fn memory_db() -> LocalDb {
        let db = LocalDb::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    async fn offline_app() -> App<RemoteApp> {
        let mut app = App::with_parts(AppWrapper::offline(), memory_db().await, Theme::dark());
        app.sync_screen().await.unwrap();
        app
    }

    #[tokio::test]
    async fn test_add_toggle_delete_with_keys() {
        let mut app = offline_app().await;
        assert!(app.task_app.is_some());

        press(&mut app, KeyCode::Char('a')).await;
        assert_eq!(app.mode, Mode::Adding);
        type_text(&mut app, "Buy milk").await;
        press(&mut app, KeyCode::Enter).await;

        assert_eq!(app.mode, Mode::Normal);
        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks()[0].description, "Buy milk");
        assert!(app.input.value().is_empty());

        press(&mut app, KeyCode::Char(' ')).await;
        assert!(app.tasks()[0].is_complete);

        press(&mut app, KeyCode::Char('x')).await;
        assert!(app.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_empty_submission_adds_nothing() {
        let mut app = offline_app().await;

        press(&mut app, KeyCode::Char('a')).await;
        press(&mut app, KeyCode::Enter).await;

        assert!(app.tasks().is_empty());
        assert_eq!(app.status_message.as_deref(), Some("Cannot add empty task"));
    }

    #[tokio::test]
    async fn test_whitespace_submission_adds_one_task() {
        let mut app = offline_app().await;

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "   ").await;
        press(&mut app, KeyCode::Enter).await;
        app.sync_screen().await.unwrap();

        assert_eq!(app.tasks().len(), 1);
        assert_eq!(app.tasks()[0].description, "   ");
    }

    #[tokio::test]
    async fn test_escape_cancels_adding() {
        let mut app = offline_app().await;

        press(&mut app, KeyCode::Char('a')).await;
        type_text(&mut app, "Never mind").await;
        press(&mut app, KeyCode::Esc).await;

        assert_eq!(app.mode, Mode::Normal);
        assert!(app.tasks().is_empty());
        assert!(app.running);
    }

    #[tokio::test]
    async fn test_anonymous_start_then_login() {
        let mut app = App::with_parts(
            AppWrapper::synced(FakeAuth::new(), true),
            memory_db().await,
            Theme::dark(),
        );

        assert_eq!(app.wrapper.screen(), Screen::Placeholder);
        assert!(app.run_pending().await);
        app.sync_screen().await.unwrap();
        assert_eq!(app.task_app.as_ref().unwrap().provider().partition(), "anon-1");

        press(&mut app, KeyCode::Char('l')).await;
        assert!(matches!(app.wrapper.screen(), Screen::Login { .. }));
        assert!(app.task_app.is_none());

        type_text(&mut app, "ada@example.com").await;
        press(&mut app, KeyCode::Tab).await;
        type_text(&mut app, "wrong").await;
        press(&mut app, KeyCode::Enter).await;

        // Shown as loading until the call runs
        assert_eq!(app.display_auth_state(), AuthState::Loading);
        assert!(app.run_pending().await);
        assert_eq!(app.display_auth_state(), AuthState::LoginError);

        for _ in 0.."wrong".len() {
            press(&mut app, KeyCode::Backspace).await;
        }
        type_text(&mut app, "secret").await;
        press(&mut app, KeyCode::Enter).await;
        assert!(app.run_pending().await);
        app.sync_screen().await.unwrap();

        let Screen::Tasks(props) = app.wrapper.screen() else {
            panic!("expected the task screen after login");
        };
        assert!(props.show_logout());
        assert_eq!(app.task_app.as_ref().unwrap().provider().partition(), "user-ada");
        assert_eq!(
            app.status_message.as_deref(),
            Some("✓ Logged in as ada@example.com")
        );
        assert!(app.login_form.credentials().0.is_empty());
    }

    #[tokio::test]
    async fn test_register_failure_keeps_form() {
        let mut app = App::with_parts(
            AppWrapper::synced(FakeAuth::new(), false),
            memory_db().await,
            Theme::dark(),
        );
        assert!(!app.run_pending().await);

        type_text(&mut app, "taken@example.com").await;
        handle_key_event(
            &mut app,
            KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL),
        )
        .await
        .unwrap();
        assert!(app.run_pending().await);

        assert_eq!(app.display_auth_state(), AuthState::RegisterError);
        assert_eq!(app.login_form.credentials().0, "taken@example.com");
    }

    #[tokio::test]
    async fn test_logout_returns_to_login() {
        let auth = FakeAuth::new();
        auth.log_in(&Credentials::email_password("ada@example.com", "secret"))
            .await
            .unwrap();
        let mut app = App::with_parts(AppWrapper::synced(auth, false), memory_db().await, Theme::dark());
        app.sync_screen().await.unwrap();
        assert!(app.task_app.is_some());

        press(&mut app, KeyCode::Char('o')).await;
        assert!(app.run_pending().await);
        app.sync_screen().await.unwrap();

        assert_eq!(
            app.wrapper.screen(),
            Screen::Login {
                auth_state: AuthState::None
            }
        );
        assert!(app.task_app.is_none());
    }
}
