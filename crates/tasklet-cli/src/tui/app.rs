use std::fs;

use anyhow::{Context, Result};
use tasklet_core::{
    AppWrapper, AuthService, AuthState, Config, LocalDb, RemoteApp, Screen, Task, TaskApp,
    TaskProvider,
};
use tracing::debug;
use tui_input::Input;

use super::theme::Theme;
use super::widgets::LoginForm;
use crate::commands::load_wrapper;

/// Input mode on the task screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigating the list
    Normal,
    /// Typing a new task
    Adding,
}

/// An auth call queued to run after the next frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingAuth {
    Login,
    Register,
    Logout,
}

/// Application state
pub struct App<A: AuthService = RemoteApp> {
    pub running: bool,
    pub mode: Mode,
    pub wrapper: AppWrapper<A>,
    /// Mounted while the task screen is showing.
    pub task_app: Option<TaskApp>,
    pub selected: usize,
    /// Add-task form
    pub input: Input,
    pub login_form: LoginForm,
    pub pending: Option<PendingAuth>,
    pub status_message: Option<String>,
    pub theme: Theme,
    db: LocalDb,
}

impl App<RemoteApp> {
    /// Open the task database and resolve the sync flow from `config`.
    pub async fn new(config: Config) -> Result<Self> {
        let wrapper = load_wrapper(&config)?;

        let db_path = config.local_db_path()?;
        if let Some(parent) = db_path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }
        let db = LocalDb::new(&db_path).await?;
        db.run_migrations().await?;

        Ok(Self::with_parts(
            wrapper,
            db,
            Theme::from_name(&config.display.theme),
        ))
    }
}

impl<A: AuthService> App<A> {
    pub fn with_parts(wrapper: AppWrapper<A>, db: LocalDb, theme: Theme) -> Self {
        Self {
            running: true,
            mode: Mode::Normal,
            wrapper,
            task_app: None,
            selected: 0,
            input: Input::default(),
            login_form: LoginForm::default(),
            pending: None,
            status_message: None,
            theme,
            db,
        }
    }

    /// Mount, rebind or unmount the task store to match the current screen,
    /// and pick up any committed changes.
    pub async fn sync_screen(&mut self) -> Result<()> {
        let Screen::Tasks(props) = self.wrapper.screen() else {
            if self.task_app.take().is_some() {
                debug!("task screen hidden, unmounting store");
                self.mode = Mode::Normal;
                self.input.reset();
            }
            return Ok(());
        };

        let binding = self.wrapper.sync_binding();
        let partition = binding.as_ref().map(|b| b.partition_value.as_str());

        match &mut self.task_app {
            Some(app)
                if app.provider().sync_binding().map(|b| b.partition_value.as_str())
                    == partition =>
            {
                app.set_props(props);
            }
            _ => {
                self.task_app = Some(TaskApp::new(TaskProvider::mount(&self.db, binding), props));
                self.selected = 0;
                self.mode = Mode::Normal;
            }
        }

        if let Some(app) = &mut self.task_app
            && app.is_stale()
        {
            let len = app.tasks().await?.len();
            self.selected = self.selected.min(len.saturating_sub(1));
        }
        Ok(())
    }

    /// Run a queued auth call, or the anonymous login the placeholder is
    /// waiting for. Returns whether anything ran.
    pub async fn run_pending(&mut self) -> bool {
        if let Some(action) = self.pending.take() {
            match action {
                PendingAuth::Login => {
                    let (email, password) = self.login_form.credentials();
                    self.wrapper.handle_login(&email, &password).await;
                    self.after_sign_in();
                }
                PendingAuth::Register => {
                    let (email, password) = self.login_form.credentials();
                    self.wrapper.handle_register(&email, &password).await;
                    self.after_sign_in();
                }
                PendingAuth::Logout => {
                    self.wrapper.handle_logout().await;
                    self.status_message = Some("✓ Logged out".to_string());
                }
            }
            return true;
        }

        if self.wrapper.needs_anonymous_login() {
            return self.wrapper.ensure_anonymous_login().await;
        }
        false
    }

    fn after_sign_in(&mut self) {
        if self.wrapper.auth_state() != AuthState::None {
            return;
        }
        self.login_form.reset();
        if let Some(user) = self.wrapper.user() {
            self.status_message = Some(format!("✓ Logged in as {}", user.display_name()));
        }
    }

    /// Auth state as displayed: a queued call already counts as loading.
    pub fn display_auth_state(&self) -> AuthState {
        match self.pending {
            Some(PendingAuth::Login | PendingAuth::Register) => AuthState::Loading,
            _ => self.wrapper.auth_state(),
        }
    }

    fn auth_busy(&self) -> bool {
        self.pending.is_some() || self.wrapper.auth_state() == AuthState::Loading
    }

    pub fn request_login(&mut self) {
        if !self.auth_busy() {
            self.pending = Some(PendingAuth::Login);
        }
    }

    pub fn request_register(&mut self) {
        if !self.auth_busy() {
            self.pending = Some(PendingAuth::Register);
        }
    }

    pub fn request_logout(&mut self) {
        if !self.auth_busy() {
            self.pending = Some(PendingAuth::Logout);
        }
    }

    /// Open the login view over an anonymous session.
    pub fn show_login(&mut self) {
        self.login_form.reset();
        self.wrapper.handle_show_auth();
    }

    pub fn hide_login(&mut self) {
        if !self.auth_busy() {
            self.wrapper.handle_hide_auth();
        }
    }

    /// Tasks as last read from the live query.
    pub fn tasks(&self) -> &[Task] {
        match &self.task_app {
            Some(app) => app.cached_tasks(),
            None => &[],
        }
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks().get(self.selected)
    }

    pub fn select_previous(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_next(&mut self) {
        if self.selected < self.tasks().len().saturating_sub(1) {
            self.selected += 1;
        }
    }

    pub fn select_last(&mut self) {
        self.selected = self.tasks().len().saturating_sub(1);
    }

    /// Add the task typed into the form.
    pub async fn submit_task(&mut self) -> Result<()> {
        if let Some(app) = &self.task_app {
            match app.add(self.input.value()).await? {
                Some(task) => self.status_message = Some(format!("✓ Added: {}", task.description)),
                None => self.status_message = Some("Cannot add empty task".to_string()),
            }
        }
        self.input.reset();
        self.mode = Mode::Normal;
        Ok(())
    }

    pub async fn toggle_selected(&mut self) -> Result<()> {
        let (Some(app), Some(id)) = (&self.task_app, self.selected_task().map(|t| t.id)) else {
            return Ok(());
        };
        let task = app.toggle(id).await?;
        self.status_message = Some(if task.is_complete {
            format!("✓ Completed: {}", task.description)
        } else {
            format!("Reopened: {}", task.description)
        });
        Ok(())
    }

    pub async fn delete_selected(&mut self) -> Result<()> {
        let Some(task) = self.selected_task().cloned() else {
            return Ok(());
        };
        if let Some(app) = &self.task_app {
            app.delete(task.id).await?;
            self.status_message = Some(format!("✗ Deleted: {}", task.description));
        }
        Ok(())
    }

    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Unmount the store and close the database.
    pub async fn shutdown(&mut self) {
        self.task_app = None;
        self.db.close().await;
    }
}
