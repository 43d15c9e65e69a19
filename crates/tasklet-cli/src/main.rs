use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tasklet_core::Config;
use tracing_subscriber::EnvFilter;

mod commands;
mod tui;

/// tasklet - offline-first task list with optional account sync
#[derive(Parser)]
#[command(name = "tasklet")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run in interactive TUI mode (default when no command given)
    #[arg(short, long, global = true)]
    interactive: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Description of the task
        #[arg(required = true)]
        description: Vec<String>,
    },

    /// List tasks
    List {
        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },

    /// Mark a task complete, or incomplete again
    Toggle {
        /// Task ID (UUID or unique prefix)
        id: String,
    },

    /// Delete a task
    Delete {
        /// Task ID (UUID or unique prefix)
        id: String,
    },

    /// Log in with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and log in
    Register {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// End the current session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show or create the configuration file
    Config {
        /// Write a default configuration file if none exists
        #[arg(long)]
        init: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Some(command) if !cli.interactive => command,
        _ => {
            init_file_logging()?;
            return run_interactive().await;
        }
    };

    init_stderr_logging();

    match command {
        Commands::Add { description } => commands::add(description).await?,
        Commands::List { all } => commands::list(all).await?,
        Commands::Toggle { id } => commands::toggle(id).await?,
        Commands::Delete { id } => commands::delete(id).await?,
        Commands::Login { email } => commands::auth::login(email).await?,
        Commands::Register { email } => commands::auth::register(email).await?,
        Commands::Logout => commands::auth::logout().await?,
        Commands::Whoami => commands::auth::whoami().await?,
        Commands::Config { init } => commands::config(init).await?,
    }

    Ok(())
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

/// The TUI owns the terminal, so its log goes to a file instead.
fn init_file_logging() -> Result<()> {
    let log_path = Config::log_path()?;
    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory: {}", parent.display()))?;
    }

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the interactive TUI
async fn run_interactive() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let mut app = tui::App::new(config).await?;

    let mut terminal = tui::Tui::new()?;
    let events = tui::EventHandler::new(250);

    while app.running {
        app.sync_screen().await?;
        terminal.draw(|frame| tui::ui::render(&app, frame))?;

        // Auth calls run after the frame showing their loading state
        if app.run_pending().await {
            continue;
        }

        match events.next()? {
            tui::Event::Tick => {}
            tui::Event::Key(key) => tui::handle_key_event(&mut app, key).await?,
            tui::Event::Resize => {}
        }
    }

    app.shutdown().await;
    Ok(())
}
