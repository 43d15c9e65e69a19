//! Account commands: login, register, logout, whoami.

use anyhow::{Context, Result};
use dialoguer::{theme::ColorfulTheme, Input, Password};
use tasklet_core::{AppWrapper, AuthState, Config, RemoteApp};

use super::load_wrapper;

fn synced_wrapper() -> Result<AppWrapper<RemoteApp>> {
    let config = Config::load().context("Failed to load configuration")?;
    let wrapper = load_wrapper(&config)?;

    if matches!(wrapper, AppWrapper::Offline) {
        println!("\u{2139}  Sync is not enabled; tasks are stored on this device only.\n");
        println!("To sign in to an account:");
        println!("  1. Run `tasklet config --init` to create a config file");
        println!("  2. Set `enabled = true` and your `app_id` under [sync]");
        println!("\nThen run this command again.");
        anyhow::bail!("Sync is disabled");
    }

    Ok(wrapper)
}

fn prompt_credentials(email: Option<String>, confirm: bool) -> Result<(String, String)> {
    let theme = ColorfulTheme::default();

    let email = match email {
        Some(email) => email,
        None => Input::with_theme(&theme)
            .with_prompt("Email")
            .interact_text()?,
    };

    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    let password = prompt.interact()?;

    Ok((email.trim().to_string(), password))
}

pub async fn login(email: Option<String>) -> Result<()> {
    let mut wrapper = synced_wrapper()?;
    let (email, password) = prompt_credentials(email, false)?;

    wrapper.handle_show_auth();
    wrapper.handle_login(&email, &password).await;

    if wrapper.auth_state() == AuthState::LoginError {
        anyhow::bail!("There was an error logging in, please try again");
    }

    print_signed_in(&wrapper);
    Ok(())
}

pub async fn register(email: Option<String>) -> Result<()> {
    let mut wrapper = synced_wrapper()?;
    let (email, password) = prompt_credentials(email, true)?;

    wrapper.handle_show_auth();
    wrapper.handle_register(&email, &password).await;

    if wrapper.auth_state() == AuthState::RegisterError {
        anyhow::bail!("There was an error registering, please try again");
    }

    print_signed_in(&wrapper);
    Ok(())
}

pub async fn logout() -> Result<()> {
    let mut wrapper = synced_wrapper()?;

    let Some(name) = wrapper.user().map(|user| user.display_name()) else {
        println!("Not logged in.");
        return Ok(());
    };

    wrapper.handle_logout().await;
    println!("\u{2713} Logged out: {}", name);
    Ok(())
}

pub async fn whoami() -> Result<()> {
    let mut wrapper = synced_wrapper()?;
    wrapper.ensure_anonymous_login().await;

    match wrapper.user() {
        Some(user) => {
            println!("Logged in as {}", user.display_name());
            println!("  User ID:  {}", user.id);
            println!("  Provider: {}", user.provider_type.as_str());
        }
        None => println!("Not logged in."),
    }
    Ok(())
}

fn print_signed_in(wrapper: &AppWrapper<RemoteApp>) {
    if let Some(user) = wrapper.user() {
        println!("\u{2713} Logged in as {}", user.display_name());
        println!("  User ID: {}", user.id);
    }
}
