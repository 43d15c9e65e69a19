use anyhow::{Context, Result};
use tasklet_core::{Config, SyncConfig};
use tracing::debug;

pub async fn run(init: bool) -> Result<()> {
    debug!("config command: init={}", init);
    let config_path = Config::config_path()?;

    if init {
        if config_path.exists() {
            println!("Config file already exists: {}", config_path.display());
        } else {
            Config::default().save()?;
            println!("\u{2713} Created: {}", config_path.display());
            println!("  Set `enabled = true` and `app_id` under [sync] to sign in to an account.");
        }
        return Ok(());
    }

    let config = Config::load().context("Failed to load configuration")?;

    println!("Config file: {}", config_path.display());
    if !config_path.exists() {
        println!("  (not created yet; run `tasklet config --init`)");
    }
    println!("Database:    {}", config.local_db_path()?.display());
    println!("Session:     {}", Config::session_path()?.display());
    println!("Log file:    {}", Config::log_path()?.display());
    println!();

    match config.sync_config() {
        Ok(SyncConfig::Disabled) => println!("Sync: disabled"),
        Ok(SyncConfig::Enabled {
            app_id,
            base_url,
            anonymous_auth_enabled,
        }) => {
            println!("Sync: enabled");
            println!("  App ID:         {}", app_id);
            println!("  Backend:        {}", base_url);
            println!(
                "  Anonymous auth: {}",
                if anonymous_auth_enabled { "on" } else { "off" }
            );
        }
        Err(e) => println!("Sync: misconfigured ({})", e),
    }

    println!();
    print!("{}", toml::to_string_pretty(&config).context("Failed to serialize config")?);

    Ok(())
}
