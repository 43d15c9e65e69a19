use anyhow::{Context, Result};
use tasklet_core::Config;

pub async fn run(description: Vec<String>) -> Result<()> {
    // Join description parts into a single string
    let description = description.join(" ");

    if description.is_empty() {
        anyhow::bail!("Task description cannot be empty");
    }

    let config = Config::load().context("Failed to load configuration")?;
    let app = super::open_task_app(&config).await?;

    let Some(task) = app.add(&description).await? else {
        anyhow::bail!("Task description cannot be empty");
    };

    println!("\u{2713} Created: {}", task.description);
    if let Some(name) = app.props().current_user_name() {
        println!("  Owner: {}", name);
    }
    println!("  ID: {}", task.short_id());

    Ok(())
}
