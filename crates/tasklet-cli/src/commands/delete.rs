use anyhow::{Context, Result};
use tasklet_core::{Config, TaskletError};

pub async fn run(id: String) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let app = super::open_task_app(&config).await?;

    let task = match app.provider().store().find_task(&id).await {
        Ok(task) => task,
        Err(TaskletError::NotFound(_)) => {
            eprintln!("No task found matching '{}'", id);
            anyhow::bail!("Task not found");
        }
        Err(e) => return Err(e.into()),
    };

    app.delete(task.id).await?;

    println!("\u{2717} Deleted: {}", task.description);
    println!("  ID: {}", task.short_id());

    Ok(())
}
