use anyhow::{Context, Result};
use tasklet_core::{Config, TaskletError};

pub async fn run(id: String) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let app = super::open_task_app(&config).await?;

    let task = match app.provider().store().find_task(&id).await {
        Ok(task) => task,
        Err(TaskletError::NotFound(_)) => {
            eprintln!("No task found matching '{}'", id);
            eprintln!("Hint: Use 'tasklet list --all' to see all tasks including completed ones.");
            anyhow::bail!("Task not found");
        }
        Err(e) => return Err(e.into()),
    };

    let task = app.toggle(task.id).await?;

    if task.is_complete {
        println!("\u{2713} Completed: {}", task.description);
    } else {
        println!("\u{25cb} Reopened: {}", task.description);
    }
    println!("  ID: {}", task.short_id());

    Ok(())
}
