use anyhow::{Context, Result};
use tasklet_core::{Config, Task};

pub async fn run(all: bool) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let date_format = config.date_format()?;
    let mut app = super::open_task_app(&config).await?;

    let tasks: Vec<&Task> = app
        .tasks()
        .await?
        .iter()
        .filter(|task| all || !task.is_complete)
        .collect();

    if tasks.is_empty() {
        if all {
            println!("No tasks yet. Add one with `tasklet add <description>`.");
        } else {
            println!("Nothing left to do. Use `tasklet list --all` to include completed tasks.");
        }
        return Ok(());
    }

    for task in &tasks {
        println!("{}", format_task(task, date_format));
    }

    Ok(())
}

fn format_task(task: &Task, date_format: &str) -> String {
    let status = if task.is_complete { "[x]" } else { "[ ]" };
    format!(
        "{} {}  {}  {}",
        status,
        task.description,
        task.short_id(),
        task.created_at.format(date_format)
    )
}
