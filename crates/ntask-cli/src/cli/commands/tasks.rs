//! Task command handlers.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Local, Utc};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use ntask_core::api::ApiClient;
use ntask_core::config::Config;
use ntask_core::credentials::TokenStore;
use ntask_core::session::{Gate, SessionGuard};
use ntask_core::tasks::{Filter, TaskContext, TaskController, TaskDraft, TaskPatch};

pub async fn list(config: &Config, tokens: &TokenStore, filter: Filter) -> Result<()> {
    let controller = loaded_controller(config, tokens).await?;

    let tasks = controller.filter(filter);
    if tasks.is_empty() {
        println!("{}", empty_message(filter));
        return Ok(());
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["", "ID", "Title", "Description", "Context", "Created"]);
    for task in &tasks {
        table.add_row(vec![
            if task.is_completed { "✓" } else { " " }.to_string(),
            task.id.clone(),
            task.title.clone(),
            task.description.clone(),
            task.context.to_string(),
            format_date(task.created_at),
        ]);
    }
    println!("{table}");
    println!("{} task(s) remaining", controller.store().remaining());

    Ok(())
}

pub async fn add(
    config: &Config,
    tokens: &TokenStore,
    title: String,
    description: String,
    context: TaskContext,
) -> Result<()> {
    require_session(tokens)?;

    // No load first: create appends the server-assigned record.
    let api = ApiClient::new(config, tokens.clone())?;
    let mut controller = TaskController::new(api);

    let task = controller
        .create(TaskDraft {
            title,
            description,
            context,
        })
        .await?;

    println!("✓ Added task \"{}\" ({})", task.title, task.id);
    Ok(())
}

pub async fn edit(
    config: &Config,
    tokens: &TokenStore,
    id: &str,
    title: Option<String>,
    description: Option<String>,
) -> Result<()> {
    if title.is_none() && description.is_none() {
        bail!("Nothing to change: pass --title and/or --description");
    }

    let mut controller = loaded_controller(config, tokens).await?;
    controller.update(id, TaskPatch { title, description }).await?;

    let task = controller
        .store()
        .get(id)
        .context("updated task missing from store")?;
    println!("✓ Updated task \"{}\" ({})", task.title, task.id);
    Ok(())
}

pub async fn toggle(config: &Config, tokens: &TokenStore, id: &str) -> Result<()> {
    let mut controller = loaded_controller(config, tokens).await?;
    controller.toggle(id).await?;

    match controller.store().get(id) {
        Some(task) if task.is_completed => println!("✓ Completed \"{}\"", task.title),
        Some(task) => println!("○ Reopened \"{}\"", task.title),
        None => println!("Toggled task {id} (not in the local list)."),
    }
    Ok(())
}

pub async fn delete(config: &Config, tokens: &TokenStore, id: &str) -> Result<()> {
    let mut controller = loaded_controller(config, tokens).await?;

    let title = controller.store().get(id).map(|t| t.title.clone());
    controller.delete(id).await?;

    match title {
        Some(title) => println!("✓ Deleted \"{title}\""),
        None => println!("✓ Deleted task {id}"),
    }
    Ok(())
}

pub async fn clear_completed(config: &Config, tokens: &TokenStore) -> Result<()> {
    let mut controller = loaded_controller(config, tokens).await?;

    let removed = controller.clear_completed();
    if removed == 0 {
        println!("No completed tasks to clear.");
    } else {
        println!("Cleared {removed} completed task(s) from the local view.");
        println!("The server still has them; they will reappear on the next `ntask list`.");
    }
    println!("{} task(s) remaining", controller.store().remaining());

    Ok(())
}

/// Gates on a stored credential, then loads the full list.
async fn loaded_controller(config: &Config, tokens: &TokenStore) -> Result<TaskController> {
    require_session(tokens)?;

    let api = ApiClient::new(config, tokens.clone())?;
    let mut controller = TaskController::new(api);
    controller.load().await.context("load tasks")?;
    Ok(controller)
}

fn require_session(tokens: &TokenStore) -> Result<()> {
    let mut guard = SessionGuard::new();
    if guard.resolve(true, tokens) == Gate::RedirectToLogin {
        bail!("Not logged in. Run `ntask login` first.");
    }
    Ok(())
}

fn empty_message(filter: Filter) -> &'static str {
    match filter {
        Filter::All => "Your task list is empty. Add some tasks to get started!",
        Filter::Active => "No active tasks. Time to relax!",
        Filter::Completed => "No completed tasks yet. Keep going!",
    }
}

fn format_date(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%b %e, %H:%M").to_string()
}
