use anyhow::Result;
use chrono::Local;
use owo_colors::{OwoColorize, Style};
use weekboard_core::models::{NewTodoData, UpdateTodoData};
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{AddTodoCommand, DeleteTodoCommand, EditTodoCommand, MoveTodoCommand, TodoCommand, TodoSubcommand};
use crate::commands::confirm;
use crate::parser::parse_date;
use crate::util::{resolve_category, resolve_todo_id, week_for_date};

pub async fn todo_command<R: Repository>(planner: &Planner<R>, command: TodoCommand) -> Result<()> {
    match command.command {
        TodoSubcommand::Add(cmd) => add_todo(planner, cmd).await,
        TodoSubcommand::Do(cmd) => set_completed(planner, &cmd.id, true).await,
        TodoSubcommand::Undo(cmd) => set_completed(planner, &cmd.id, false).await,
        TodoSubcommand::Edit(cmd) => edit_todo(planner, cmd).await,
        TodoSubcommand::Delete(cmd) => delete_todo(planner, cmd).await,
        TodoSubcommand::Move(cmd) => move_todo(planner, cmd).await,
    }
}

async fn add_todo<R: Repository>(planner: &Planner<R>, command: AddTodoCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    planner.ensure_writable(category.id).await?;

    let due_date = match command.date.as_deref() {
        Some(raw) => parse_date(raw)?,
        None => Local::now().date_naive(),
    };
    let week = week_for_date(planner, &category, due_date).await?;
    let parent_id = match command.parent.as_deref() {
        Some(parent) => Some(resolve_todo_id(planner.repository(), parent).await?),
        None => None,
    };

    let todo = planner
        .add_todo(NewTodoData {
            week_id: week.id,
            content: command.content,
            due_date,
            parent_id,
        })
        .await?;

    let success_style = Style::new().green().bold();
    let noun = if todo.is_subtask() { "subtask" } else { "todo" };
    println!(
        "{} Added {}: {}",
        "✓".style(success_style),
        noun,
        todo.content.bright_white().bold()
    );
    println!(
        "  {} ID: {}  Due: {} (week {}/{})",
        "→".blue(),
        format!("{:.8}", todo.id.simple().to_string()).yellow(),
        todo.due_date,
        week.week_number,
        week.year
    );
    Ok(())
}

async fn set_completed<R: Repository>(planner: &Planner<R>, short_id: &str, completed: bool) -> Result<()> {
    let id = resolve_todo_id(planner.repository(), short_id).await?;
    let todo = planner.todo(id).await?;

    if todo.completed == completed {
        let state = if completed { "already completed" } else { "not completed" };
        println!("Todo '{}' is {}.", todo.content, state);
        return Ok(());
    }

    let todo = planner.set_todo_completed(todo, completed).await?;
    if completed {
        println!("Completed todo: '{}'", todo.content);
    } else {
        println!("Reopened todo: '{}'", todo.content);
    }
    Ok(())
}

async fn edit_todo<R: Repository>(planner: &Planner<R>, command: EditTodoCommand) -> Result<()> {
    let id = resolve_todo_id(planner.repository(), &command.id).await?;
    let todo = planner
        .update_todo(
            id,
            UpdateTodoData {
                content: Some(command.content),
                ..Default::default()
            },
        )
        .await?;
    println!("Updated todo: '{}'", todo.content);
    Ok(())
}

async fn delete_todo<R: Repository>(planner: &Planner<R>, command: DeleteTodoCommand) -> Result<()> {
    let id = resolve_todo_id(planner.repository(), &command.id).await?;
    let todo = planner.todo(id).await?;

    if !command.force && !confirm(format!("Delete todo '{}' and its subtasks?", todo.content)) {
        println!("Deletion cancelled.");
        return Ok(());
    }

    planner.delete_todo(id).await?;
    println!("Deleted todo: '{}'", todo.content);
    Ok(())
}

async fn move_todo<R: Repository>(planner: &Planner<R>, command: MoveTodoCommand) -> Result<()> {
    let id = resolve_todo_id(planner.repository(), &command.id).await?;
    let updates = planner.move_todo(id, command.position.saturating_sub(1)).await?;

    let position = updates
        .iter()
        .position(|u| u.id == id)
        .map(|p| p + 1)
        .unwrap_or(command.position);
    println!("Moved todo to position {} of {}", position, updates.len());
    Ok(())
}
