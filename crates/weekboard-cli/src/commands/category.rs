use anyhow::Result;
use owo_colors::{OwoColorize, Style};
use weekboard_core::models::{NewCategoryData, UpdateCategoryData};
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{AddCategoryCommand, CategoryCommand, CategorySubcommand, DeleteCategoryCommand, EditCategoryCommand};
use crate::commands::confirm;
use crate::util::resolve_category;
use crate::views::table::display_categories;

pub async fn category_command<R: Repository>(planner: &Planner<R>, command: CategoryCommand) -> Result<()> {
    match command.command {
        CategorySubcommand::Add(cmd) => add_category(planner, cmd).await,
        CategorySubcommand::List => {
            display_categories(&planner.categories().await?);
            Ok(())
        }
        CategorySubcommand::Edit(cmd) => edit_category(planner, cmd).await,
        CategorySubcommand::Delete(cmd) => delete_category(planner, cmd).await,
        CategorySubcommand::Seed => seed_categories(planner).await,
    }
}

async fn add_category<R: Repository>(planner: &Planner<R>, command: AddCategoryCommand) -> Result<()> {
    let category = planner
        .create_category(NewCategoryData {
            name: command.name,
            color: command.color,
            role: command.role,
            is_default: false,
        })
        .await?;

    let success_style = Style::new().green().bold();
    println!(
        "{} Created category: {}",
        "✓".style(success_style),
        category.name.bright_white().bold()
    );
    println!("  {} Role: {}", "→".blue(), category.role);
    if planner.is_combined(&category) {
        println!("  {} Combined view of the work and personal categories", "→".blue());
    } else {
        let weeks = planner.weeks(category.id, None).await?;
        println!("  {} {} weeks ready", "→".blue(), weeks.len());
    }
    Ok(())
}

async fn edit_category<R: Repository>(planner: &Planner<R>, command: EditCategoryCommand) -> Result<()> {
    let category = resolve_category(planner, Some(&command.category)).await?;

    if command.name.is_none() && command.color.is_none() && command.order.is_none() && command.role.is_none() {
        println!("Nothing to change.");
        return Ok(());
    }

    let updated = planner
        .update_category(
            category.id,
            UpdateCategoryData {
                name: command.name,
                color: command.color,
                order: command.order,
                role: command.role,
            },
        )
        .await?;
    println!("Updated category: '{}'", updated.name);
    Ok(())
}

async fn delete_category<R: Repository>(planner: &Planner<R>, command: DeleteCategoryCommand) -> Result<()> {
    let category = resolve_category(planner, Some(&command.category)).await?;

    if !command.force
        && !confirm(format!(
            "Delete category '{}' with all its weeks, todos, tags and notes?",
            category.name
        ))
    {
        println!("Deletion cancelled.");
        return Ok(());
    }

    planner.delete_category(category.id).await?;
    println!("Deleted category: '{}'", category.name);
    Ok(())
}

async fn seed_categories<R: Repository>(planner: &Planner<R>) -> Result<()> {
    let created = planner.seed_default_categories().await?;
    if created.is_empty() {
        println!("Default categories already exist.");
    } else {
        for category in created {
            println!("Created default category: '{}'", category.name);
        }
    }
    Ok(())
}
