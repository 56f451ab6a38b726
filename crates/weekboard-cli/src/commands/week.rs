use anyhow::Result;
use chrono::{Datelike, Local};
use weekboard_core::models::WeekQuery;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{GenerateWeeksCommand, ListWeeksCommand, WeekCommand, WeekSubcommand};
use crate::util::resolve_category;
use crate::views::table::display_weeks;

pub async fn week_command<R: Repository>(planner: &Planner<R>, command: WeekCommand) -> Result<()> {
    match command.command {
        WeekSubcommand::Generate(cmd) => generate_weeks(planner, cmd).await,
        WeekSubcommand::List(cmd) => list_weeks(planner, cmd).await,
    }
}

async fn generate_weeks<R: Repository>(planner: &Planner<R>, command: GenerateWeeksCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let generated = planner.generate_weeks(category.id, command.count).await?;

    match (generated.weeks.first(), generated.weeks.last()) {
        (Some(first), Some(last)) => println!(
            "Generated {} weeks for '{}': week {}/{} to week {}/{}",
            generated.weeks_created, category.name, first.week_number, first.year, last.week_number, last.year
        ),
        _ => println!("No new weeks for '{}'", category.name),
    }
    Ok(())
}

async fn list_weeks<R: Repository>(planner: &Planner<R>, command: ListWeeksCommand) -> Result<()> {
    let category = resolve_category(planner, command.category.as_deref()).await?;
    let year = if command.all {
        None
    } else {
        Some(command.year.unwrap_or_else(|| Local::now().date_naive().iso_week().year()))
    };

    let query = WeekQuery {
        year,
        limit: command.limit,
        offset: command.offset,
    };
    let page = planner.weeks_page(category.id, &query).await?;
    display_weeks(&page, query.offset);
    Ok(())
}
