use anyhow::Result;
use owo_colors::OwoColorize;
use weekboard_core::dates::format_week_display;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::{ReflectCommand, ReflectSubcommand, SetReflectionCommand, WeekSelector};
use crate::util::resolve_selector;

pub async fn reflect_command<R: Repository>(planner: &Planner<R>, command: ReflectCommand) -> Result<()> {
    match command.command {
        ReflectSubcommand::Show(selector) => show_reflection(planner, selector).await,
        ReflectSubcommand::Set(cmd) => set_reflection(planner, cmd).await,
    }
}

async fn show_reflection<R: Repository>(planner: &Planner<R>, selector: WeekSelector) -> Result<()> {
    let (category, week) = resolve_selector(planner, &selector).await?;
    let label = format_week_display(week.start_date, week.end_date, week.week_number);
    println!("{}", format!("{} | {}", category.name, label).bold());

    match planner.reflection(week.id).await? {
        Some(reflection) => println!("{}", reflection.content),
        None => println!("{}", "No reflection yet.".bright_black()),
    }
    Ok(())
}

async fn set_reflection<R: Repository>(planner: &Planner<R>, command: SetReflectionCommand) -> Result<()> {
    let (category, week) = resolve_selector(planner, &command.selector).await?;
    planner.ensure_writable(category.id).await?;
    planner.set_reflection(week.id, command.content).await?;
    println!(
        "Saved reflection for week {}/{} of '{}'",
        week.week_number, week.year, category.name
    );
    Ok(())
}
