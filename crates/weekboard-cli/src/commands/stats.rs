use anyhow::Result;
use owo_colors::OwoColorize;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::WeekSelector;
use crate::util::resolve_selector;
use crate::views::table::display_stats;

pub async fn show_stats<R: Repository>(planner: &Planner<R>, selector: WeekSelector) -> Result<()> {
    let (category, week) = resolve_selector(planner, &selector).await?;
    let view = planner.week_view(category.id, week.id).await?;

    println!("{}", format!("{} | {}", category.name, view.label).bold());
    display_stats(&view.stats);
    Ok(())
}
