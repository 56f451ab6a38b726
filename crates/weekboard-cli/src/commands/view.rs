use anyhow::Result;
use weekboard_core::planner::Planner;
use weekboard_core::repository::Repository;

use crate::cli::ViewCommand;
use crate::util::resolve_selector;
use crate::views::table::display_week_view;

pub async fn view_week<R: Repository>(planner: &Planner<R>, command: ViewCommand) -> Result<()> {
    let (category, week) = resolve_selector(planner, &command.selector).await?;
    let view = planner.week_view(category.id, week.id).await?;

    if command.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        display_week_view(&view, command.expand);
    }
    Ok(())
}
